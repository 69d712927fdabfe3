use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::Context as _;

use crate::{
    catalog::Catalog,
    foundation::error::{MashupError, MashupResult},
    media::{model::Source, probe::source_from_media},
};

/// Outcome of an ingest run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub created: usize,
    pub skipped: usize,
}

impl IngestReport {
    fn merge(&mut self, other: Self) {
        self.created += other.created;
        self.skipped += other.skipped;
    }
}

fn is_json_stream(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "jsonl" | "ndjson")
    )
}

/// Register every path as catalog sources.
///
/// `.json`/`.jsonl` files are read as streams of source documents; anything else is probed as
/// a media file or `#EXTM3U` playlist. Unusable items are logged and skipped.
pub fn ingest_paths<P: AsRef<Path>>(catalog: &Catalog, paths: &[P]) -> IngestReport {
    let mut report = IngestReport::default();
    for path in paths {
        let path = path.as_ref();
        if is_json_stream(path) {
            match ingest_json_file(catalog, path) {
                Ok(r) => report.merge(r),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "abandoning source stream");
                    report.skipped += 1;
                }
            }
            continue;
        }
        match source_from_media(path) {
            Ok(source) => report.merge(register(catalog, &source)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping media");
                report.skipped += 1;
            }
        }
    }
    tracing::info!(created = report.created, skipped = report.skipped, "ingest finished");
    report
}

pub fn ingest_json_file(catalog: &Catalog, path: &Path) -> MashupResult<IngestReport> {
    let f = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    ingest_json(catalog, BufReader::new(f))
}

/// Register a whitespace-separated stream of JSON source documents.
///
/// Invalid or duplicate sources are skipped; a malformed document ends the stream with an error
/// after everything before it has been registered.
pub fn ingest_json<R: Read>(catalog: &Catalog, reader: R) -> MashupResult<IngestReport> {
    let mut report = IngestReport::default();
    for item in serde_json::Deserializer::from_reader(reader).into_iter::<Source>() {
        let source =
            item.map_err(|e| MashupError::serde(format!("malformed source document: {e}")))?;
        report.merge(register(catalog, &source));
    }
    Ok(report)
}

fn register(catalog: &Catalog, source: &Source) -> IngestReport {
    let outcome = source.validate().and_then(|()| catalog.create(source));
    match outcome {
        Ok(()) => {
            tracing::debug!(key = %source.key, "source registered");
            IngestReport {
                created: 1,
                skipped: 0,
            }
        }
        Err(e) => {
            tracing::warn!(key = %source.key, error = %e, "skipping source");
            IngestReport {
                created: 0,
                skipped: 1,
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/ingest.rs"]
mod tests;
