use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde_json::Value;

use crate::{
    foundation::{
        cancel::CancelToken,
        core::{Duration, Region},
        error::{MashupError, MashupResult},
    },
    media::model::{Format, Source, check_input, discard_partial_output},
    plan::validate_stack_count,
    render::backend::Renderer,
};

/// A standalone render request, independent of any project.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderJob {
    Clip {
        format: Format,
        source: Source,
        region: Region,
        output: PathBuf,
    },
    Stack {
        format: Format,
        output: PathBuf,
        duration: Duration,
        #[serde(alias = "input")]
        inputs: Vec<PathBuf>,
    },
    Blend {
        #[serde(alias = "name")]
        template: String,
        format: Format,
        output: PathBuf,
        attachments: BTreeMap<String, PathBuf>,
    },
    Concat {
        format: Format,
        output: PathBuf,
        #[serde(alias = "input")]
        inputs: Vec<PathBuf>,
    },
}

impl RenderJob {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Clip { .. } => "clip",
            Self::Stack { .. } => "stack",
            Self::Blend { .. } => "blend",
            Self::Concat { .. } => "concat",
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            Self::Clip { output, .. }
            | Self::Stack { output, .. }
            | Self::Blend { output, .. }
            | Self::Concat { output, .. } => output,
        }
    }

    fn format(&self) -> &Format {
        match self {
            Self::Clip { format, .. }
            | Self::Stack { format, .. }
            | Self::Blend { format, .. }
            | Self::Concat { format, .. } => format,
        }
    }

    /// An existing output is [`MashupError::AlreadyExists`]; callers treat that as done.
    pub fn validate(&self) -> MashupResult<()> {
        let format = self.format();
        format.validate()?;
        format.check_video_output(self.output())?;
        match self {
            Self::Clip { source, region, .. } => {
                source.validate()?;
                region.validate()
            }
            Self::Stack { inputs, .. } => {
                validate_stack_count(inputs.len())?;
                inputs.iter().try_for_each(|p| check_input(p))
            }
            Self::Blend { attachments, .. } => {
                if attachments.is_empty() {
                    return Err(MashupError::config("blend job has no attachments"));
                }
                attachments.values().try_for_each(|p| check_input(p))
            }
            Self::Concat { inputs, .. } => {
                if inputs.len() < 2 {
                    return Err(MashupError::config(format!(
                        "concat job needs at least two inputs (not {})",
                        inputs.len()
                    )));
                }
                inputs.iter().try_for_each(|p| check_input(p))
            }
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer, cancel: &CancelToken) -> MashupResult<()> {
        match self {
            Self::Clip {
                format,
                source,
                region,
                output,
            } => renderer.clip(format, source, *region, output, cancel),
            Self::Stack {
                format,
                output,
                duration,
                inputs,
            } => renderer.stack(format, output, *duration, inputs, cancel),
            Self::Blend {
                template,
                format,
                output,
                attachments,
            } => renderer.blend(template, format, output, attachments, cancel),
            Self::Concat {
                format,
                output,
                inputs,
            } => renderer.concat(format, output, inputs, cancel),
        }
    }
}

/// Outcome of a render-stream run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub rendered: usize,
    /// Jobs whose output already existed.
    pub skipped: usize,
    pub failed: usize,
}

pub fn render_stream_file(
    path: &Path,
    renderer: &mut dyn Renderer,
    cancel: &CancelToken,
) -> MashupResult<BatchReport> {
    let f = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    render_stream(BufReader::new(f), renderer, cancel)
}

/// Validate and render every job in a JSON stream.
///
/// A job is either one externally tagged document (`{"concat": {...}}`) or a bare kind string
/// followed by the job body (`"concat"` then `{...}`). Invalid jobs and failed renders are
/// logged and counted; a malformed document, an unknown kind or a cancellation aborts the
/// stream.
pub fn render_stream<R: Read>(
    reader: R,
    renderer: &mut dyn Renderer,
    cancel: &CancelToken,
) -> MashupResult<BatchReport> {
    let mut report = BatchReport::default();
    let mut documents = serde_json::Deserializer::from_reader(reader).into_iter::<Value>();
    while let Some(job) = next_job(&mut documents) {
        let job = job?;
        cancel.check("render stream")?;

        match job.validate() {
            Ok(()) => {}
            Err(MashupError::AlreadyExists(_)) => {
                tracing::debug!(output = %job.output().display(), "output exists; skipping");
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(kind = job.kind(), output = %job.output().display(), error = %e, "invalid render job");
                report.failed += 1;
                continue;
            }
        }

        match job.render(renderer, cancel) {
            Ok(()) => report.rendered += 1,
            Err(e @ MashupError::Cancelled(_)) => {
                discard_partial_output(job.output());
                return Err(e);
            }
            Err(e) => {
                discard_partial_output(job.output());
                tracing::warn!(kind = job.kind(), output = %job.output().display(), error = %e, "render failed");
                report.failed += 1;
            }
        }
    }
    tracing::info!(
        rendered = report.rendered,
        skipped = report.skipped,
        failed = report.failed,
        "render stream finished"
    );
    Ok(report)
}

fn malformed(e: serde_json::Error) -> MashupError {
    MashupError::serde(format!("malformed render job: {e}"))
}

/// Decode the next job, joining a bare kind string with the document after it.
fn next_job<I>(documents: &mut I) -> Option<MashupResult<RenderJob>>
where
    I: Iterator<Item = serde_json::Result<Value>>,
{
    let first = match documents.next()? {
        Ok(v) => v,
        Err(e) => return Some(Err(malformed(e))),
    };
    let tagged = match first {
        Value::String(kind) => {
            let body = match documents.next() {
                Some(Ok(body)) => body,
                Some(Err(e)) => return Some(Err(malformed(e))),
                None => {
                    return Some(Err(MashupError::serde(format!(
                        "render job '{kind}' has no body"
                    ))));
                }
            };
            let mut map = serde_json::Map::new();
            map.insert(kind, body);
            Value::Object(map)
        }
        other => other,
    };
    Some(serde_json::from_value(tagged).map_err(malformed))
}

#[cfg(test)]
#[path = "../tests/unit/batch.rs"]
mod tests;
