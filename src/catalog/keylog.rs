use std::{
    fs::{File, OpenOptions},
    io::{BufReader, ErrorKind, Write as _},
    path::Path,
};

use anyhow::Context as _;

use crate::foundation::{
    cancel::CancelToken,
    error::{MashupError, MashupResult},
};

type KeyDecoder = serde_json::StreamDeserializer<
    'static,
    serde_json::de::IoRead<BufReader<File>>,
    String,
>;

/// Append one JSON-encoded key record to the log at `path`.
///
/// The record and its newline go out in a single write so concurrent readers never observe a
/// half-written key from an uninterrupted append.
pub fn append_key(path: &Path, key: &str) -> MashupResult<()> {
    let mut record = serde_json::to_string(key)
        .map_err(|e| MashupError::serde(format!("failed to encode key '{key}': {e}")))?;
    record.push('\n');

    let mut f = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open key log '{}'", path.display()))?;
    f.write_all(record.as_bytes())
        .with_context(|| format!("failed to append to key log '{}'", path.display()))?;
    Ok(())
}

/// Lazily decoded view over the key log.
///
/// The log file is closed as soon as the stream is exhausted, hits a decode error, observes
/// cancellation, or is dropped.
pub struct KeyStream {
    decoder: Option<KeyDecoder>,
    cancel: CancelToken,
}

impl KeyStream {
    /// Open the log at `path`. A missing log yields an empty stream.
    pub fn open(path: &Path, cancel: CancelToken) -> MashupResult<Self> {
        let decoder = match File::open(path) {
            Ok(f) => Some(serde_json::Deserializer::from_reader(BufReader::new(f)).into_iter()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to open key log '{}'", path.display()))
                    .into());
            }
        };
        Ok(Self { decoder, cancel })
    }

    /// `true` while the underlying log file is still open.
    pub fn is_open(&self) -> bool {
        self.decoder.is_some()
    }

    fn close(&mut self) {
        self.decoder = None;
    }
}

impl Iterator for KeyStream {
    type Item = MashupResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() {
            self.close();
            return None;
        }
        let decoder = self.decoder.as_mut()?;
        match decoder.next() {
            Some(Ok(key)) => Some(Ok(key)),
            Some(Err(e)) => {
                self.close();
                Some(Err(MashupError::serde(format!("error decoding key log: {e}"))))
            }
            None => {
                self.close();
                None
            }
        }
    }
}

impl std::fmt::Debug for KeyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStream")
            .field("open", &self.is_open())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/keylog.rs"]
mod tests;
