use std::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, ErrorKind, Write as _},
    path::Path,
};

use anyhow::Context as _;

use crate::foundation::error::{MashupError, MashupResult};

/// Decode one JSON document from `path`.
///
/// A missing file maps to [`MashupError::NotFound`], a malformed document to
/// [`MashupError::Serde`].
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> MashupResult<T> {
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MashupError::not_found(format!(
                "'{}' does not exist",
                path.display()
            )));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("failed to open '{}'", path.display()))
                .into());
        }
    };
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| MashupError::serde(format!("failed to decode '{}': {e}", path.display())))
}

/// Encode `value` into a file that must not exist yet.
///
/// An existing file maps to [`MashupError::AlreadyExists`]. A failed encode removes the
/// partially written file.
pub fn write_json_new<T: serde::Serialize>(path: &Path, value: &T) -> MashupResult<()> {
    let f = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(MashupError::already_exists(format!(
                "'{}' already exists",
                path.display()
            )));
        }
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("failed to create '{}'", path.display()))
                .into());
        }
    };

    let mut w = BufWriter::new(f);
    let written = serde_json::to_writer_pretty(&mut w, value)
        .map_err(|e| MashupError::serde(format!("failed to encode '{}': {e}", path.display())))
        .and_then(|()| {
            w.write_all(b"\n")
                .and_then(|()| w.flush())
                .with_context(|| format!("failed to write '{}'", path.display()))
                .map_err(MashupError::from)
        });
    if written.is_err() {
        drop(w);
        let _ = std::fs::remove_file(path);
    }
    written
}
