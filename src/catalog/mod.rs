//! Keyed store of [`Source`] descriptors.
//!
//! Two pieces of on-disk state back a catalog:
//!
//! - a [`BucketStore`] mapping each key to a directory holding `source.json` (the authoritative
//!   per-key lookup), and
//! - the append-only `keys` log in the catalog root (the authoritative enumeration), so listing
//!   keys never walks the bucket tree.

pub mod keylog;
pub mod store;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::{Rng, seq::SliceRandom as _};

use crate::{
    foundation::{
        cancel::CancelToken,
        error::{MashupError, MashupResult},
        json::{read_json, write_json_new},
        settings::Settings,
    },
    media::model::Source,
};

pub use keylog::KeyStream;
pub use store::{BucketStore, DigestAlgorithm, DigestBuckets};

/// File name of the key log inside the catalog root.
pub const KEY_LOG_FILE: &str = "keys";
/// File name of the source document inside each bucket.
pub const SOURCE_FILE: &str = "source.json";

#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,
    store: Box<dyn BucketStore>,
}

impl Catalog {
    /// Open (creating if needed) a catalog with digest-named buckets under `root`.
    pub fn new(root: impl Into<PathBuf>, algorithm: &str) -> MashupResult<Self> {
        let root = root.into();
        let algorithm: DigestAlgorithm = algorithm.parse()?;
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create catalog '{}'", root.display()))?;
        let store = DigestBuckets::new(root.clone(), algorithm);
        Ok(Self::with_store(root, Box::new(store)))
    }

    /// Open the catalog named by `settings`.
    pub fn open(settings: &Settings) -> MashupResult<Self> {
        Self::new(&settings.catalog_path, &settings.catalog_algorithm)
    }

    /// Use an arbitrary bucket store; `root` only holds the key log.
    pub fn with_store(root: impl Into<PathBuf>, store: Box<dyn BucketStore>) -> Self {
        Self {
            root: root.into(),
            store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_log(&self) -> PathBuf {
        self.root.join(KEY_LOG_FILE)
    }

    /// Stream keys in log order, stopping early once `cancel` fires.
    pub fn key_stream(&self, cancel: &CancelToken) -> MashupResult<KeyStream> {
        KeyStream::open(&self.key_log(), cancel.clone())
    }

    /// All keys, shuffled afresh on every call so sampling never follows insertion order.
    pub fn keys<R: Rng + ?Sized>(&self, rng: &mut R) -> MashupResult<Vec<String>> {
        let mut keys = self
            .key_stream(&CancelToken::new())?
            .collect::<MashupResult<Vec<_>>>()?;
        keys.shuffle(rng);
        Ok(keys)
    }

    pub fn lookup(&self, key: &str) -> MashupResult<Source> {
        let bucket = self
            .store
            .locate(key.as_bytes(), false)?
            .ok_or_else(|| MashupError::not_found(format!("catalog key '{key}'")))?;
        read_json(&bucket.join(SOURCE_FILE)).map_err(|e| match e {
            MashupError::NotFound(_) => MashupError::not_found(format!("catalog key '{key}'")),
            other => other,
        })
    }

    /// Register a new source.
    ///
    /// Fails with [`MashupError::AlreadyExists`] when the key already has a document; the
    /// existing document is left untouched.
    pub fn create(&self, source: &Source) -> MashupResult<()> {
        let bucket = self
            .store
            .locate(source.key.as_bytes(), true)?
            .ok_or_else(|| {
                MashupError::not_found(format!("no bucket for catalog key '{}'", source.key))
            })?;

        write_json_new(&bucket.join(SOURCE_FILE), source).map_err(|e| match e {
            MashupError::AlreadyExists(_) => {
                MashupError::already_exists(format!("catalog key '{}'", source.key))
            }
            other => other,
        })?;
        keylog::append_key(&self.key_log(), &source.key)?;

        tracing::debug!(key = %source.key, "catalog entry created");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/catalog.rs"]
mod tests;
