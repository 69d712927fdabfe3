use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context as _;
use sha2::Digest as _;

use crate::foundation::error::{MashupError, MashupResult};

/// Maps an arbitrary byte key to a bucket directory.
///
/// With `create == false` a missing bucket yields `Ok(None)`; with `create == true` the bucket is
/// created when absent and always returned.
pub trait BucketStore: fmt::Debug + Send + Sync {
    fn locate(&self, key: &[u8], create: bool) -> MashupResult<Option<PathBuf>>;
}

/// Digest family used to name catalog buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        }
    }

    pub fn hex_digest(self, bytes: &[u8]) -> String {
        match self {
            Self::Sha256 => to_hex(&sha2::Sha256::digest(bytes)),
            Self::Sha512 => to_hex(&sha2::Sha512::digest(bytes)),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = MashupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(MashupError::config(format!(
                "unsupported catalog algorithm '{s}' (expected SHA-256 or SHA-512)"
            ))),
        }
    }
}

fn to_hex(digest: &[u8]) -> String {
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Buckets laid out as `<root>/<hex[0..2]>/<hex[2..4]>/<hex>` over the key digest.
#[derive(Clone, Debug)]
pub struct DigestBuckets {
    root: PathBuf,
    algorithm: DigestAlgorithm,
}

impl DigestBuckets {
    pub fn new(root: impl Into<PathBuf>, algorithm: DigestAlgorithm) -> Self {
        Self {
            root: root.into(),
            algorithm,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn bucket_path(&self, key: &[u8]) -> PathBuf {
        let hex = self.algorithm.hex_digest(key);
        self.root.join(&hex[0..2]).join(&hex[2..4]).join(&hex)
    }
}

impl BucketStore for DigestBuckets {
    fn locate(&self, key: &[u8], create: bool) -> MashupResult<Option<PathBuf>> {
        let bucket = self.bucket_path(key);
        if bucket.is_dir() {
            return Ok(Some(bucket));
        }
        if !create {
            return Ok(None);
        }
        std::fs::create_dir_all(&bucket)
            .with_context(|| format!("failed to create bucket '{}'", bucket.display()))?;
        Ok(Some(bucket))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/store.rs"]
mod tests;
