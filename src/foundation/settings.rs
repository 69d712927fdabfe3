use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::MashupResult;

/// Default catalog location.
pub const DEFAULT_CATALOG_PATH: &str = "/var/mashup/catalog";
/// Default bucket digest for the catalog store.
pub const DEFAULT_CATALOG_ALGORITHM: &str = "SHA-512";
/// Default log level forwarded to ffmpeg and its encoders.
pub const DEFAULT_TOOL_LOGLEVEL: &str = "error";

/// Process-wide configuration, built once at startup and passed to every component that needs
/// it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Root directory of the source catalog.
    pub catalog_path: PathBuf,
    /// Digest algorithm naming the catalog bucket layout (`SHA-256`, `SHA-512`).
    pub catalog_algorithm: String,
    /// Directory holding `blend.py` and the `<template>.blend` files.
    pub tool_dir: PathBuf,
    /// `-loglevel` for ffmpeg and the `log-level` handed to x264/x265.
    pub tool_loglevel: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            catalog_algorithm: DEFAULT_CATALOG_ALGORITHM.to_string(),
            tool_dir: PathBuf::from("."),
            tool_loglevel: DEFAULT_TOOL_LOGLEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn with_catalog(mut self, path: impl Into<PathBuf>, algorithm: impl Into<String>) -> Self {
        self.catalog_path = path.into();
        self.catalog_algorithm = algorithm.into();
        self
    }

    pub fn with_tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_dir = dir.into();
        self
    }

    pub fn with_tool_loglevel(mut self, level: impl Into<String>) -> Self {
        self.tool_loglevel = level.into();
        self
    }

    /// Directory of the running executable with symlinks resolved.
    ///
    /// Blend templates ship next to the binary, so this is the usual `tool_dir`.
    pub fn executable_dir() -> MashupResult<PathBuf> {
        let exe = std::env::current_exe().context("failed to locate current executable")?;
        let target = std::fs::canonicalize(&exe)
            .with_context(|| format!("failed to resolve executable '{}'", exe.display()))?;
        Ok(target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")))
    }
}
