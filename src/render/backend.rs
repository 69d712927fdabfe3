use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    foundation::{
        cancel::CancelToken,
        core::{Duration, Region},
        error::MashupResult,
    },
    media::model::{Format, Source},
};

/// Produces one output media file per call.
///
/// Callers have already validated the parameters: the output path is free and carries the
/// format's extension, inputs exist, and a stack has a perfect-square input count. Renderers
/// poll `cancel` while an external tool runs and fail with
/// [`crate::MashupError::Cancelled`] once it fires.
pub trait Renderer {
    /// Trim `region` out of `source`, normalized to `format`.
    fn clip(
        &mut self,
        format: &Format,
        source: &Source,
        region: Region,
        output: &Path,
        cancel: &CancelToken,
    ) -> MashupResult<()>;

    /// Play `inputs` back to back.
    fn concat(
        &mut self,
        format: &Format,
        output: &Path,
        inputs: &[PathBuf],
        cancel: &CancelToken,
    ) -> MashupResult<()>;

    /// Lay `inputs` out on a square grid, cut to `duration`.
    fn stack(
        &mut self,
        format: &Format,
        output: &Path,
        duration: Duration,
        inputs: &[PathBuf],
        cancel: &CancelToken,
    ) -> MashupResult<()>;

    /// Composite `attachments` (slot name to input) through the named blend template.
    fn blend(
        &mut self,
        template: &str,
        format: &Format,
        output: &Path,
        attachments: &BTreeMap<String, PathBuf>,
        cancel: &CancelToken,
    ) -> MashupResult<()>;
}
