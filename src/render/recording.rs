use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::{
        cancel::CancelToken,
        core::{Duration, Region},
        error::MashupResult,
    },
    media::model::{Format, Source},
    render::backend::Renderer,
};

/// One call received by a [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderCall {
    Clip {
        key: String,
        region: Region,
        output: PathBuf,
    },
    Concat {
        output: PathBuf,
        inputs: Vec<PathBuf>,
    },
    Stack {
        output: PathBuf,
        duration: Duration,
        inputs: Vec<PathBuf>,
    },
    Blend {
        template: String,
        output: PathBuf,
        attachments: BTreeMap<String, PathBuf>,
    },
}

impl RenderCall {
    pub fn output(&self) -> &Path {
        match self {
            Self::Clip { output, .. }
            | Self::Concat { output, .. }
            | Self::Stack { output, .. }
            | Self::Blend { output, .. } => output,
        }
    }
}

/// In-memory renderer for tests and dry runs.
///
/// Records every call in order. With `touch` enabled each call also writes a small placeholder
/// file at the output path, so completion markers behave as with a real renderer.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    touch: bool,
}

impl RecordingRenderer {
    /// Record calls without writing outputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls and create placeholder outputs.
    pub fn touching() -> Self {
        Self {
            calls: Vec::new(),
            touch: true,
        }
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, call: RenderCall, cancel: &CancelToken) -> MashupResult<()> {
        cancel.check("render")?;
        if self.touch {
            let output = call.output();
            std::fs::write(output, format!("{call:?}\n"))
                .with_context(|| format!("failed to write '{}'", output.display()))?;
        }
        self.calls.push(call);
        Ok(())
    }
}

impl Renderer for RecordingRenderer {
    fn clip(
        &mut self,
        _format: &Format,
        source: &Source,
        region: Region,
        output: &Path,
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        self.record(
            RenderCall::Clip {
                key: source.key.clone(),
                region,
                output: output.to_path_buf(),
            },
            cancel,
        )
    }

    fn concat(
        &mut self,
        _format: &Format,
        output: &Path,
        inputs: &[PathBuf],
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        self.record(
            RenderCall::Concat {
                output: output.to_path_buf(),
                inputs: inputs.to_vec(),
            },
            cancel,
        )
    }

    fn stack(
        &mut self,
        _format: &Format,
        output: &Path,
        duration: Duration,
        inputs: &[PathBuf],
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        self.record(
            RenderCall::Stack {
                output: output.to_path_buf(),
                duration,
                inputs: inputs.to_vec(),
            },
            cancel,
        )
    }

    fn blend(
        &mut self,
        template: &str,
        _format: &Format,
        output: &Path,
        attachments: &BTreeMap<String, PathBuf>,
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        self.record(
            RenderCall::Blend {
                template: template.to_string(),
                output: output.to_path_buf(),
                attachments: attachments.clone(),
            },
            cancel,
        )
    }
}
