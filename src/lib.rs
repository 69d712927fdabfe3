//! Randomized long-form video compilations.
//!
//! A [`Catalog`] holds tagged [`Source`] descriptors. [`PlanGenerator`] draws a random graph of
//! clip, concat, stack and blend [`Plan`]s for a [`Project`], and [`PlanExecutor`] materializes
//! that graph bottom-up through a [`Renderer`]. Every operation is resumable: outputs that exist
//! are never rebuilt, and long-running work observes a [`CancelToken`].
//!
//! Errors are reported as [`MashupError`].

#![forbid(unsafe_code)]

pub mod batch;
pub mod catalog;
pub mod execute;
pub mod foundation;
pub mod generate;
pub mod ingest;
pub mod media;
pub mod plan;
pub mod project;
pub mod render;

#[cfg(test)]
mod testing;

pub use batch::{BatchReport, RenderJob, render_stream, render_stream_file};
pub use catalog::Catalog;
pub use execute::{ExecuteStats, PlanExecutor};
pub use foundation::{
    cancel::CancelToken,
    core::{Duration, Region, TaggedRegion},
    error::{MashupError, MashupResult},
    settings::Settings,
};
pub use generate::{GenerateReport, GeneratorParameters, PlanGenerator};
pub use ingest::{IngestReport, ingest_json, ingest_paths};
pub use media::model::{Format, Source};
pub use plan::{ClipSource, Plan, PlanName, PlanOp, PlanStore};
pub use project::Project;
pub use render::{FfmpegRenderer, RecordingRenderer, RenderCall, Renderer};
