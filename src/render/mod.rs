//! Rendering collaborators.
//!
//! The engine only talks to the [`Renderer`] trait. [`FfmpegRenderer`] shells out to `ffmpeg` and
//! `blender`; [`RecordingRenderer`] captures calls in memory.

pub mod backend;
pub mod ffmpeg;
pub mod recording;

pub use backend::Renderer;
pub use ffmpeg::{FfmpegRenderer, is_ffmpeg_on_path};
pub use recording::{RecordingRenderer, RenderCall};
