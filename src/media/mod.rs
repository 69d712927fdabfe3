//! Source media descriptors and the ffprobe-based helpers used to build them.

pub mod model;
pub mod probe;
