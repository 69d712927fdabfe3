use std::path::{Path, PathBuf};

use crate::foundation::{
    core::TaggedRegion,
    error::{MashupError, MashupResult},
};

/// Require `path` to name an existing, non-directory file.
pub fn check_input(path: &Path) -> MashupResult<()> {
    if path.as_os_str().is_empty() {
        return Err(MashupError::validation("input path must be non-empty"));
    }
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(MashupError::validation(format!(
            "input must not be a directory ('{}')",
            path.display()
        ))),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MashupError::not_found(
            format!("input must exist ('{}')", path.display()),
        )),
        Err(e) => Err(MashupError::validation(format!(
            "unable to stat input '{}': {e}",
            path.display()
        ))),
    }
}

/// Require `path` to be free for a new output file.
pub fn check_output(path: &Path) -> MashupResult<()> {
    if path.as_os_str().is_empty() {
        return Err(MashupError::validation("output path must be non-empty"));
    }
    match std::fs::symlink_metadata(path) {
        Ok(_) => Err(MashupError::already_exists(format!(
            "output path '{}' already exists",
            path.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MashupError::validation(format!(
            "unable to stat output '{}': {e}",
            path.display()
        ))),
    }
}

/// Remove whatever a failed or interrupted render left at `path`.
///
/// Existence is the completion marker for outputs, so a partial file must not survive an error
/// this process observed.
pub fn discard_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(output = %path.display(), "discarded partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(output = %path.display(), error = %e, "unable to discard partial output");
        }
    }
}

/// One stream of an underlying media file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub path: PathBuf,
    /// Zero-based index among the streams of this kind.
    #[serde(default)]
    pub track: u32,
    /// Filter expression applied to this stream only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>, track: u32) -> Self {
        Self {
            path: path.into(),
            track,
            filter: None,
        }
    }

    pub fn validate(&self) -> MashupResult<()> {
        check_input(&self.path)?;
        if let Some(filter) = &self.filter
            && filter.is_empty()
        {
            return Err(MashupError::validation(format!(
                "track '{}' has an empty filter override",
                self.path.display()
            )));
        }
        Ok(())
    }
}

/// Overlay text used to stamp the source key onto rendered clips.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Stamp {
    pub color: String,
    pub font: PathBuf,
    pub size: u32,
}

impl Stamp {
    pub fn validate(&self) -> MashupResult<()> {
        if self.color.is_empty() {
            return Err(MashupError::validation("stamp color must not be empty"));
        }
        check_input(&self.font).map_err(|e| {
            MashupError::validation(format!(
                "invalid stamp font '{}': {e}",
                self.font.display()
            ))
        })
    }
}

/// Catalog descriptor of one piece of source media.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Source {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Track>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Track>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<Track>,
    pub regions: Vec<TaggedRegion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp: Option<Stamp>,
}

impl Source {
    pub fn new(key: impl Into<String>, regions: Vec<TaggedRegion>) -> Self {
        Self {
            key: key.into(),
            video: None,
            audio: None,
            subtitle: None,
            regions,
            stamp: None,
        }
    }

    pub fn validate(&self) -> MashupResult<()> {
        if self.key.is_empty() {
            return Err(MashupError::validation("source key must not be empty"));
        }
        for (kind, track) in [
            ("video", &self.video),
            ("audio", &self.audio),
            ("subtitle", &self.subtitle),
        ] {
            if let Some(track) = track {
                track.validate().map_err(|e| {
                    MashupError::validation(format!(
                        "source '{}' has invalid {kind} track: {e}",
                        self.key
                    ))
                })?;
            }
        }
        if self.regions.is_empty() {
            return Err(MashupError::validation(format!(
                "source '{}' must have at least one region",
                self.key
            )));
        }
        for region in &self.regions {
            region.validate().map_err(|e| {
                MashupError::validation(format!("source '{}' has bad region: {e}", self.key))
            })?;
        }
        if let Some(stamp) = &self.stamp {
            stamp.validate()?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Container {
    #[serde(rename = "MKV")]
    Mkv,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mkv => "mkv",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Mkv => "MKV",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum VideoCodec {
    #[serde(rename = "H264")]
    H264,
    #[serde(rename = "H265")]
    H265,
    #[serde(rename = "VP9")]
    Vp9,
}

impl VideoCodec {
    pub fn name(self) -> &'static str {
        match self {
            Self::H264 => "H264",
            Self::H265 => "H265",
            Self::Vp9 => "VP9",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AudioCodec {
    #[serde(rename = "AAC")]
    Aac,
    #[serde(rename = "FLAC")]
    Flac,
}

impl AudioCodec {
    pub fn name(self) -> &'static str {
        match self {
            Self::Aac => "AAC",
            Self::Flac => "FLAC",
        }
    }
}

/// Output encoding parameters shared by every render in a project.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Format {
    pub format: Container,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    pub frame_rate: u32,
    pub sample_rate: u32,
    /// Audio bitrate in kb/s.
    pub bit_rate: u32,
    pub gop_size: u32,
    pub width: u32,
    pub height: u32,
    // blend renderer knobs
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default = "default_speed")]
    pub speed: String,
    pub stamp: Stamp,
}

fn default_samples() -> u32 {
    8
}

fn default_quality() -> String {
    "MEDIUM".to_string()
}

fn default_speed() -> String {
    "GOOD".to_string()
}

impl Default for Format {
    fn default() -> Self {
        Self {
            format: Container::Mkv,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
            frame_rate: 30,
            sample_rate: 48_000,
            bit_rate: 192,
            gop_size: 18,
            width: 1920,
            height: 1080,
            samples: default_samples(),
            quality: default_quality(),
            speed: default_speed(),
            stamp: Stamp {
                color: "'Snow'".to_string(),
                font: PathBuf::from("/usr/share/fonts/noto/NotoSansMono-Regular.ttf"),
                size: 64,
            },
        }
    }
}

impl Format {
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn validate(&self) -> MashupResult<()> {
        for (field, value) in [
            ("frame_rate", self.frame_rate),
            ("sample_rate", self.sample_rate),
            ("bit_rate", self.bit_rate),
            ("gop_size", self.gop_size),
            ("width", self.width),
            ("height", self.height),
        ] {
            if value == 0 {
                return Err(MashupError::validation(format!(
                    "format {field} must be non-zero"
                )));
            }
        }
        self.stamp
            .validate()
            .map_err(|e| MashupError::validation(format!("format has invalid stamp: {e}")))
    }

    /// Require `path` to be a fresh output whose extension matches this format.
    pub fn check_video_output(&self, path: &Path) -> MashupResult<()> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != self.extension() {
            return Err(MashupError::validation(format!(
                "output extension '{ext}' must match format '{}'",
                self.format.name()
            )));
        }
        check_output(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/model.rs"]
mod tests;
