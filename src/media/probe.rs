use std::{
    io::{BufRead as _, BufReader},
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{Duration, Region, TaggedRegion},
        error::{MashupError, MashupResult},
    },
    media::model::{Source, Track},
};

/// Stream counts and container duration reported by `ffprobe`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeInfo {
    pub video_tracks: u32,
    pub audio_tracks: u32,
    pub subtitle_tracks: u32,
    pub duration: Duration,
}

impl ProbeInfo {
    /// Parse the JSON printed by `ffprobe -show_entries stream=codec_type:format=duration`.
    pub fn from_json(bytes: &[u8]) -> MashupResult<Self> {
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            #[serde(default)]
            streams: Vec<ProbeStream>,
            format: Option<ProbeFormat>,
        }

        let parsed: ProbeOut = serde_json::from_slice(bytes)
            .map_err(|e| MashupError::serde(format!("ffprobe json parse failed: {e}")))?;
        let count = |kind: &str| {
            parsed
                .streams
                .iter()
                .filter(|s| s.codec_type.as_deref() == Some(kind))
                .count() as u32
        };
        let seconds = parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .ok_or_else(|| MashupError::validation("ffprobe reported no container duration"))?;

        Ok(Self {
            video_tracks: count("video"),
            audio_tracks: count("audio"),
            subtitle_tracks: count("subtitle"),
            duration: Duration::parse(&format!("{seconds}s"))?,
        })
    }

    /// Build a source that uses the last stream of each kind and one untagged region spanning
    /// the whole file.
    pub fn to_source(&self, key: impl Into<String>, media: &Path) -> MashupResult<Source> {
        let region = Region::new(Duration::ZERO, self.duration);
        region.validate()?;

        let last = |n: u32| (n > 0).then(|| Track::new(media, n - 1));
        let mut source = Source::new(key, vec![TaggedRegion::new(region)]);
        source.video = last(self.video_tracks);
        source.audio = last(self.audio_tracks);
        source.subtitle = last(self.subtitle_tracks);
        Ok(source)
    }
}

/// Run `ffprobe` on `path`.
pub fn probe(path: &Path) -> MashupResult<ProbeInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "stream=codec_type:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| MashupError::external_tool(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(MashupError::external_tool(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    ProbeInfo::from_json(&out.stdout)
}

/// Entries of an `#EXTM3U` playlist, or `None` when the file has no m3u header.
pub fn m3u_entries(path: &Path) -> MashupResult<Option<Vec<PathBuf>>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open '{}'", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    // Media files are binary; an unreadable first line simply means "not a playlist".
    match lines.next() {
        Some(Ok(first)) if first.trim_end() == "#EXTM3U" => {}
        _ => return Ok(None),
    }

    let mut entries = Vec::new();
    for line in lines {
        let line = line.with_context(|| format!("failed to read '{}'", path.display()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(PathBuf::from(line));
    }
    Ok(Some(entries))
}

/// Build a catalog source for a media file or playlist. The key is the path as given.
pub fn source_from_media(path: &Path) -> MashupResult<Source> {
    let key = path.to_string_lossy().into_owned();
    let media = match m3u_entries(path)? {
        Some(entries) => entries.into_iter().next().ok_or_else(|| {
            MashupError::validation(format!("playlist '{}' is empty", path.display()))
        })?,
        None => path.to_path_buf(),
    };
    probe(&media)?.to_source(key, &media)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
