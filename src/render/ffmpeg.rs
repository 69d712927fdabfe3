use std::{
    collections::BTreeMap,
    io::Read as _,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::Duration as StdDuration,
};

use anyhow::Context as _;

use crate::{
    foundation::{
        cancel::CancelToken,
        core::{Duration, Region},
        error::{MashupError, MashupResult},
        settings::Settings,
    },
    media::model::{AudioCodec, Format, Source, VideoCodec, check_input},
    render::backend::Renderer,
};

/// Blender script that drives every `.blend` template.
pub const BLEND_SCRIPT: &str = "blend.py";

const POLL_INTERVAL: StdDuration = StdDuration::from_millis(50);
const STDERR_TAIL_LINES: usize = 20;

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// [`Renderer`] backed by the `ffmpeg` and `blender` executables on `PATH`.
#[derive(Clone, Debug)]
pub struct FfmpegRenderer {
    tool_dir: PathBuf,
    loglevel: String,
}

impl FfmpegRenderer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            tool_dir: settings.tool_dir.clone(),
            loglevel: settings.tool_loglevel.clone(),
        }
    }

    /// Locate `blend.py` and `<template>.blend` in the tool directory.
    pub fn locate_blend(&self, template: &str) -> MashupResult<(PathBuf, PathBuf)> {
        let script = self.tool_dir.join(BLEND_SCRIPT);
        check_input(&script).map_err(|e| {
            MashupError::not_found(format!("unable to locate blend script: {e}"))
        })?;
        let blend = self.tool_dir.join(format!("{template}.blend"));
        check_input(&blend).map_err(|e| {
            MashupError::not_found(format!("unable to locate blend template '{template}': {e}"))
        })?;
        Ok((script, blend))
    }

    fn ffmpeg(&self, args: Vec<String>, cancel: &CancelToken) -> MashupResult<()> {
        let mut full = ffmpeg_prelude(&self.loglevel);
        full.extend(args);
        run_tool("ffmpeg", &full, cancel)
    }

    /// Extract the clip's subtitle stream, shifted to the clip start, into `dest`.
    fn extract_subtitles(
        &self,
        source: &Source,
        region: Region,
        dest: &Path,
        cancel: &CancelToken,
    ) -> MashupResult<bool> {
        let Some(track) = &source.subtitle else {
            return Ok(false);
        };
        let args = vec![
            "-y".to_string(),
            "-itsoffset".to_string(),
            format!("-{}us", region.start.as_micros()),
            "-i".to_string(),
            path_arg(&track.path),
            "-map".to_string(),
            format!("0:s:{}", track.track),
            path_arg(dest),
        ];
        self.ffmpeg(args, cancel)?;
        Ok(true)
    }
}

impl Renderer for FfmpegRenderer {
    #[tracing::instrument(skip_all, fields(key = %source.key, output = %output.display()))]
    fn clip(
        &mut self,
        format: &Format,
        source: &Source,
        region: Region,
        output: &Path,
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        let subtitles = tempfile::Builder::new()
            .prefix("mashup-clip-")
            .suffix(".ass")
            .tempfile()
            .context("failed to create subtitle file")?;

        let burned = match self.extract_subtitles(source, region, subtitles.path(), cancel) {
            Ok(extracted) => extracted,
            Err(e @ MashupError::Cancelled(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(key = %source.key, error = %e, "unable to extract subtitles");
                false
            }
        };
        let subtitle_path = burned.then(|| subtitles.path());

        let args = clip_args(format, source, region, output, subtitle_path, &self.loglevel);
        self.ffmpeg(args, cancel)
    }

    #[tracing::instrument(skip_all, fields(output = %output.display(), inputs = inputs.len()))]
    fn concat(
        &mut self,
        format: &Format,
        output: &Path,
        inputs: &[PathBuf],
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        let args = concat_args(format, output, inputs, &self.loglevel);
        self.ffmpeg(args, cancel)
    }

    #[tracing::instrument(skip_all, fields(output = %output.display(), inputs = inputs.len()))]
    fn stack(
        &mut self,
        format: &Format,
        output: &Path,
        duration: Duration,
        inputs: &[PathBuf],
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        let args = stack_args(format, output, duration, inputs, &self.loglevel);
        self.ffmpeg(args, cancel)
    }

    #[tracing::instrument(skip_all, fields(template = %template, output = %output.display()))]
    fn blend(
        &mut self,
        template: &str,
        format: &Format,
        output: &Path,
        attachments: &BTreeMap<String, PathBuf>,
        cancel: &CancelToken,
    ) -> MashupResult<()> {
        let (script, blend) = self.locate_blend(template)?;
        let args = blend_args(&blend, &script, format, output, attachments);
        run_tool("blender", &args, cancel)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Arguments every ffmpeg invocation starts with.
pub fn ffmpeg_prelude(loglevel: &str) -> Vec<String> {
    [
        "-loglevel",
        loglevel,
        "-analyzeduration",
        "2147483647",
        "-probesize",
        "2147483647",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Encoder selection plus the output options shared by every ffmpeg render.
pub fn codec_args(format: &Format, loglevel: &str) -> Vec<String> {
    let mut args: Vec<String> = match format.video_codec {
        VideoCodec::H264 => vec![
            "-codec:v".into(),
            "libx264".into(),
            "-x264-params".into(),
            format!("log-level={loglevel}"),
        ],
        VideoCodec::H265 => vec![
            "-codec:v".into(),
            "libx265".into(),
            "-x265-params".into(),
            format!("log-level={loglevel}"),
        ],
        VideoCodec::Vp9 => vec!["-codec:v".into(), "vp9".into()],
    };
    let audio = match format.audio_codec {
        AudioCodec::Aac => "aac",
        AudioCodec::Flac => "flac",
    };
    args.extend([
        "-g".to_string(),
        format.gop_size.to_string(),
        "-r".to_string(),
        format.frame_rate.to_string(),
        "-codec:a".to_string(),
        audio.to_string(),
        "-b:a".to_string(),
        format!("{}k", format.bit_rate),
        "-ar".to_string(),
        format.sample_rate.to_string(),
        "-ac".to_string(),
        "2".to_string(),
    ]);
    args
}

/// Make `value` safe inside a single-quoted filter-graph string.
fn quote_filter_value(value: &str) -> String {
    value.replace('\'', r"'\''")
}

pub fn clip_args(
    format: &Format,
    source: &Source,
    region: Region,
    output: &Path,
    subtitles: Option<&Path>,
    loglevel: &str,
) -> Vec<String> {
    let mut args = Vec::new();
    let mut filters = Vec::new();
    let (mut input, mut video, mut audio) = (0usize, 0usize, 0usize);
    let span = region.duration().as_micros();

    let trimmed_input = |args: &mut Vec<String>, path: &Path| {
        args.extend([
            "-ss".to_string(),
            format!("{}us", region.start.as_micros()),
            "-to".to_string(),
            format!("{}us", region.end.as_micros()),
            "-i".to_string(),
            path_arg(path),
        ]);
    };

    if let Some(track) = &source.video {
        trimmed_input(&mut args, &track.path);
        filters.push(format!("[{input}:v:{}]null[v{video}]", track.track));
        input += 1;
    }

    if let Some(track) = &source.audio {
        trimmed_input(&mut args, &track.path);
        filters.push(format!(
            "[{input}:a:{}]loudnorm,aresample={}[a{audio}]",
            track.track, format.sample_rate
        ));
        if source.video.is_none() {
            filters.push(format!(
                "[{input}:a:{}]avectorscope=size={}x{}:rate={}[v{video}]",
                track.track, format.width, format.height, format.frame_rate
            ));
        }
    } else {
        filters.push(format!(
            "anullsrc=sample_rate={}:duration={span}us[a{audio}]",
            format.sample_rate
        ));
    }

    if source.video.is_none() && source.audio.is_none() {
        filters.push(format!(
            "nullsrc=size={}x{}:rate={}:duration={span}us,geq=random(1)*255:128:128[v{video}]",
            format.width, format.height, format.frame_rate
        ));
    }

    if let Some(filter) = source.video.as_ref().and_then(|t| t.filter.as_ref()) {
        filters.push(format!("[v{video}]{filter}[v{}]", video + 1));
        video += 1;
    }
    if let Some(filter) = source.audio.as_ref().and_then(|t| t.filter.as_ref()) {
        filters.push(format!("[a{audio}]{filter}[a{}]", audio + 1));
        audio += 1;
    }

    if let Some(path) = subtitles {
        filters.push(format!(
            "[v{video}]subtitles=filename='{}'[v{}]",
            quote_filter_value(&path.to_string_lossy()),
            video + 1
        ));
        video += 1;
    }

    if source.video.is_some() {
        filters.push(format!(
            "[v{video}]scale=width={w}:height={h}:force_original_aspect_ratio=decrease,\
             pad=width={w}:height={h}:x=(ow-iw)/2:y=(oh-ih)/2,setsar=1:1[v{}]",
            video + 1,
            w = format.width,
            h = format.height,
        ));
        video += 1;
    }

    let stamp = source.stamp.as_ref().unwrap_or(&format.stamp);
    filters.push(format!(
        "[v{video}]drawtext=borderw=2:fontcolor={}:fontfile='{}':fontsize={}:text='{}':x=w-tw-8:y=h-th-8[v{}]",
        stamp.color,
        quote_filter_value(&stamp.font.to_string_lossy()),
        stamp.size,
        quote_filter_value(&source.key),
        video + 1
    ));
    video += 1;

    args.push("-filter_complex".to_string());
    args.push(filters.join(";"));
    args.extend(codec_args(format, loglevel));
    args.extend([
        "-map".to_string(),
        format!("[v{video}]"),
        "-map".to_string(),
        format!("[a{audio}]"),
        "-map_metadata".to_string(),
        "-1".to_string(),
        "-map_chapters".to_string(),
        "-1".to_string(),
        path_arg(output),
    ]);
    args
}

pub fn concat_args(format: &Format, output: &Path, inputs: &[PathBuf], loglevel: &str) -> Vec<String> {
    let mut args = Vec::with_capacity(inputs.len() * 2 + 16);
    for path in inputs {
        args.push("-i".to_string());
        args.push(path_arg(path));
    }
    let streams: String = (0..inputs.len()).map(|i| format!("[{i}:v][{i}:a]")).collect();
    args.push("-filter_complex".to_string());
    args.push(format!("{streams}concat=n={}:v=1:a=1[v][a]", inputs.len()));
    args.extend(codec_args(format, loglevel));
    args.extend([
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "[a]".to_string(),
        "-map_metadata".to_string(),
        "-1".to_string(),
        "-map_chapters".to_string(),
        "-1".to_string(),
        path_arg(output),
    ]);
    args
}

/// `xstack` layout for a `side × side` grid of `n` equally sized inputs, row-major.
pub fn stack_layout(n: usize) -> String {
    let side = n.isqrt();
    let offset = |axis: char, k: usize| -> String {
        if k == 0 {
            "0".to_string()
        } else {
            (0..k)
                .map(|i| format!("{axis}{i}"))
                .collect::<Vec<_>>()
                .join("+")
        }
    };
    (0..side)
        .flat_map(|row| (0..side).map(move |col| (row, col)))
        .map(|(row, col)| format!("{}_{}", offset('w', col), offset('h', row)))
        .collect::<Vec<_>>()
        .join("|")
}

pub fn stack_args(
    format: &Format,
    output: &Path,
    duration: Duration,
    inputs: &[PathBuf],
    loglevel: &str,
) -> Vec<String> {
    let n = inputs.len();
    let mut args = Vec::with_capacity(n * 2 + 20);
    for path in inputs {
        args.push("-i".to_string());
        args.push(path_arg(path));
    }
    let videos: String = (0..n).map(|i| format!("[{i}:v]")).collect();
    let audios: String = (0..n).map(|i| format!("[{i}:a]")).collect();
    args.push("-filter_complex".to_string());
    args.push(format!(
        "{videos}xstack=inputs={n}:layout={},scale={}x{}[v];{audios}amix=inputs={n},loudnorm[a]",
        stack_layout(n),
        format.width,
        format.height
    ));
    args.extend(codec_args(format, loglevel));
    args.extend([
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "[a]".to_string(),
        "-t".to_string(),
        format!("{}us", duration.as_micros()),
        path_arg(output),
    ]);
    args
}

pub fn blend_args(
    blend: &Path,
    script: &Path,
    format: &Format,
    output: &Path,
    attachments: &BTreeMap<String, PathBuf>,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--background".into(),
        "--factory-startup".into(),
        path_arg(blend),
        "--python".into(),
        path_arg(script),
        "--threads".into(),
        "0".into(),
        "--render-anim".into(),
        "--".into(),
    ];
    for (flag, value) in [
        ("-output", path_arg(output)),
        ("-format", format.format.name().to_string()),
        ("-samples", format.samples.to_string()),
        ("-quality", format.quality.clone()),
        ("-speed", format.speed.clone()),
        ("-vcodec", format.video_codec.name().to_string()),
        ("-acodec", format.audio_codec.name().to_string()),
        ("-fps", format.frame_rate.to_string()),
        ("-samplerate", format.sample_rate.to_string()),
        ("-bitrate", format.bit_rate.to_string()),
        ("-gopsize", format.gop_size.to_string()),
        ("-width", format.width.to_string()),
        ("-height", format.height.to_string()),
    ] {
        args.push(flag.to_string());
        args.push(value);
    }
    for (slot, path) in attachments {
        args.extend(["-attach".to_string(), slot.clone(), path_arg(path)]);
    }
    args
}

/// Run `program` to completion, killing it if `cancel` fires first.
///
/// A non-zero exit becomes [`MashupError::ExternalTool`] carrying the tail of its stderr.
pub fn run_tool(program: &str, args: &[String], cancel: &CancelToken) -> MashupResult<()> {
    cancel.check(program)?;
    tracing::debug!(program, ?args, "spawning external tool");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            MashupError::external_tool(format!(
                "failed to spawn {program} (is it installed and on PATH?): {e}"
            ))
        })?;

    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| MashupError::external_tool(format!("failed to open {program} stderr")))?;
    let stderr_drain = std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes)?;
        Ok::<_, std::io::Error>(bytes)
    });

    let status = loop {
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            // Grandchildren may still hold stderr open; the drain thread finishes on its own.
            drop(stderr_drain);
            return Err(MashupError::cancelled(format!("{program} was interrupted")));
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(MashupError::external_tool(format!(
                    "failed to wait for {program}: {e}"
                )));
            }
        }
    };

    let stderr_bytes = stderr_drain
        .join()
        .map_err(|_| MashupError::external_tool(format!("{program} stderr drain thread panicked")))?
        .map_err(|e| MashupError::external_tool(format!("{program} stderr read failed: {e}")))?;

    if !status.success() {
        let stderr = String::from_utf8_lossy(&stderr_bytes);
        let lines: Vec<&str> = stderr.trim().lines().collect();
        let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
        return Err(MashupError::external_tool(format!(
            "{program} exited with status {status}: {tail}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/ffmpeg.rs"]
mod tests;
