use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::application::ports::{MediaToolError, MediaToolkit};
use crate::domain::{ReframeDecision, VideoDimensions};

const AUDIO_SAMPLE_RATE: &str = "16000";
// libx264 with yuv420p rejects odd frame sizes.
const EVEN_DIMENSIONS_FILTER: &str = "scale=trunc(iw/2)*2:trunc(ih/2)*2";

/// [`MediaToolkit`] backed by the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegToolkit {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    async fn ffmpeg(&self, args: Vec<OsString>) -> Result<(), MediaToolError> {
        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(args);
        run(command, &self.ffmpeg).await.map(|_| ())
    }

    async fn probe(&self, media: &Path, args: &[&str]) -> Result<ProbeOutput, MediaToolError> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "error", "-print_format", "json"])
            .args(args)
            .arg(media);
        let output = run(command, &self.ffprobe).await?;
        serde_json::from_slice(&output.stdout)
            .map_err(|e| MediaToolError::Probe(format!("{}: {}", media.display(), e)))
    }
}

async fn run(mut command: Command, tool: &Path) -> Result<Output, MediaToolError> {
    let tool_name = tool.display().to_string();
    tracing::trace!(tool = %tool_name, command = ?command.as_std(), "Running media tool");
    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| MediaToolError::Spawn {
            tool: tool_name.clone(),
            source,
        })?;
    if !output.status.success() {
        return Err(MediaToolError::Failed {
            tool: tool_name,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

fn seconds_arg(d: Duration) -> OsString {
    OsString::from(format!("{:.3}", d.as_secs_f64()))
}

#[async_trait]
impl MediaToolkit for FfmpegToolkit {
    async fn extract_normalized_audio(
        &self,
        video: &Path,
        output: &Path,
    ) -> Result<(), MediaToolError> {
        self.ffmpeg(vec![
            "-i".into(),
            video.into(),
            "-vn".into(),
            "-map".into(),
            "0:a:0".into(),
            "-ac".into(),
            "1".into(),
            "-ar".into(),
            AUDIO_SAMPLE_RATE.into(),
            "-c:a".into(),
            "pcm_s16le".into(),
            output.into(),
        ])
        .await
    }

    async fn probe_duration(&self, media: &Path) -> Result<Duration, MediaToolError> {
        let probe = self.probe(media, &["-show_entries", "format=duration"]).await?;
        let raw = probe
            .format
            .and_then(|f| f.duration)
            .ok_or_else(|| MediaToolError::Probe(format!("{}: no duration", media.display())))?;
        parse_probe_duration(&raw)
    }

    async fn probe_dimensions(&self, video: &Path) -> Result<VideoDimensions, MediaToolError> {
        let probe = self
            .probe(
                video,
                &["-select_streams", "v:0", "-show_entries", "stream=width,height"],
            )
            .await?;
        let stream = probe
            .streams
            .into_iter()
            .next()
            .ok_or_else(|| MediaToolError::Probe(format!("{}: no video stream", video.display())))?;
        match (stream.width, stream.height) {
            (Some(width), Some(height)) => Ok(VideoDimensions::new(width, height)),
            _ => Err(MediaToolError::Probe(format!(
                "{}: video stream has no dimensions",
                video.display()
            ))),
        }
    }

    async fn cut_audio(
        &self,
        audio: &Path,
        start: Duration,
        duration: Duration,
        output: &Path,
    ) -> Result<(), MediaToolError> {
        self.ffmpeg(vec![
            "-ss".into(),
            seconds_arg(start),
            "-t".into(),
            seconds_arg(duration),
            "-i".into(),
            audio.into(),
            "-c".into(),
            "copy".into(),
            output.into(),
        ])
        .await
    }

    async fn reframe(
        &self,
        video: &Path,
        decision: &ReframeDecision,
        output: &Path,
    ) -> Result<(), MediaToolError> {
        let (Some(filters), Some(encode)) = (decision.filter_chain(), decision.encode_parameters())
        else {
            return Err(MediaToolError::PassThrough);
        };
        let filters = format!("{},{}", filters, EVEN_DIMENSIONS_FILTER);

        let mut args: Vec<OsString> = vec!["-i".into(), video.into(), "-vf".into(), filters.into()];
        args.extend(encode.to_ffmpeg_args().into_iter().map(OsString::from));
        args.push(output.into());

        self.ffmpeg(args).await
    }
}

/// Parses the `format=duration` value ffprobe reports, in seconds.
pub fn parse_probe_duration(raw: &str) -> Result<Duration, MediaToolError> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|e| MediaToolError::Probe(format!("bad duration {:?}: {}", raw, e)))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| MediaToolError::Probe(format!("bad duration {:?}: {}", raw, e)))
}
