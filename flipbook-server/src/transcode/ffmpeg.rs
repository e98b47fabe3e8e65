use std::{
    ffi::OsString,
    path::Path,
    process::Stdio,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use axum::body::Bytes;
use flipbook_core::{MediaKind, OutputContainer};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{
    BackendHealth, TranscodeError, TranscodeJob, TranscodeOutput, Transcoder,
};

const BACKEND: &str = "ffmpeg";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
/// Even dimensions are required by yuv420p; odd sizes gain one pixel.
const EVEN_PAD_FILTER: &str = "pad=ceil(iw/2)*2:ceil(ih/2)*2";
const STDERR_TAIL_LINES: usize = 8;

/// Runs a local `ffmpeg` per job against scratch files in a temp directory.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout,
        }
    }
}

/// Builds the full ffmpeg argument list for `job`.
///
/// ffmpeg rasterizes a single frame of SVG input, so an animated SVG cannot
/// become an MP4 here.
pub fn build_args(
    job: &TranscodeJob,
    input: &Path,
    output: &Path,
) -> Result<Vec<OsString>, TranscodeError> {
    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y"]
        .into_iter()
        .map(OsString::from)
        .collect();

    let demuxer = match (job.kind, job.container) {
        (MediaKind::Svg, OutputContainer::Mp4) => {
            return Err(TranscodeError::Unsupported {
                backend: BACKEND,
                reason: "animated SVG cannot be encoded to MP4 by ffmpeg".into(),
            });
        }
        (MediaKind::Svg, _) => "svg_pipe",
        (MediaKind::Gif, _) => "gif",
    };

    args.extend([
        OsString::from("-f"),
        OsString::from(demuxer),
        OsString::from("-i"),
    ]);
    args.push(input.as_os_str().to_owned());

    match job.container {
        OutputContainer::Mp4 => {
            let filter = format!("{},{}", job.scale.filter(), EVEN_PAD_FILTER);
            args.extend(
                [
                    "-vf",
                    filter.as_str(),
                    "-movflags",
                    "+faststart",
                    "-pix_fmt",
                    "yuv420p",
                    "-c:v",
                    "libx264",
                    "-an",
                ]
                .into_iter()
                .map(OsString::from),
            );
        }
        OutputContainer::Png => {
            let filter = job.scale.filter();
            args.extend(
                ["-vf", filter.as_str(), "-frames:v", "1"]
                    .into_iter()
                    .map(OsString::from),
            );
        }
    }

    args.push(output.as_os_str().to_owned());
    Ok(args)
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn health(&self) -> BackendHealth {
        let probe = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(HEALTH_TIMEOUT, probe).await {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let version = stdout.lines().next().unwrap_or("ffmpeg").trim();
                BackendHealth::ready(version)
            }
            Ok(Ok(output)) => BackendHealth::unavailable(format!(
                "{} exited with {}",
                self.ffmpeg_path, output.status
            )),
            Ok(Err(err)) => BackendHealth::unavailable(format!(
                "failed to run {}: {err}",
                self.ffmpeg_path
            )),
            Err(_) => BackendHealth::unavailable(format!(
                "{} -version did not finish within {:?}",
                self.ffmpeg_path, HEALTH_TIMEOUT
            )),
        }
    }

    async fn transcode(
        &self,
        job: TranscodeJob,
    ) -> Result<TranscodeOutput, TranscodeError> {
        let scratch = tempfile::Builder::new().prefix("flipbook-").tempdir()?;
        let input = scratch.path().join(format!("source.{}", job.kind.as_str()));
        let output = scratch
            .path()
            .join(format!("output.{}", job.container.extension()));

        let args = build_args(&job, &input, &output)?;
        tokio::fs::write(&input, &job.source).await?;

        debug!(
            ffmpeg = %self.ffmpeg_path,
            args = ?args,
            "spawning ffmpeg"
        );

        let started = Instant::now();
        let child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                TranscodeError::Failed(format!(
                    "failed to spawn {}: {err}",
                    self.ffmpeg_path
                ))
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let result =
            match tokio::time::timeout(self.timeout, child.wait_with_output())
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    warn!(
                        timeout = ?self.timeout,
                        stem = %job.stem,
                        "ffmpeg timed out, killing child"
                    );
                    return Err(TranscodeError::TimedOut(self.timeout));
                }
            };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TranscodeError::Failed(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr_tail(&stderr)
            )));
        }

        let bytes = tokio::fs::read(&output).await?;
        info!(
            kind = %job.kind,
            container = %job.container,
            scale = %job.scale,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ffmpeg transcode complete"
        );

        Ok(TranscodeOutput {
            bytes: Bytes::from(bytes),
            container: job.container,
        })
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("; ")
}
