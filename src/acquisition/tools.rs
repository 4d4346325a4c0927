//! External download tools.
//!
//! Each tool is a subprocess run inside a staging directory with a hard
//! timeout. The child is killed if the timeout elapses or the task is
//! dropped.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{AcquisitionMethod, AcquisitionSettings};

/// Longest stderr excerpt carried into an error message.
const STDERR_EXCERPT: usize = 200;

/// What to fetch.
#[derive(Debug, Clone)]
pub struct ToolRequest<'a> {
    pub artist: &'a str,
    pub track: &'a str,
    /// Sanitized file stem the tool should write
    pub file_stem: &'a str,
}

impl ToolRequest<'_> {
    /// Free-text search query ("artist track").
    pub fn query(&self) -> String {
        format!("{} {}", self.artist.trim(), self.track.trim())
            .trim()
            .to_string()
    }
}

/// One download method.
///
/// `fetch` reports the tool's own verdict only; the caller verifies that a
/// usable file actually landed in `staging`.
#[async_trait]
pub trait AcquisitionTool: Send + Sync {
    fn method(&self) -> AcquisitionMethod;

    async fn fetch(&self, request: &ToolRequest<'_>, staging: &Path) -> Result<(), String>;
}

/// Search-and-extract via yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlp {
    pub program: String,
    pub audio_format: String,
    pub timeout: Duration,
}

impl YtDlp {
    pub fn from_settings(settings: &AcquisitionSettings) -> Self {
        Self {
            program: settings.ytdlp_program.clone(),
            audio_format: settings.audio_format.clone(),
            timeout: settings.timeout,
        }
    }

    fn args(&self, request: &ToolRequest<'_>, staging: &Path) -> Vec<String> {
        let template = staging.join(format!("{}.%(ext)s", request.file_stem));
        vec![
            "--extract-audio".into(),
            "--audio-format".into(),
            self.audio_format.clone(),
            "--audio-quality".into(),
            "0".into(),
            "--default-search".into(),
            "ytsearch".into(),
            "--output".into(),
            template.to_string_lossy().into_owned(),
            "--no-playlist".into(),
            format!("ytsearch1:{}", request.query()),
        ]
    }
}

#[async_trait]
impl AcquisitionTool for YtDlp {
    fn method(&self) -> AcquisitionMethod {
        AcquisitionMethod::YtDlp
    }

    async fn fetch(&self, request: &ToolRequest<'_>, staging: &Path) -> Result<(), String> {
        run_tool(&self.program, &self.args(request, staging), staging, self.timeout).await
    }
}

/// Search-and-download via spotdl.
#[derive(Debug, Clone)]
pub struct SpotDl {
    pub program: String,
    pub audio_format: String,
    pub timeout: Duration,
}

impl SpotDl {
    pub fn from_settings(settings: &AcquisitionSettings) -> Self {
        Self {
            program: settings.spotdl_program.clone(),
            audio_format: settings.audio_format.clone(),
            timeout: settings.timeout,
        }
    }

    fn args(&self, request: &ToolRequest<'_>) -> Vec<String> {
        vec![
            "download".into(),
            request.query(),
            "--format".into(),
            self.audio_format.clone(),
            "--output".into(),
            "{artist} - {title}.{output-ext}".into(),
        ]
    }
}

#[async_trait]
impl AcquisitionTool for SpotDl {
    fn method(&self) -> AcquisitionMethod {
        AcquisitionMethod::SpotDl
    }

    async fn fetch(&self, request: &ToolRequest<'_>, staging: &Path) -> Result<(), String> {
        // spotdl writes relative to its working directory
        run_tool(&self.program, &self.args(request), staging, self.timeout).await
    }
}

/// Run `program` in `cwd`, failing on spawn error, timeout or non-zero exit.
pub async fn run_tool(
    program: &str,
    args: &[String],
    cwd: &Path,
    timeout: Duration,
) -> Result<(), String> {
    let child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("{program} could not be started: {e}"))?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Err(_) => Err(format!("{program} timed out after {}s", timeout.as_secs_f32())),
        Ok(Err(e)) => Err(format!("{program} failed: {e}")),
        Ok(Ok(output)) if output.status.success() => Ok(()),
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
            if excerpt.is_empty() {
                Err(format!("{program} exited with {}", output.status))
            } else {
                Err(format!("{program} exited with {}: {}", output.status, excerpt))
            }
        }
    }
}
