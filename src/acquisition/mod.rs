//! Acquisition cascade: fetch a missing track with external tools.
//!
//! Tools are tried in order until one produces a verified, non-empty file.
//! Each attempt runs in its own `.acquire-XXXX` staging directory inside
//! the album folder, so concurrent tasks never see each other's partial
//! output. A verified file is moved to `Artist/Album/Track.ext` (with a
//! ` (n)` suffix if that name is taken) and the staging directory is
//! removed.
//!
//! [`AcquisitionCascade::acquire`] never returns an error; every failure
//! is reported through [`AcquisitionResult`].

mod tools;

pub use tools::{AcquisitionTool, SpotDl, ToolRequest, YtDlp, run_tool};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::CandidateTrack;
use crate::organizer;
use crate::scanner::is_audio_file;

/// Tool settings, built once from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    /// Per-tool timeout
    pub timeout: Duration,
    pub ytdlp_program: String,
    pub spotdl_program: String,
    pub audio_format: String,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            ytdlp_program: "yt-dlp".to_string(),
            spotdl_program: "spotdl".to_string(),
            audio_format: "mp3".to_string(),
        }
    }
}

/// Which tool produced a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcquisitionMethod {
    #[serde(rename = "yt-dlp")]
    YtDlp,
    #[serde(rename = "spotdl")]
    SpotDl,
}

impl AcquisitionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionMethod::YtDlp => "yt-dlp",
            AcquisitionMethod::SpotDl => "spotdl",
        }
    }
}

impl std::fmt::Display for AcquisitionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionResult {
    pub success: bool,
    pub file_path: Option<PathBuf>,
    /// Path relative to the library root, when the file landed inside it
    pub relative_path: Option<String>,
    pub method: Option<AcquisitionMethod>,
    pub error: Option<String>,
}

impl AcquisitionResult {
    fn succeeded(file_path: PathBuf, relative_path: Option<String>, method: AcquisitionMethod) -> Self {
        Self {
            success: true,
            file_path: Some(file_path),
            relative_path,
            method: Some(method),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            file_path: None,
            relative_path: None,
            method: None,
            error: Some(error.into()),
        }
    }
}

/// Ordered download tools plus the library they fill.
pub struct AcquisitionCascade {
    tools: Vec<Arc<dyn AcquisitionTool>>,
    library_root: PathBuf,
}

impl AcquisitionCascade {
    /// Cascade over `tools`, highest priority first. Relative paths are
    /// computed against `library_root`.
    pub fn new(tools: Vec<Arc<dyn AcquisitionTool>>, library_root: impl Into<PathBuf>) -> Self {
        Self {
            tools,
            library_root: library_root.into(),
        }
    }

    /// The standard cascade: yt-dlp, then spotdl.
    pub fn with_default_tools(settings: &AcquisitionSettings, library_root: impl Into<PathBuf>) -> Self {
        let ytdlp: Arc<dyn AcquisitionTool> = Arc::new(YtDlp::from_settings(settings));
        let spotdl: Arc<dyn AcquisitionTool> = Arc::new(SpotDl::from_settings(settings));
        Self::new(vec![ytdlp, spotdl], library_root)
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Fetch `track` into `destination_root/Artist/Album/`.
    pub async fn acquire(&self, track: &CandidateTrack, destination_root: &Path) -> AcquisitionResult {
        if self.tools.is_empty() {
            return AcquisitionResult::failed("No acquisition tools configured");
        }

        let dest = organizer::album_dir(
            destination_root,
            Some(&track.artist_name),
            track.album.as_deref(),
        );
        if let Err(e) = organizer::ensure_dir(&dest) {
            return AcquisitionResult::failed(e.to_string());
        }

        let file_stem = organizer::sanitize(&track.track_name);
        let request = ToolRequest {
            artist: &track.artist_name,
            track: &track.track_name,
            file_stem: &file_stem,
        };

        let mut last_error = String::new();
        for tool in &self.tools {
            match self.attempt(tool.as_ref(), &request, &dest).await {
                Ok(result) => {
                    info!(
                        target: "music_curator::acquisition",
                        method = %tool.method(),
                        path = ?result.file_path,
                        "Acquired {} - {}", track.artist_name, track.track_name
                    );
                    return result;
                }
                Err(e) => {
                    warn!(
                        target: "music_curator::acquisition",
                        method = %tool.method(),
                        error = %e,
                        "Attempt failed for {} - {}", track.artist_name, track.track_name
                    );
                    last_error = e;
                }
            }
        }

        let tried: Vec<&str> = self.tools.iter().map(|t| t.method().as_str()).collect();
        AcquisitionResult::failed(format!(
            "Download failed with {}: {last_error}",
            tried.join(", ")
        ))
    }

    /// One tool attempt in a fresh staging directory (removed on return).
    async fn attempt(
        &self,
        tool: &dyn AcquisitionTool,
        request: &ToolRequest<'_>,
        dest: &Path,
    ) -> Result<AcquisitionResult, String> {
        let staging = tempfile::Builder::new()
            .prefix(".acquire-")
            .tempdir_in(dest)
            .map_err(|e| format!("Failed to create staging directory: {e}"))?;

        tool.fetch(request, staging.path()).await?;

        let staged = verify_staged(staging.path())?;
        let ext = staged
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "mp3".to_string());
        let target = dest.join(format!("{}.{}", request.file_stem, ext));

        let moved = organizer::move_file(&staged, &target).map_err(|e| e.to_string())?;
        let relative = organizer::relative_path(&self.library_root, &moved);

        Ok(AcquisitionResult::succeeded(moved, relative, tool.method()))
    }
}

/// The staged audio file, checked to exist and be non-empty.
///
/// An empty file is deleted before the error is returned.
fn verify_staged(staging: &Path) -> Result<PathBuf, String> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(staging)
        .map_err(|e| format!("Failed to read staging directory: {e}"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_audio_file(path))
        .collect();
    files.sort();

    let Some(file) = files.into_iter().next() else {
        return Err("File not found after download".to_string());
    };

    let size = std::fs::metadata(&file).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        if let Err(e) = std::fs::remove_file(&file) {
            debug!(target: "music_curator::acquisition", path = %file.display(), error = %e, "Could not remove empty download");
        }
        return Err("Downloaded file is empty".to_string());
    }
    Ok(file)
}
