//! Core data models for the catalog.
//!
//! Defines the persistent records: [`CatalogEntry`] for confirmed tracks and
//! [`CandidateTrack`] for tracks known from discography discovery but not
//! yet backed by a local file.
//!
//! # Database Schema
//!
//! The models map to the following tables:
//! - `catalog_entries` - Confirmed tracks, `relative_path` unique when present
//! - `candidates` - Discovered tracks, unique per case-insensitive (artist, track)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::normalize;

/// Placeholder artist name for files with no derivable artist.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Placeholder album name used for directory layout.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// A confirmed track in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Track title (never empty)
    pub track_name: String,
    /// Credited artist, possibly the [`UNKNOWN_ARTIST`] placeholder
    pub artist_name: String,
    /// Album title (advisory)
    pub album: Option<String>,
    /// Genre (advisory)
    pub genre: Option<String>,
    /// Path relative to the library root, once a backing file is located
    pub relative_path: Option<String>,
}

impl CatalogEntry {
    /// True if the artist is missing or still the placeholder.
    pub fn has_unknown_artist(&self) -> bool {
        is_unknown_artist(&self.artist_name)
    }
}

/// Fields for a catalog entry that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub track_name: String,
    pub artist_name: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub relative_path: Option<String>,
}

/// Acquisition status of a candidate track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    /// Discovered, never attempted
    #[default]
    Pending,
    /// Acquisition started
    Attempted,
    /// File acquired and verified
    Succeeded,
    /// Every acquisition tool failed
    Failed,
}

impl CandidateStatus {
    /// Convert to string representation for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Pending => "pending",
            CandidateStatus::Attempted => "attempted",
            CandidateStatus::Succeeded => "succeeded",
            CandidateStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CandidateStatus::Pending),
            "attempted" => Ok(CandidateStatus::Attempted),
            "succeeded" => Ok(CandidateStatus::Succeeded),
            "failed" => Ok(CandidateStatus::Failed),
            other => Err(format!("unknown candidate status: {other}")),
        }
    }
}

impl std::fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A track known from discography discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTrack {
    pub track_name: String,
    pub artist_name: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub status: CandidateStatus,
}

impl CandidateTrack {
    /// Create a pending candidate.
    pub fn new(track_name: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            track_name: track_name.into(),
            artist_name: artist_name.into(),
            album: None,
            genre: None,
            status: CandidateStatus::Pending,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Case-insensitive identity of this candidate.
    pub fn key(&self) -> (String, String) {
        normalize::dedup_key(&self.track_name, &self.artist_name)
    }
}

/// A candidate with its storage identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCandidate {
    pub id: i64,
    pub track: CandidateTrack,
}

/// True for empty names and the [`UNKNOWN_ARTIST`] placeholder.
pub fn is_unknown_artist(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN_ARTIST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            CandidateStatus::Pending,
            CandidateStatus::Attempted,
            CandidateStatus::Succeeded,
            CandidateStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<CandidateStatus>(), Ok(status));
        }
        assert!("done".parse::<CandidateStatus>().is_err());
    }

    #[test]
    fn test_candidate_key_is_case_insensitive() {
        let a = CandidateTrack::new("Shape Of You", "Ed Sheeran");
        let b = CandidateTrack::new("shape of you ", "ED SHEERAN");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_unknown_artist() {
        assert!(is_unknown_artist(""));
        assert!(is_unknown_artist("  "));
        assert!(is_unknown_artist("unknown artist"));
        assert!(!is_unknown_artist("Adele"));
    }
}
