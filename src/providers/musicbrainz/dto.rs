//! Response shapes of the MusicBrainz web service (JSON, `fmt=json`).
//!
//! Only the fields this crate reads are declared; everything is optional
//! or defaulted because MusicBrainz omits empty values. Nothing outside
//! `musicbrainz` sees these types: the adapter turns them into domain
//! models.
//!
//! We use the search endpoints (`/artist`, `/recording` with `query=`), the
//! browse endpoints (`/release-group?artist=`, `/release?release-group=`)
//! and lookups with `inc=tags`.

use serde::{Deserialize, Serialize};

/// Folksonomy tag with vote count
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    /// Net votes (can be negative)
    pub count: i32,
    pub name: String,
}

/// Artist search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistSearchResponse {
    pub count: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// Artist (search result or lookup)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
    /// Search relevance (search results only)
    pub score: Option<u32>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Release group browse response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroupBrowse {
    pub release_group_count: Option<u32>,
    pub release_group_offset: Option<u32>,
    #[serde(default)]
    pub release_groups: Vec<ReleaseGroup>,
}

/// Release group (e.g., "Abbey Road" across all editions)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    /// MusicBrainz release group ID
    pub id: String,
    /// Title
    pub title: String,
    /// Primary type (Album, Single, EP, etc.)
    pub primary_type: Option<String>,
    /// First release date
    pub first_release_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Release browse response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseBrowse {
    pub release_count: Option<u32>,
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Release (one edition of a release group)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: String,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
    /// Parent release group (present in recording search results)
    pub release_group: Option<ReleaseGroup>,
    /// Media (discs), present with `inc=recordings`
    #[serde(default)]
    pub media: Vec<Medium>,
}

/// Medium (disc) within a release
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Medium {
    pub position: Option<u32>,
    pub format: Option<String>,
    pub track_count: Option<u32>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Track on a medium
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub position: Option<u32>,
    /// Track title (may differ from recording title)
    pub title: Option<String>,
    pub recording: Option<RecordingRef>,
}

/// Recording reference inside a track
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingRef {
    pub id: String,
    pub title: String,
}

/// Recording search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingSearchResponse {
    pub count: Option<u32>,
    pub offset: Option<u32>,
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// Recording (search result or lookup)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    pub id: String,
    pub title: String,
    pub score: Option<u32>,
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
    pub artist: CreditedArtist,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreditedArtist {
    pub id: String,
    pub name: String,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// Contract tests: captured response bodies must keep deserializing.
// ============================================================================
