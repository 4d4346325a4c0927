//! Provider-neutral domain models.
//!
//! These types are OUR types - they don't change when external APIs change.
//! Every provider response is converted into them by that provider's adapter.

/// An artist resolved by a provider search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderArtist {
    /// Provider-specific artist id
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Artist-level genres, most relevant first
    pub genres: Vec<String>,
}

/// A release (album, single, compilation) listed for an artist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderAlbum {
    /// Provider-specific release id
    pub id: String,
    /// Release title
    pub title: String,
    /// Release-level genres, most relevant first
    pub genres: Vec<String>,
}

/// A track from a release listing or a keyword search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderTrack {
    /// Track title
    pub title: String,
    /// Credited artist, if the provider returned one
    pub artist: Option<String>,
    /// Release title (search results only; listings inherit the album)
    pub album: Option<String>,
    /// Track-level genre, rarely available
    pub genre: Option<String>,
}

/// A weighted tag from a tag-capable provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreTag {
    /// Tag name as returned by the provider
    pub name: String,
    /// Provider popularity count
    pub weight: u32,
}

impl GenreTag {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Artist and album for a recording found by title alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingMatch {
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// How the aggregator walks a provider's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Walk every page of albums and album tracks until a short page.
    Paginated { page_size: u32 },
    /// Read one bounded album page, then fall back to a keyword search
    /// when that produced no tracks.
    Bounded {
        max_albums: u32,
        max_search_results: u32,
    },
}

/// Errors returned by provider clients.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider is not configured")]
    NotConfigured,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("API request failed: {0}")]
    Api(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}
