//! External metadata providers.
//!
//! # Architecture
//!
//! Same separation as every API integration in this crate:
//! - **Domain models** (`domain.rs`) - provider-neutral types
//! - **API DTOs** (`spotify/dto.rs`, `musicbrainz/dto.rs`) - exact response shapes
//! - **Adapters** - the only DTO-to-domain conversions
//! - **Clients** - HTTP clients implementing the traits in `traits.rs`
//!
//! The discography aggregator only sees [`ProviderClient`] trait objects in
//! a fixed priority order, built once from an immutable [`ProviderConfig`].

pub mod domain;
pub mod musicbrainz;
pub mod spotify;
pub mod traits;

use std::sync::Arc;
use std::time::Duration;

pub use domain::{
    FetchStrategy, GenreTag, ProviderAlbum, ProviderArtist, ProviderError, ProviderTrack,
    RecordingMatch,
};
pub use musicbrainz::{MUSICBRAINZ_ID, MusicBrainzClient};
pub use spotify::{SPOTIFY_ID, SpotifyClient};
pub use traits::{ProviderClient, RecordingLookup, TagSource};

/// User agent string - MusicBrainz requires this
pub const USER_AGENT: &str = concat!(
    "MusicCurator/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/music-curator)"
);

/// Spotify client-credentials pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Immutable provider settings, built once from [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Absent credentials disable the Spotify provider
    pub spotify: Option<SpotifyCredentials>,
    /// Upper bound on every HTTP request
    pub request_timeout: Duration,
    /// Spacing between Spotify calls
    pub spotify_page_interval: Duration,
    /// Spotify page size
    pub spotify_page_size: u32,
    /// Spacing between MusicBrainz calls
    pub musicbrainz_interval: Duration,
    /// Albums read by the fallback provider
    pub fallback_album_limit: u32,
    /// Tracks read by the fallback keyword search
    pub fallback_search_limit: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            spotify: None,
            request_timeout: Duration::from_secs(30),
            spotify_page_interval: Duration::from_millis(200),
            spotify_page_size: 50,
            musicbrainz_interval: Duration::from_millis(1100),
            fallback_album_limit: 100,
            fallback_search_limit: 100,
        }
    }
}

/// The concrete clients for one process.
///
/// MusicBrainz is shared between discography, genre and recording lookups
/// so its rate limiter covers every caller.
pub struct ProviderSet {
    pub spotify: Arc<SpotifyClient>,
    pub musicbrainz: Arc<MusicBrainzClient>,
}

impl ProviderSet {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            spotify: Arc::new(SpotifyClient::new(config)?),
            musicbrainz: Arc::new(MusicBrainzClient::new(config)?),
        })
    }

    /// Discography providers in priority order: Spotify, then MusicBrainz.
    pub fn discography_order(&self) -> Vec<Arc<dyn ProviderClient>> {
        let spotify: Arc<dyn ProviderClient> = self.spotify.clone();
        let musicbrainz: Arc<dyn ProviderClient> = self.musicbrainz.clone();
        vec![spotify, musicbrainz]
    }
}
