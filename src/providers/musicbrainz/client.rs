//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to
//! 1 req/sec. Every request waits on the client's [`FixedInterval`], so
//! share one client (behind an `Arc`) per process.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{adapter, dto};
use crate::pacing::FixedInterval;
use crate::providers::domain::{
    FetchStrategy, GenreTag, ProviderAlbum, ProviderArtist, ProviderError, ProviderTrack,
    RecordingMatch,
};
use crate::providers::traits::{ProviderClient, RecordingLookup, TagSource};
use crate::providers::{ProviderConfig, USER_AGENT};

/// Provider id reported in discography results.
pub const MUSICBRAINZ_ID: &str = "musicbrainz";

/// Release-group types walked for an artist.
const RELEASE_TYPES: &str = "album|single|ep";

/// MusicBrainz caps browse and search pages at 100.
const MAX_PAGE: u32 = 100;

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    interval: FixedInterval,
    max_albums: u32,
    max_search_results: u32,
}

impl MusicBrainzClient {
    /// Create a new client
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(config, "https://musicbrainz.org/ws/2")
    }

    /// Create a client with a custom base URL (mirrors, tests)
    pub fn with_base_url(
        config: &ProviderConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            interval: FixedInterval::new(config.musicbrainz_interval),
            max_albums: config.fallback_album_limit.clamp(1, MAX_PAGE),
            max_search_results: config.fallback_search_limit.clamp(1, MAX_PAGE),
        })
    }

    /// Send a paced GET and parse the JSON response
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ProviderError> {
        self.interval.wait().await;

        let separator = if path_and_query.contains('?') { '&' } else { '?' };
        let url = format!("{}{}{}fmt=json", self.base_url, path_and_query, separator);

        let response = self.http_client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::Api("Not Found".to_string()));
        }

        // MusicBrainz answers 503 when the per-IP limit is exceeded
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(ProviderError::Api(error.error));
            }
            return Err(ProviderError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn search_recordings(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<dto::RecordingSearchResponse, ProviderError> {
        self.get_json(&format!(
            "/recording?query={}&limit={}",
            urlencoding::encode(query),
            limit.clamp(1, MAX_PAGE)
        ))
        .await
    }
}

/// Lucene phrase with embedded quotes escaped.
fn phrase(field: &str, value: &str) -> String {
    format!("{}:\"{}\"", field, value.trim().replace('"', "\\\""))
}

#[async_trait]
impl ProviderClient for MusicBrainzClient {
    fn id(&self) -> &'static str {
        MUSICBRAINZ_ID
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Bounded {
            max_albums: self.max_albums,
            max_search_results: self.max_search_results,
        }
    }

    async fn search_artist(&self, name: &str) -> Result<Option<ProviderArtist>, ProviderError> {
        let response: dto::ArtistSearchResponse = self
            .get_json(&format!(
                "/artist?query={}&limit=5",
                urlencoding::encode(&phrase("artist", name))
            ))
            .await?;
        Ok(adapter::best_artist(response, name))
    }

    async fn list_albums(
        &self,
        artist: &ProviderArtist,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ProviderAlbum>, ProviderError> {
        let browse: dto::ReleaseGroupBrowse = self
            .get_json(&format!(
                "/release-group?artist={}&type={}&inc=tags&limit={}&offset={}",
                urlencoding::encode(&artist.id),
                urlencoding::encode(RELEASE_TYPES),
                limit.clamp(1, MAX_PAGE),
                offset
            ))
            .await?;
        Ok(adapter::to_albums(browse))
    }

    async fn list_album_tracks(
        &self,
        album: &ProviderAlbum,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ProviderTrack>, ProviderError> {
        // One representative release per group; its track list is the album's.
        let browse: dto::ReleaseBrowse = self
            .get_json(&format!(
                "/release?release-group={}&inc=recordings&limit=1",
                urlencoding::encode(&album.id)
            ))
            .await?;
        Ok(adapter::release_tracks(browse)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn search_tracks(
        &self,
        artist_name: &str,
        limit: u32,
    ) -> Result<Vec<ProviderTrack>, ProviderError> {
        let response = self
            .search_recordings(&phrase("artist", artist_name), limit)
            .await?;
        Ok(adapter::recordings_to_tracks(response))
    }
}

#[async_trait]
impl TagSource for MusicBrainzClient {
    async fn artist_tags(&self, artist: &str) -> Result<Vec<GenreTag>, ProviderError> {
        let Some(found) = self.search_artist(artist).await? else {
            return Ok(Vec::new());
        };
        let detail: dto::Artist = self
            .get_json(&format!("/artist/{}?inc=tags", urlencoding::encode(&found.id)))
            .await?;
        Ok(adapter::to_genre_tags(&detail.tags))
    }

    async fn track_tags(&self, artist: &str, track: &str) -> Result<Vec<GenreTag>, ProviderError> {
        let query = format!("{} AND {}", phrase("artist", artist), phrase("recording", track));
        let response = self.search_recordings(&query, 1).await?;
        let Some(hit) = response.recordings.into_iter().next() else {
            return Ok(Vec::new());
        };

        let recording: dto::Recording = self
            .get_json(&format!(
                "/recording/{}?inc=tags+releases+release-groups",
                urlencoding::encode(&hit.id)
            ))
            .await?;
        if !recording.tags.is_empty() {
            return Ok(adapter::to_genre_tags(&recording.tags));
        }

        let group_id = recording
            .releases
            .first()
            .and_then(|r| r.release_group.as_ref())
            .map(|rg| rg.id.clone());
        let Some(group_id) = group_id else {
            return Ok(Vec::new());
        };
        let group: dto::ReleaseGroup = self
            .get_json(&format!("/release-group/{}?inc=tags", urlencoding::encode(&group_id)))
            .await?;
        Ok(adapter::to_genre_tags(&group.tags))
    }
}

#[async_trait]
impl RecordingLookup for MusicBrainzClient {
    async fn find_recording(&self, title: &str) -> Result<Option<RecordingMatch>, ProviderError> {
        let response = self.search_recordings(&phrase("recording", title), 1).await?;
        Ok(adapter::to_recording_match(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MusicBrainzClient::new(&ProviderConfig::default()).unwrap();
        assert_eq!(client.base_url, "https://musicbrainz.org/ws/2");
        assert!(client.is_configured());
        assert_eq!(client.id(), "musicbrainz");
    }

    #[test]
    fn test_client_with_custom_url() {
        let client =
            MusicBrainzClient::with_base_url(&ProviderConfig::default(), "http://localhost:8080")
                .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_strategy_is_bounded_by_config() {
        let config = ProviderConfig {
            fallback_album_limit: 500,
            fallback_search_limit: 25,
            ..ProviderConfig::default()
        };
        let client = MusicBrainzClient::new(&config).unwrap();
        assert_eq!(
            client.strategy(),
            FetchStrategy::Bounded {
                max_albums: 100,
                max_search_results: 25
            }
        );
    }

    #[test]
    fn test_phrase_escapes_quotes() {
        assert_eq!(phrase("artist", " Ed Sheeran "), "artist:\"Ed Sheeran\"");
        assert_eq!(phrase("recording", "Say \"Hi\""), "recording:\"Say \\\"Hi\\\"\"");
    }

    #[test]
    fn test_user_agent_format() {
        assert!(USER_AGENT.starts_with("MusicCurator/"));
    }
}
