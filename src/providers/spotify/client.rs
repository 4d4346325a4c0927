//! Spotify Web API HTTP client
//!
//! Uses the client-credentials flow; the bearer token is cached until
//! shortly before it expires. Every call waits on the client's shared
//! [`FixedInterval`] so paginated walks stay under Spotify's rate limit.
//!
//! See: https://developer.spotify.com/documentation/web-api

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use super::{adapter, dto};
use crate::pacing::FixedInterval;
use crate::providers::domain::{
    FetchStrategy, ProviderAlbum, ProviderArtist, ProviderError, ProviderTrack,
};
use crate::providers::traits::ProviderClient;
use crate::providers::{ProviderConfig, SpotifyCredentials, USER_AGENT};

/// Provider id reported in discography results.
pub const SPOTIFY_ID: &str = "spotify";

/// Release groups walked for an artist.
const INCLUDE_GROUPS: &str = "album,single,compilation";

/// Refresh the token this long before Spotify says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    api_base: String,
    token_url: String,
    credentials: Option<SpotifyCredentials>,
    token: Mutex<Option<CachedToken>>,
    interval: FixedInterval,
    page_size: u32,
}

impl SpotifyClient {
    /// Create a client from provider configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::with_urls(
            config,
            "https://api.spotify.com/v1",
            "https://accounts.spotify.com/api/token",
        )
    }

    /// Create a client against custom endpoints.
    pub fn with_urls(
        config: &ProviderConfig,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_base: api_base.into(),
            token_url: token_url.into(),
            credentials: config.spotify.clone(),
            token: Mutex::new(None),
            interval: FixedInterval::new(config.spotify_page_interval),
            page_size: config.spotify_page_size,
        })
    }

    /// Return a valid bearer token, fetching a new one if needed.
    async fn access_token(&self) -> Result<String, ProviderError> {
        let credentials = self.credentials.as_ref().ok_or(ProviderError::NotConfigured)?;

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if let Ok(error) = response.json::<dto::TokenError>().await {
                return Err(ProviderError::Auth(
                    error.error_description.unwrap_or(error.error),
                ));
            }
            return Err(ProviderError::Auth(format!("HTTP {status}")));
        }

        let token: dto::TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        tracing::debug!(target: "music_curator::providers::spotify", "Obtained access token");
        Ok(token.access_token)
    }

    /// Paced, authenticated GET returning parsed JSON.
    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T, ProviderError> {
        let token = self.access_token().await?;
        self.interval.wait().await;

        let url = format!("{}{}", self.api_base, path_and_query);
        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Force a fresh token next time.
            *self.token.lock().await = None;
            return Err(ProviderError::Auth("access token rejected".to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ApiErrorResponse>().await {
                return Err(ProviderError::Api(error.error.message));
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
}

fn artist_search_path(name: &str) -> String {
    let query = format!("artist:\"{}\"", name.trim());
    format!("/search?q={}&type=artist&limit=1", urlencoding::encode(&query))
}

fn artist_albums_path(artist_id: &str, offset: u32, limit: u32) -> String {
    format!(
        "/artists/{}/albums?include_groups={}&limit={}&offset={}",
        urlencoding::encode(artist_id),
        INCLUDE_GROUPS,
        limit,
        offset
    )
}

fn album_tracks_path(album_id: &str, offset: u32, limit: u32) -> String {
    format!(
        "/albums/{}/tracks?limit={}&offset={}",
        urlencoding::encode(album_id),
        limit,
        offset
    )
}

#[async_trait]
impl ProviderClient for SpotifyClient {
    fn id(&self) -> &'static str {
        SPOTIFY_ID
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Paginated {
            page_size: self.page_size,
        }
    }

    async fn search_artist(&self, name: &str) -> Result<Option<ProviderArtist>, ProviderError> {
        let response: dto::ArtistSearchResponse = self.get_json(&artist_search_path(name)).await?;
        Ok(adapter::best_artist(response, name))
    }

    async fn list_albums(
        &self,
        artist: &ProviderArtist,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ProviderAlbum>, ProviderError> {
        let page: dto::Paging<dto::SimplifiedAlbum> = self
            .get_json(&artist_albums_path(&artist.id, offset, limit))
            .await?;
        Ok(adapter::to_albums(page))
    }

    async fn list_album_tracks(
        &self,
        album: &ProviderAlbum,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ProviderTrack>, ProviderError> {
        let page: dto::Paging<dto::SimplifiedTrack> = self
            .get_json(&album_tracks_path(&album.id, offset, limit))
            .await?;
        Ok(adapter::to_tracks(page))
    }

    async fn search_tracks(
        &self,
        artist_name: &str,
        limit: u32,
    ) -> Result<Vec<ProviderTrack>, ProviderError> {
        let query = format!("artist:\"{}\"", artist_name.trim());
        let path = format!(
            "/search?q={}&type=track&limit={}",
            urlencoding::encode(&query),
            limit.min(50)
        );
        let response: dto::TrackSearchResponse = self.get_json(&path).await?;
        Ok(adapter::to_search_tracks(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(with_credentials: bool) -> ProviderConfig {
        ProviderConfig {
            spotify: with_credentials.then(|| SpotifyCredentials {
                client_id: "id".into(),
                client_secret: "secret".into(),
            }),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new(&config(true)).unwrap();
        assert_eq!(client.api_base, "https://api.spotify.com/v1");
        assert!(client.is_configured());
        assert_eq!(client.id(), "spotify");
        assert_eq!(client.strategy(), FetchStrategy::Paginated { page_size: 50 });
    }

    #[test]
    fn test_unconfigured_without_credentials() {
        let client = SpotifyClient::new(&config(false)).unwrap();
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_call_fails_without_network() {
        let client = SpotifyClient::with_urls(&config(false), "http://127.0.0.1:9", "http://127.0.0.1:9")
            .unwrap();
        let err = client.search_artist("Adele").await.unwrap_err();
        assert_eq!(err, ProviderError::NotConfigured);
    }

    #[test]
    fn test_search_path_encodes_query() {
        assert_eq!(
            artist_search_path("Simon & Garfunkel"),
            "/search?q=artist%3A%22Simon%20%26%20Garfunkel%22&type=artist&limit=1"
        );
    }

    #[test]
    fn test_album_paths() {
        assert_eq!(
            artist_albums_path("abc", 50, 50),
            "/artists/abc/albums?include_groups=album,single,compilation&limit=50&offset=50"
        );
        assert_eq!(album_tracks_path("xyz", 0, 50), "/albums/xyz/tracks?limit=50&offset=0");
    }
}
