//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Spotify Web API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api

use serde::{Deserialize, Serialize};

/// Client-credentials token response from accounts.spotify.com
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Token endpoint error (`invalid_client`, etc.)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenError {
    pub error: String,
    pub error_description: Option<String>,
}

/// Generic paging object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub total: Option<u32>,
    /// URL of the next page, null on the last page
    pub next: Option<String>,
}

/// `/search?type=artist` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistSearchResponse {
    pub artists: Paging<Artist>,
}

/// Full artist object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    /// Genres the artist is associated with (may be empty)
    #[serde(default)]
    pub genres: Vec<String>,
    pub popularity: Option<u32>,
}

/// Simplified artist inside album and track objects
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedArtist {
    pub id: Option<String>,
    pub name: String,
}

/// Simplified album from `/artists/{id}/albums`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedAlbum {
    pub id: String,
    pub name: String,
    /// album, single or compilation
    pub album_type: Option<String>,
    /// Relationship to the artist (album, single, compilation, appears_on)
    pub album_group: Option<String>,
    pub release_date: Option<String>,
    pub total_tracks: Option<u32>,
    /// Only present on full album objects
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
}

/// Simplified track from `/albums/{id}/tracks`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimplifiedTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub duration_ms: Option<u64>,
}

/// `/search?type=track` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackSearchResponse {
    pub tracks: Paging<Track>,
}

/// Full track object (search results)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub album: Option<SimplifiedAlbum>,
    pub duration_ms: Option<u64>,
}

/// Regular API error envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_token_response() {
        let json = r#"{
            "access_token": "BQDx...",
            "token_type": "Bearer",
            "expires_in": 3600
        }"#;

        let token: TokenResponse = serde_json::from_str(json).expect("Should parse token");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_parse_token_error() {
        let json = r#"{"error": "invalid_client", "error_description": "Invalid client secret"}"#;
        let err: TokenError = serde_json::from_str(json).expect("Should parse token error");
        assert_eq!(err.error, "invalid_client");
    }

    #[test]
    fn test_parse_artist_search() {
        let json = r#"{
            "artists": {
                "href": "https://api.spotify.com/v1/search?query=artist%3AAdele&type=artist&offset=0&limit=1",
                "items": [{
                    "id": "4dpARuHxo51G3z768sgnrY",
                    "name": "Adele",
                    "genres": ["british soul", "pop", "uk pop"],
                    "popularity": 85,
                    "type": "artist"
                }],
                "limit": 1,
                "next": "https://api.spotify.com/v1/search?offset=1",
                "offset": 0,
                "previous": null,
                "total": 812
            }
        }"#;

        let response: ArtistSearchResponse =
            serde_json::from_str(json).expect("Should parse artist search");
        let artist = &response.artists.items[0];
        assert_eq!(artist.name, "Adele");
        assert_eq!(artist.genres.len(), 3);
        assert_eq!(response.artists.total, Some(812));
    }

    #[test]
    fn test_parse_empty_search() {
        let json = r#"{"artists": {"items": [], "limit": 1, "offset": 0, "total": 0, "next": null}}"#;
        let response: ArtistSearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.artists.items.is_empty());
        assert!(response.artists.next.is_none());
    }

    #[test]
    fn test_parse_artist_albums_page() {
        let json = r#"{
            "items": [{
                "id": "0K4pIOOsfJ9lK8OjrZfXzd",
                "name": "25",
                "album_type": "album",
                "album_group": "album",
                "release_date": "2015-11-20",
                "total_tracks": 11,
                "artists": [{"id": "4dpARuHxo51G3z768sgnrY", "name": "Adele"}]
            }],
            "limit": 50,
            "offset": 0,
            "total": 1,
            "next": null
        }"#;

        let page: Paging<SimplifiedAlbum> = serde_json::from_str(json).expect("Should parse albums");
        assert_eq!(page.items[0].name, "25");
        assert_eq!(page.items[0].album_group.as_deref(), Some("album"));
        assert!(page.items[0].genres.is_empty());
    }

    #[test]
    fn test_parse_album_tracks_page() {
        let json = r#"{
            "items": [{
                "id": "1Yk0cQdMLx5RzzFTYwmuld",
                "name": "Hello",
                "track_number": 1,
                "disc_number": 1,
                "duration_ms": 295502,
                "artists": [{"id": "4dpARuHxo51G3z768sgnrY", "name": "Adele"}]
            }],
            "limit": 50,
            "offset": 0,
            "total": 1,
            "next": null
        }"#;

        let page: Paging<SimplifiedTrack> = serde_json::from_str(json).expect("Should parse tracks");
        assert_eq!(page.items[0].name, "Hello");
        assert_eq!(page.items[0].artists[0].name, "Adele");
    }

    #[test]
    fn test_parse_track_search() {
        let json = r#"{
            "tracks": {
                "items": [{
                    "id": "4uLU6hMCjMI75M1A2tKUQC",
                    "name": "Skyfall",
                    "duration_ms": 286480,
                    "artists": [{"id": "4dpARuHxo51G3z768sgnrY", "name": "Adele"}],
                    "album": {"id": "2AM8bt6j8aGkmNvG3R6s0L", "name": "Skyfall", "album_type": "single"}
                }],
                "limit": 20,
                "offset": 0,
                "total": 1,
                "next": null
            }
        }"#;

        let response: TrackSearchResponse = serde_json::from_str(json).expect("Should parse");
        let track = &response.tracks.items[0];
        assert_eq!(track.name, "Skyfall");
        assert_eq!(track.album.as_ref().map(|a| a.name.as_str()), Some("Skyfall"));
    }

    #[test]
    fn test_parse_api_error() {
        let json = r#"{"error": {"status": 401, "message": "The access token expired"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(err.error.status, 401);
    }
}
