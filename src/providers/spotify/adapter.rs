//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where Spotify DTO types are converted to domain types.

use super::dto;
use crate::providers::domain::{ProviderAlbum, ProviderArtist, ProviderTrack};

/// Best artist from a search response: an exact case-insensitive name
/// match if present, otherwise the first result.
pub fn best_artist(response: dto::ArtistSearchResponse, query: &str) -> Option<ProviderArtist> {
    let mut items = response.artists.items;
    let exact = items
        .iter()
        .position(|a| a.name.trim().eq_ignore_ascii_case(query.trim()));
    let chosen = match exact {
        Some(i) => items.swap_remove(i),
        None if !items.is_empty() => items.swap_remove(0),
        None => return None,
    };
    Some(to_artist(chosen))
}

pub fn to_artist(artist: dto::Artist) -> ProviderArtist {
    ProviderArtist {
        id: artist.id,
        name: artist.name,
        genres: artist.genres,
    }
}

pub fn to_albums(page: dto::Paging<dto::SimplifiedAlbum>) -> Vec<ProviderAlbum> {
    page.items
        .into_iter()
        .map(|album| ProviderAlbum {
            id: album.id,
            title: album.name,
            genres: album.genres,
        })
        .collect()
}

/// Album tracks. Spotify never supplies track-level genres.
pub fn to_tracks(page: dto::Paging<dto::SimplifiedTrack>) -> Vec<ProviderTrack> {
    page.items
        .into_iter()
        .filter(|t| !t.name.trim().is_empty())
        .map(|track| ProviderTrack {
            artist: track.artists.first().map(|a| a.name.clone()),
            title: track.name,
            album: None,
            genre: None,
        })
        .collect()
}

/// Keyword search results, keeping the release title of each hit.
pub fn to_search_tracks(response: dto::TrackSearchResponse) -> Vec<ProviderTrack> {
    response
        .tracks
        .items
        .into_iter()
        .filter(|t| !t.name.trim().is_empty())
        .map(|track| ProviderTrack {
            artist: track.artists.first().map(|a| a.name.clone()),
            album: track.album.map(|a| a.name),
            title: track.name,
            genre: None,
        })
        .collect()
}
