//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::providers::domain::{
    GenreTag, ProviderAlbum, ProviderArtist, ProviderTrack, RecordingMatch,
};

/// Best artist from a search: exact case-insensitive name first, then the
/// highest-scoring result (MusicBrainz returns results score-ordered).
pub fn best_artist(response: dto::ArtistSearchResponse, query: &str) -> Option<ProviderArtist> {
    let mut artists = response.artists;
    let index = artists
        .iter()
        .position(|a| a.name.trim().eq_ignore_ascii_case(query.trim()))
        .unwrap_or(0);
    if artists.is_empty() {
        return None;
    }
    let artist = artists.swap_remove(index);
    Some(ProviderArtist {
        genres: tag_names(&artist.tags),
        id: artist.id,
        name: artist.name,
    })
}

pub fn to_albums(browse: dto::ReleaseGroupBrowse) -> Vec<ProviderAlbum> {
    browse
        .release_groups
        .into_iter()
        .map(|rg| ProviderAlbum {
            genres: tag_names(&rg.tags),
            id: rg.id,
            title: rg.title,
        })
        .collect()
}

/// Tracks of the first release, across all media, in order. The artist is
/// left unset; listings are credited to the artist being browsed.
pub fn release_tracks(browse: dto::ReleaseBrowse) -> Vec<ProviderTrack> {
    let Some(release) = browse.releases.into_iter().next() else {
        return Vec::new();
    };
    release
        .media
        .into_iter()
        .flat_map(|m| m.tracks)
        .filter_map(|t| {
            let title = t.title.or_else(|| t.recording.map(|r| r.title))?;
            (!title.trim().is_empty()).then(|| ProviderTrack {
                title,
                artist: None,
                album: None,
                genre: None,
            })
        })
        .collect()
}

/// Recording search hits as tracks, with credited artist and release title.
pub fn recordings_to_tracks(response: dto::RecordingSearchResponse) -> Vec<ProviderTrack> {
    response
        .recordings
        .into_iter()
        .filter(|r| !r.title.trim().is_empty())
        .map(|r| ProviderTrack {
            artist: credited_artist(&r.artist_credit),
            album: release_title(&r.releases),
            genre: top_tag(&r.tags),
            title: r.title,
        })
        .collect()
}

/// Artist and album of the first recording hit.
pub fn to_recording_match(response: dto::RecordingSearchResponse) -> Option<RecordingMatch> {
    let recording = response.recordings.into_iter().next()?;
    Some(RecordingMatch {
        artist: recording
            .artist_credit
            .first()
            .map(|c| c.artist.name.clone()),
        album: release_title(&recording.releases),
    })
}

/// Weighted tags; negative vote counts become zero.
pub fn to_genre_tags(tags: &[dto::Tag]) -> Vec<GenreTag> {
    tags.iter()
        .filter(|t| !t.name.trim().is_empty())
        .map(|t| GenreTag::new(t.name.trim(), t.count.max(0) as u32))
        .collect()
}

/// Build a combined artist string from artist credits
fn credited_artist(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);
        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }
    Some(result.trim().to_string())
}

/// Release-group title of the first release, else the release title.
fn release_title(releases: &[dto::Release]) -> Option<String> {
    let release = releases.first()?;
    release
        .release_group
        .as_ref()
        .map(|rg| rg.title.clone())
        .or_else(|| Some(release.title.clone()))
}

/// Tag names ordered by vote count, most popular first.
fn tag_names(tags: &[dto::Tag]) -> Vec<String> {
    let mut sorted: Vec<_> = tags.iter().filter(|t| t.count > 0).collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted.into_iter().map(|t| t.name.clone()).collect()
}

fn top_tag(tags: &[dto::Tag]) -> Option<String> {
    tag_names(tags).into_iter().next()
}
