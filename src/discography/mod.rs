//! Discography aggregation across metadata providers.
//!
//! Providers are tried in a fixed priority order. The first provider that
//! yields at least one track wins; unconfigured providers are skipped
//! without a call and failing providers degrade to "zero tracks". Tracks
//! are deduplicated on the case-insensitive (track, artist) pair within a
//! single fetch.
//!
//! # Example
//!
//! ```ignore
//! use music_curator::discography::DiscographyAggregator;
//!
//! let aggregator = DiscographyAggregator::from_provider_set(&providers);
//! let result = aggregator.fetch_discography("Ed Sheeran").await;
//! println!("{} tracks via {}", result.tracks.len(), result.provider_used);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::model::CandidateTrack;
use crate::providers::{
    FetchStrategy, ProviderAlbum, ProviderArtist, ProviderClient, ProviderError, ProviderSet,
    ProviderTrack,
};

/// `provider_used` when no provider produced tracks.
pub const NO_PROVIDER: &str = "none";

/// Track listing cap per album for bounded providers.
const ALBUM_TRACK_LIMIT: u32 = 200;

/// Candidates for one artist and the provider that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscographyResult {
    pub tracks: Vec<CandidateTrack>,
    pub provider_used: String,
}

impl DiscographyResult {
    fn none() -> Self {
        Self {
            tracks: Vec::new(),
            provider_used: NO_PROVIDER.to_string(),
        }
    }
}

/// What one provider yielded. `error` is the first failure seen; tracks
/// gathered before a non-fatal failure are kept.
#[derive(Debug, Default)]
pub struct ProviderOutcome {
    pub tracks: Vec<CandidateTrack>,
    pub error: Option<ProviderError>,
}

/// Orchestrates providers with ordered fallback.
pub struct DiscographyAggregator {
    providers: Vec<Arc<dyn ProviderClient>>,
}

impl DiscographyAggregator {
    /// Aggregator over `providers`, highest priority first.
    pub fn new(providers: Vec<Arc<dyn ProviderClient>>) -> Self {
        Self { providers }
    }

    /// Aggregator over the standard provider order.
    pub fn from_provider_set(set: &ProviderSet) -> Self {
        Self::new(set.discography_order())
    }

    /// Fetch every track known for `artist_name`.
    ///
    /// Never fails: provider errors are logged and fall through to the next
    /// provider, and total failure is an empty result with
    /// `provider_used == "none"`.
    pub async fn fetch_discography(&self, artist_name: &str) -> DiscographyResult {
        let artist_name = artist_name.trim();
        if artist_name.is_empty() {
            return DiscographyResult::none();
        }

        for provider in &self.providers {
            if !provider.is_configured() {
                debug!(target: "music_curator::discography", provider = provider.id(), "Provider not configured, skipping");
                continue;
            }

            let outcome = fetch_from(provider.as_ref(), artist_name).await;

            if let Some(e) = &outcome.error {
                warn!(
                    target: "music_curator::discography",
                    provider = provider.id(),
                    artist = artist_name,
                    error = %e,
                    "Provider call failed"
                );
            }

            if !outcome.tracks.is_empty() {
                info!(
                    target: "music_curator::discography",
                    provider = provider.id(),
                    artist = artist_name,
                    tracks = outcome.tracks.len(),
                    "Fetched discography"
                );
                return DiscographyResult {
                    tracks: outcome.tracks,
                    provider_used: provider.id().to_string(),
                };
            }

            debug!(target: "music_curator::discography", provider = provider.id(), artist = artist_name, "No tracks, trying next provider");
        }

        info!(target: "music_curator::discography", artist = artist_name, "No provider returned tracks");
        DiscographyResult::none()
    }
}

/// Run one provider according to its strategy.
pub async fn fetch_from(provider: &dyn ProviderClient, artist_name: &str) -> ProviderOutcome {
    let mut acc = TrackAccumulator::new(artist_name);
    match provider.strategy() {
        FetchStrategy::Paginated { page_size } => {
            match fetch_paginated(provider, artist_name, page_size.max(1), &mut acc).await {
                Ok(()) => acc.finish(None),
                // Partial results from a broken walk are discarded.
                Err(e) => ProviderOutcome {
                    tracks: Vec::new(),
                    error: Some(e),
                },
            }
        }
        FetchStrategy::Bounded {
            max_albums,
            max_search_results,
        } => {
            let error =
                fetch_bounded(provider, artist_name, max_albums, max_search_results, &mut acc).await;
            acc.finish(error)
        }
    }
}

async fn fetch_paginated(
    provider: &dyn ProviderClient,
    artist_name: &str,
    page_size: u32,
    acc: &mut TrackAccumulator,
) -> Result<(), ProviderError> {
    let Some(artist) = provider.search_artist(artist_name).await? else {
        return Ok(());
    };

    let mut albums = Vec::new();
    let mut offset = 0;
    loop {
        let page = provider.list_albums(&artist, offset, page_size).await?;
        let count = page.len();
        albums.extend(page);
        if count < page_size as usize {
            break;
        }
        offset += page_size;
    }

    for album in &albums {
        let mut offset = 0;
        loop {
            let page = provider.list_album_tracks(album, offset, page_size).await?;
            let count = page.len();
            for track in page {
                acc.push(track, Some(album), Some(&artist));
            }
            if count < page_size as usize {
                break;
            }
            offset += page_size;
        }
    }

    Ok(())
}

/// Returns the first error seen; the walk continues past album failures.
async fn fetch_bounded(
    provider: &dyn ProviderClient,
    artist_name: &str,
    max_albums: u32,
    max_search_results: u32,
    acc: &mut TrackAccumulator,
) -> Option<ProviderError> {
    let mut first_error = None;

    match provider.search_artist(artist_name).await {
        Ok(Some(artist)) => match provider.list_albums(&artist, 0, max_albums).await {
            Ok(albums) => {
                for album in albums.iter().take(max_albums as usize) {
                    match provider.list_album_tracks(album, 0, ALBUM_TRACK_LIMIT).await {
                        Ok(tracks) => {
                            for track in tracks {
                                acc.push(track, Some(album), Some(&artist));
                            }
                        }
                        Err(e) => {
                            debug!(target: "music_curator::discography", album = %album.title, error = %e, "Skipping album");
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        },
        Ok(None) => {}
        Err(e) => {
            first_error.get_or_insert(e);
        }
    }

    if acc.is_empty() {
        match provider.search_tracks(artist_name, max_search_results).await {
            Ok(tracks) => {
                for track in tracks.into_iter().take(max_search_results as usize) {
                    acc.push(track, None, None);
                }
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    first_error
}

/// Per-call dedup state; never shared between fetches.
struct TrackAccumulator {
    queried_artist: String,
    seen: HashSet<(String, String)>,
    tracks: Vec<CandidateTrack>,
}

impl TrackAccumulator {
    fn new(queried_artist: &str) -> Self {
        Self {
            queried_artist: queried_artist.to_string(),
            seen: HashSet::new(),
            tracks: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Add a track, keeping only the first occurrence of each pair.
    ///
    /// Genre precedence: the track's own, then the album's, then the artist's.
    fn push(
        &mut self,
        track: ProviderTrack,
        album: Option<&ProviderAlbum>,
        artist: Option<&ProviderArtist>,
    ) {
        let title = track.title.trim();
        if title.is_empty() {
            return;
        }

        let artist_name = track
            .artist
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .or_else(|| artist.map(|a| a.name.trim()))
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.queried_artist)
            .to_string();

        let mut candidate = CandidateTrack::new(title, artist_name);
        if !self.seen.insert(candidate.key()) {
            return;
        }

        candidate.album = track
            .album
            .filter(|a| !a.trim().is_empty())
            .or_else(|| album.map(|a| a.title.clone()));
        candidate.genre = track
            .genre
            .filter(|g| !g.trim().is_empty())
            .or_else(|| album.and_then(|a| a.genres.first().cloned()))
            .or_else(|| artist.and_then(|a| a.genres.first().cloned()));

        self.tracks.push(candidate);
    }

    fn finish(self, error: Option<ProviderError>) -> ProviderOutcome {
        ProviderOutcome {
            tracks: self.tracks,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::traits::mocks::MockProvider;

    fn aggregator(providers: Vec<Arc<MockProvider>>) -> DiscographyAggregator {
        DiscographyAggregator::new(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn ProviderClient>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_primary_provider_used_when_configured() {
        let primary = Arc::new(
            MockProvider::paginated("primary", 50)
                .with_artist("Adele", &["pop"])
                .with_album("25", &[], &["Hello", "Water Under the Bridge"]),
        );
        let fallback = Arc::new(
            MockProvider::bounded("fallback", 100, 100)
                .with_artist("Adele", &[])
                .with_search_results(&["Skyfall"]),
        );

        let result = aggregator(vec![primary.clone(), fallback.clone()])
            .fetch_discography("Adele")
            .await;

        assert_eq!(result.provider_used, "primary");
        assert_eq!(result.tracks.len(), 2);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_when_primary_unconfigured() {
        let primary = Arc::new(
            MockProvider::paginated("primary", 50)
                .with_artist("Adele", &[])
                .with_album("25", &[], &["Hello"])
                .unconfigured(),
        );
        let fallback = Arc::new(
            MockProvider::bounded("fallback", 100, 100)
                .with_artist("Adele", &[])
                .with_album("21", &[], &["Rolling in the Deep"]),
        );

        let result = aggregator(vec![primary.clone(), fallback])
            .fetch_discography("Adele")
            .await;

        assert_eq!(result.provider_used, "fallback");
        assert_eq!(result.tracks[0].track_name, "Rolling in the Deep");
        assert_eq!(primary.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_primary_falls_through() {
        let primary = Arc::new(
            MockProvider::paginated("primary", 50)
                .with_artist("Adele", &[])
                .with_error(ProviderError::Auth("bad secret".into())),
        );
        let fallback = Arc::new(
            MockProvider::bounded("fallback", 100, 100)
                .with_artist("Adele", &[])
                .with_album("21", &[], &["Someone Like You"]),
        );

        let result = aggregator(vec![primary, fallback]).fetch_discography("Adele").await;
        assert_eq!(result.provider_used, "fallback");
        assert_eq!(result.tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_warning_passes_default_filter() {
        let (log, _guard) = crate::test_utils::capture_logs();
        let provider = Arc::new(
            MockProvider::bounded("fallback", 100, 100).with_error(ProviderError::Timeout),
        );

        let result = aggregator(vec![provider]).fetch_discography("Adele").await;

        assert_eq!(result.provider_used, NO_PROVIDER);
        assert_eq!(log.warnings(), vec!["music_curator::discography".to_string()]);
        // The info summary line is kept as well
        assert!(
            log.events()
                .iter()
                .any(|(level, _)| *level == tracing::Level::INFO)
        );
    }

    #[tokio::test]
    async fn test_no_tracks_anywhere_is_none() {
        let primary = Arc::new(MockProvider::paginated("primary", 50).unconfigured());
        let fallback = Arc::new(
            MockProvider::bounded("fallback", 100, 100).with_error(ProviderError::Timeout),
        );

        let result = aggregator(vec![primary, fallback]).fetch_discography("Nobody").await;
        assert_eq!(result.provider_used, NO_PROVIDER);
        assert!(result.tracks.is_empty());
    }

    #[tokio::test]
    async fn test_blank_artist_makes_no_calls() {
        let fallback = Arc::new(MockProvider::bounded("fallback", 100, 100));
        let result = aggregator(vec![fallback.clone()]).fetch_discography("   ").await;
        assert_eq!(result.provider_used, NO_PROVIDER);
        assert_eq!(fallback.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pagination_stops_on_short_page() {
        let mut mock = MockProvider::paginated("primary", 2).with_artist("Band", &[]);
        for i in 0..5 {
            let title = format!("Album {i}");
            let track = format!("Song {i}");
            mock = mock.with_album(&title, &[], &[track.as_str()]);
        }
        let mock = Arc::new(mock);

        let result = aggregator(vec![mock.clone()]).fetch_discography("Band").await;

        assert_eq!(result.tracks.len(), 5);
        // 1 search + 3 album pages (2, 2, 1) + 5 track pages (each short)
        assert_eq!(mock.call_count(), 1 + 3 + 5);
    }

    #[tokio::test]
    async fn test_exact_page_size_requests_one_more_page() {
        let mock = Arc::new(
            MockProvider::paginated("primary", 2)
                .with_artist("Band", &[])
                .with_album("A", &[], &["One", "Two"])
                .with_album("B", &[], &["Three"]),
        );

        let result = aggregator(vec![mock.clone()]).fetch_discography("Band").await;

        assert_eq!(result.tracks.len(), 3);
        // search + album pages (2, 0) + tracks A (2, 0) + tracks B (1)
        assert_eq!(mock.call_count(), 1 + 2 + 2 + 1);
    }

    #[tokio::test]
    async fn test_dedup_is_case_insensitive_first_wins() {
        let mock = Arc::new(
            MockProvider::paginated("primary", 50)
                .with_artist("Ed Sheeran", &[])
                .with_album("÷", &[], &["Shape of You", "Perfect"])
                .with_album("÷ (Deluxe)", &[], &["SHAPE OF YOU", "perfect ", "Barcelona"]),
        );

        let result = aggregator(vec![mock]).fetch_discography("Ed Sheeran").await;

        let names: Vec<_> = result.tracks.iter().map(|t| t.track_name.as_str()).collect();
        assert_eq!(names, vec!["Shape of You", "Perfect", "Barcelona"]);
        assert_eq!(result.tracks[0].album.as_deref(), Some("÷"));

        let keys: HashSet<_> = result.tracks.iter().map(|t| t.key()).collect();
        assert_eq!(keys.len(), result.tracks.len());
    }

    #[tokio::test]
    async fn test_genre_precedence_album_then_artist() {
        let mock = Arc::new(
            MockProvider::paginated("primary", 50)
                .with_artist("Adele", &["soul"])
                .with_album("25", &["pop"], &["Hello"])
                .with_album("Live", &[], &["Skyfall"]),
        );

        let result = aggregator(vec![mock]).fetch_discography("Adele").await;

        assert_eq!(result.tracks[0].genre.as_deref(), Some("pop"));
        assert_eq!(result.tracks[1].genre.as_deref(), Some("soul"));
    }

    #[tokio::test]
    async fn test_paginated_failure_discards_partial_tracks() {
        let mock = Arc::new(
            MockProvider::paginated("primary", 50)
                .with_artist("Adele", &[])
                .with_album("19", &[], &["Daydreamer"])
                .with_album("21", &[], &["Rumour Has It"])
                .with_failing_album("21"),
        );

        let outcome = fetch_from(mock.as_ref(), "Adele").await;
        assert!(outcome.tracks.is_empty());
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_bounded_skips_failing_album_only() {
        let mock = Arc::new(
            MockProvider::bounded("fallback", 100, 100)
                .with_artist("Adele", &[])
                .with_album("19", &[], &["Daydreamer"])
                .with_album("21", &[], &["Rumour Has It"])
                .with_failing_album("19"),
        );

        let outcome = fetch_from(mock.as_ref(), "Adele").await;
        assert_eq!(outcome.tracks.len(), 1);
        assert_eq!(outcome.tracks[0].track_name, "Rumour Has It");
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_bounded_search_when_no_albums() {
        let mock = Arc::new(
            MockProvider::bounded("fallback", 100, 2)
                .with_artist("Adele", &[])
                .with_search_results(&["Hello", "Skyfall", "Easy on Me"]),
        );

        let result = aggregator(vec![mock]).fetch_discography("Adele").await;

        assert_eq!(result.provider_used, "fallback");
        assert_eq!(result.tracks.len(), 2);
        assert!(result.tracks.iter().all(|t| t.artist_name == "Adele"));
    }

    #[tokio::test]
    async fn test_bounded_search_when_artist_unknown() {
        let mut mock = MockProvider::bounded("fallback", 100, 100);
        mock.search_results = vec![ProviderTrack {
            title: "Hello".into(),
            artist: None,
            album: Some("25".into()),
            genre: None,
        }];

        let result = aggregator(vec![Arc::new(mock)]).fetch_discography("adele").await;
        assert_eq!(result.tracks[0].artist_name, "adele");
        assert_eq!(result.tracks[0].album.as_deref(), Some("25"));
    }
}
