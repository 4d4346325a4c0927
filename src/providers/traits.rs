//! Trait definitions for external metadata providers.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! substitute the mocks at the bottom of this file.
//!
//! # Example
//!
//! ```ignore
//! use music_curator::providers::ProviderClient;
//!
//! async fn first_album(client: &dyn ProviderClient, name: &str) -> Option<String> {
//!     let artist = client.search_artist(name).await.ok()??;
//!     let albums = client.list_albums(&artist, 0, 1).await.ok()?;
//!     albums.into_iter().next().map(|a| a.title)
//! }
//! ```

use async_trait::async_trait;

use super::domain::{
    FetchStrategy, GenreTag, ProviderAlbum, ProviderArtist, ProviderError, ProviderTrack,
    RecordingMatch,
};

/// Discography capabilities of one metadata provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable identifier reported as `provider_used`.
    fn id(&self) -> &'static str;

    /// False when required credentials are absent. Unconfigured providers
    /// are skipped without any call being made.
    fn is_configured(&self) -> bool;

    /// How the aggregator should walk this provider.
    fn strategy(&self) -> FetchStrategy;

    /// Best match for an exact artist query.
    async fn search_artist(&self, name: &str) -> Result<Option<ProviderArtist>, ProviderError>;

    /// One page of the artist's releases.
    async fn list_albums(
        &self,
        artist: &ProviderArtist,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ProviderAlbum>, ProviderError>;

    /// One page of a release's tracks.
    async fn list_album_tracks(
        &self,
        album: &ProviderAlbum,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<ProviderTrack>, ProviderError>;

    /// Keyword search for tracks by artist name.
    async fn search_tracks(
        &self,
        artist_name: &str,
        limit: u32,
    ) -> Result<Vec<ProviderTrack>, ProviderError>;
}

/// Weighted tag lookup for genre enrichment.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Tags of the best-matching artist.
    async fn artist_tags(&self, artist: &str) -> Result<Vec<GenreTag>, ProviderError>;

    /// Tags of the best-matching recording, or of its release group when
    /// the recording has none.
    async fn track_tags(&self, artist: &str, track: &str) -> Result<Vec<GenreTag>, ProviderError>;
}

/// Artist/album lookup for a recording known only by title.
#[async_trait]
pub trait RecordingLookup: Send + Sync {
    async fn find_recording(&self, title: &str) -> Result<Option<RecordingMatch>, ProviderError>;
}

/// Mock providers for testing.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock discography provider backed by in-memory data.
    pub struct MockProvider {
        pub id: &'static str,
        pub configured: bool,
        pub strategy: FetchStrategy,
        /// Artist returned from search (None = not found)
        pub artist: Option<ProviderArtist>,
        /// Every album; paged by offset/limit
        pub albums: Vec<ProviderAlbum>,
        /// Tracks per album id; paged by offset/limit
        pub tracks: HashMap<String, Vec<ProviderTrack>>,
        /// Keyword search results
        pub search_results: Vec<ProviderTrack>,
        /// Error for every call (takes precedence over data)
        pub error: Option<ProviderError>,
        /// Album ids whose track listing fails
        pub failing_albums: Vec<String>,
        /// Number of trait calls made (excluding id/is_configured/strategy)
        pub calls: AtomicUsize,
    }

    impl MockProvider {
        /// Configured provider with no data.
        pub fn empty(id: &'static str, strategy: FetchStrategy) -> Self {
            Self {
                id,
                configured: true,
                strategy,
                artist: None,
                albums: vec![],
                tracks: HashMap::new(),
                search_results: vec![],
                error: None,
                failing_albums: vec![],
                calls: AtomicUsize::new(0),
            }
        }

        /// Paginated provider with the given page size.
        pub fn paginated(id: &'static str, page_size: u32) -> Self {
            Self::empty(id, FetchStrategy::Paginated { page_size })
        }

        /// Bounded provider.
        pub fn bounded(id: &'static str, max_albums: u32, max_search_results: u32) -> Self {
            Self::empty(
                id,
                FetchStrategy::Bounded {
                    max_albums,
                    max_search_results,
                },
            )
        }

        pub fn unconfigured(mut self) -> Self {
            self.configured = false;
            self
        }

        pub fn with_error(mut self, error: ProviderError) -> Self {
            self.error = Some(error);
            self
        }

        /// Set the artist returned by search.
        pub fn with_artist(mut self, name: &str, genres: &[&str]) -> Self {
            self.artist = Some(ProviderArtist {
                id: format!("artist-{}", name.to_lowercase().replace(' ', "-")),
                name: name.to_string(),
                genres: genres.iter().map(|g| g.to_string()).collect(),
            });
            self
        }

        /// Add an album with plain track titles.
        pub fn with_album(mut self, title: &str, genres: &[&str], tracks: &[&str]) -> Self {
            let id = format!("album-{}", self.albums.len());
            self.albums.push(ProviderAlbum {
                id: id.clone(),
                title: title.to_string(),
                genres: genres.iter().map(|g| g.to_string()).collect(),
            });
            let artist = self.artist.as_ref().map(|a| a.name.clone());
            self.tracks.insert(
                id,
                tracks
                    .iter()
                    .map(|t| ProviderTrack {
                        title: t.to_string(),
                        artist: artist.clone(),
                        ..Default::default()
                    })
                    .collect(),
            );
            self
        }

        pub fn with_search_results(mut self, titles: &[&str]) -> Self {
            let artist = self.artist.as_ref().map(|a| a.name.clone());
            self.search_results = titles
                .iter()
                .map(|t| ProviderTrack {
                    title: t.to_string(),
                    artist: artist.clone(),
                    ..Default::default()
                })
                .collect();
            self
        }

        pub fn with_failing_album(mut self, album_title: &str) -> Self {
            if let Some(album) = self.albums.iter().find(|a| a.title == album_title) {
                self.failing_albums.push(album.id.clone());
            }
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record_call(&self) -> Result<(), ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn page<T: Clone>(items: &[T], offset: u32, limit: u32) -> Vec<T> {
        items
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect()
    }

    #[async_trait]
    impl ProviderClient for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn strategy(&self) -> FetchStrategy {
            self.strategy
        }

        async fn search_artist(&self, _name: &str) -> Result<Option<ProviderArtist>, ProviderError> {
            self.record_call()?;
            Ok(self.artist.clone())
        }

        async fn list_albums(
            &self,
            _artist: &ProviderArtist,
            offset: u32,
            limit: u32,
        ) -> Result<Vec<ProviderAlbum>, ProviderError> {
            self.record_call()?;
            Ok(page(&self.albums, offset, limit))
        }

        async fn list_album_tracks(
            &self,
            album: &ProviderAlbum,
            offset: u32,
            limit: u32,
        ) -> Result<Vec<ProviderTrack>, ProviderError> {
            self.record_call()?;
            if self.failing_albums.contains(&album.id) {
                return Err(ProviderError::Network("album listing failed".into()));
            }
            let tracks = self.tracks.get(&album.id).cloned().unwrap_or_default();
            Ok(page(&tracks, offset, limit))
        }

        async fn search_tracks(
            &self,
            _artist_name: &str,
            limit: u32,
        ) -> Result<Vec<ProviderTrack>, ProviderError> {
            self.record_call()?;
            Ok(page(&self.search_results, 0, limit))
        }
    }

    /// Mock tag source with fixed responses.
    #[derive(Default)]
    pub struct MockTagSource {
        pub artist_tags: Vec<GenreTag>,
        pub track_tags: Vec<GenreTag>,
        pub error: Option<ProviderError>,
        pub calls: AtomicUsize,
    }

    impl MockTagSource {
        pub fn with_artist_tags(tags: &[(&str, u32)]) -> Self {
            Self {
                artist_tags: tags.iter().map(|(n, w)| GenreTag::new(*n, *w)).collect(),
                ..Default::default()
            }
        }

        pub fn with_track_tags(mut self, tags: &[(&str, u32)]) -> Self {
            self.track_tags = tags.iter().map(|(n, w)| GenreTag::new(*n, *w)).collect();
            self
        }

        pub fn failing(error: ProviderError) -> Self {
            Self {
                error: Some(error),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TagSource for MockTagSource {
        async fn artist_tags(&self, _artist: &str) -> Result<Vec<GenreTag>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                Some(e) => Err(e.clone()),
                None => Ok(self.artist_tags.clone()),
            }
        }

        async fn track_tags(&self, _artist: &str, _track: &str) -> Result<Vec<GenreTag>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                Some(e) => Err(e.clone()),
                None => Ok(self.track_tags.clone()),
            }
        }
    }

    /// Mock recording lookup keyed by title.
    #[derive(Default)]
    pub struct MockRecordingLookup {
        pub matches: HashMap<String, RecordingMatch>,
        pub calls: AtomicUsize,
    }

    impl MockRecordingLookup {
        pub fn with_match(mut self, title: &str, artist: &str, album: Option<&str>) -> Self {
            self.matches.insert(
                title.to_string(),
                RecordingMatch {
                    artist: Some(artist.to_string()),
                    album: album.map(str::to_string),
                },
            );
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordingLookup for MockRecordingLookup {
        async fn find_recording(&self, title: &str) -> Result<Option<RecordingMatch>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.matches.get(title).cloned())
        }
    }

    #[tokio::test]
    async fn test_mock_pages_albums() {
        let mock = MockProvider::paginated("mock", 2)
            .with_artist("Adele", &[])
            .with_album("19", &[], &["Daydreamer"])
            .with_album("21", &[], &["Rolling in the Deep"])
            .with_album("25", &[], &["Hello"]);
        let artist = mock.search_artist("Adele").await.unwrap().unwrap();
        assert_eq!(mock.list_albums(&artist, 0, 2).await.unwrap().len(), 2);
        assert_eq!(mock.list_albums(&artist, 2, 2).await.unwrap().len(), 1);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_error_takes_precedence() {
        let mock = MockProvider::paginated("mock", 50)
            .with_artist("Adele", &[])
            .with_error(ProviderError::RateLimited);
        assert_eq!(
            mock.search_artist("Adele").await.unwrap_err(),
            ProviderError::RateLimited
        );
    }
}
