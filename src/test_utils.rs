//! Test utilities and fixtures for music-curator tests.
//!
//! This module provides common test helpers, fixture factories, and
//! database utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use music_curator::test_utils::{temp_catalog, entry_at_path};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (store, _dir) = temp_catalog().await;
//!     store.create_entry(entry_at_path("Adele", "Hello", "Adele/25/Hello.mp3")).await.unwrap();
//!     // ... test logic
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::catalog::SqliteCatalog;
use crate::model::NewCatalogEntry;

/// Creates a temporary SQLite catalog for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// # Returns
///
/// A tuple of (store, temp directory handle).
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_catalog() -> (SqliteCatalog, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");

    let store = SqliteCatalog::open(&db_path)
        .await
        .expect("Failed to initialize test database");

    (store, dir)
}

/// A new entry with only track and artist set.
pub fn entry(artist: &str, track: &str) -> NewCatalogEntry {
    NewCatalogEntry {
        track_name: track.to_string(),
        artist_name: artist.to_string(),
        ..Default::default()
    }
}

/// A new entry backed by `relative_path`.
pub fn entry_at_path(artist: &str, track: &str, relative_path: &str) -> NewCatalogEntry {
    NewCatalogEntry {
        relative_path: Some(relative_path.to_string()),
        ..entry(artist, track)
    }
}

/// Write a placeholder audio file at `root/relative` (parents created).
///
/// The content is not real audio, so tag reading fails and metadata falls
/// back to the path.
pub fn touch_audio(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(&path, b"not really audio").expect("Failed to write test file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;

    #[tokio::test]
    async fn test_temp_catalog_creates_working_database() {
        let (store, _dir) = temp_catalog().await;
        let entries = store.all_entries().await.unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_entry_fixtures() {
        let e = entry_at_path("Adele", "Hello", "Adele/25/Hello.mp3");
        assert_eq!(e.artist_name, "Adele");
        assert_eq!(e.relative_path.as_deref(), Some("Adele/25/Hello.mp3"));
        assert!(e.genre.is_none());
    }

    #[test]
    fn test_touch_audio_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_audio(dir.path(), "A/B/c.mp3");
        assert!(path.exists());
    }
}

/// Level and target of every event that reaches a subscriber.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<(tracing::Level, String)>>>);

impl EventLog {
    pub fn events(&self) -> Vec<(tracing::Level, String)> {
        self.0.lock().unwrap().clone()
    }

    /// Targets of the warnings seen so far.
    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(level, _)| *level == tracing::Level::WARN)
            .map(|(_, target)| target)
            .collect()
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventLog {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let meta = event.metadata();
        self.0
            .lock()
            .unwrap()
            .push((*meta.level(), meta.target().to_string()));
    }
}

/// Installs the binary's log filter (with `RUST_LOG` unset) and an
/// [`EventLog`] on the current thread until the guard is dropped.
pub fn capture_logs() -> (EventLog, tracing::subscriber::DefaultGuard) {
    use tracing_subscriber::prelude::*;

    let log = EventLog::default();
    let subscriber = tracing_subscriber::registry()
        .with(crate::cli::log_filter(None).unwrap())
        .with(log.clone());
    (log, tracing::subscriber::set_default(subscriber))
}
