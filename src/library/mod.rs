//! Catalog reconciliation against a music folder.
//!
//! Walks a library tree and brings the catalog in line with it: every
//! audio file is matched to an existing entry (by path, exact name, or
//! fuzzy name) and fills that entry's gaps, or becomes a new entry.
//! Per-file failures are counted and never stop the walk.

mod index;

pub use index::{CatalogIndex, EntryMatch, MatchKind};

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::CatalogStore;
use crate::error::{Error, Result};
use crate::genre::GenreEnricher;
use crate::metadata::{self, FileMetadata};
use crate::model::{CatalogEntry, NewCatalogEntry, UNKNOWN_ARTIST, is_unknown_artist};
use crate::organizer;
use crate::scanner;
use crate::similarity::MatchWeights;

/// Counters for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationStats {
    pub files_scanned: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Created,
    Updated,
    Skipped,
}

/// Matches files on disk to catalog entries.
pub struct CatalogReconciler {
    store: Arc<dyn CatalogStore>,
    weights: MatchWeights,
    genres: Option<Arc<GenreEnricher>>,
    cancel: CancellationToken,
}

impl CatalogReconciler {
    pub fn new(store: Arc<dyn CatalogStore>, weights: MatchWeights) -> Self {
        Self {
            store,
            weights,
            genres: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Look up genres for entries that still lack one after matching.
    pub fn with_genre_enricher(mut self, genres: Arc<GenreEnricher>) -> Self {
        self.genres = Some(genres);
        self
    }

    /// Stop after the current file once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reconcile every audio file under `root` with the catalog.
    ///
    /// Only a bad root or an unreadable catalog fails the run; everything
    /// else is counted in the returned stats.
    pub async fn reconcile(&self, root: &Path) -> Result<ReconciliationStats> {
        if !root.is_dir() {
            return Err(Error::config(format!(
                "library root {} is not a directory",
                root.display()
            )));
        }

        let mut index = CatalogIndex::new(self.store.all_entries().await?);
        let mut stats = ReconciliationStats::default();

        info!(target: "music_curator::library::reconcile", root = %root.display(), entries = index.len(), "Starting reconciliation");

        let mut files = Box::pin(scanner::scan(root.to_path_buf()));
        while let Some(item) = files.next().await {
            if self.cancel.is_cancelled() {
                info!(target: "music_curator::library::reconcile", "Cancelled, stopping after current file");
                break;
            }

            // Walk errors are already logged by the scanner
            let Ok(path) = item else {
                stats.errors += 1;
                continue;
            };

            stats.files_scanned += 1;
            match self.reconcile_file(root, &path, &mut index).await {
                Ok(FileOutcome::Created) => stats.created += 1,
                Ok(FileOutcome::Updated) => stats.updated += 1,
                Ok(FileOutcome::Skipped) => stats.skipped += 1,
                Err(e) => {
                    warn!(target: "music_curator::library::reconcile", path = %path.display(), error = %e, "File failed");
                    stats.errors += 1;
                }
            }
        }

        info!(
            target: "music_curator::library::reconcile",
            scanned = stats.files_scanned,
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            errors = stats.errors,
            "Reconciliation finished"
        );
        Ok(stats)
    }

    async fn reconcile_file(
        &self,
        root: &Path,
        path: &Path,
        index: &mut CatalogIndex,
    ) -> Result<FileOutcome> {
        let relative = organizer::relative_path(root, path)
            .ok_or_else(|| Error::metadata(path, "path is not under the library root"))?;
        let meta = metadata::extract(root, path);

        match index.best_match(&meta, &relative, root, &self.weights) {
            Some(found) => {
                let Some(existing) = index.get(found.position).cloned() else {
                    return Err(Error::not_found(format!("index position {}", found.position)));
                };
                debug!(target: "music_curator::library::reconcile", path = %relative, kind = ?found.kind, score = found.score, entry = existing.id, "Matched");
                self.update_matched(existing, &meta, &relative, found, index).await
            }
            None => self.create_new(&meta, &relative, index).await,
        }
    }

    async fn update_matched(
        &self,
        existing: CatalogEntry,
        meta: &FileMetadata,
        relative: &str,
        found: EntryMatch,
        index: &mut CatalogIndex,
    ) -> Result<FileOutcome> {
        let mut entry = existing.clone();

        if entry.has_unknown_artist()
            && let Some(artist) = meta.artist.as_deref().filter(|a| !is_unknown_artist(a))
        {
            entry.artist_name = artist.to_string();
        }
        if entry.album.is_none() {
            entry.album = meta.album.clone();
        }
        if entry.genre.is_none() {
            entry.genre = meta.genre.clone();
        }
        let relocate = found.score >= self.weights.relocate_threshold;
        if entry.relative_path.is_none() || relocate {
            entry.relative_path = Some(relative.to_string());
        }

        if entry.genre.is_none() {
            entry.genre = self.lookup_genre(index, &entry.artist_name, &entry.track_name).await;
        }

        if entry == existing {
            return Ok(FileOutcome::Skipped);
        }

        self.store.update_entry(&entry).await?;
        index.upsert(entry);
        Ok(FileOutcome::Updated)
    }

    async fn create_new(
        &self,
        meta: &FileMetadata,
        relative: &str,
        index: &mut CatalogIndex,
    ) -> Result<FileOutcome> {
        let artist_name = meta
            .artist
            .clone()
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let mut genre = meta.genre.clone();
        if genre.is_none() {
            genre = self.lookup_genre(index, &artist_name, &meta.track_name).await;
        }

        let created = self
            .store
            .create_entry(NewCatalogEntry {
                track_name: meta.track_name.clone(),
                artist_name,
                album: meta.album.clone(),
                genre,
                relative_path: Some(relative.to_string()),
            })
            .await?;

        debug!(target: "music_curator::library::reconcile", path = %relative, entry = created.id, "Created entry");
        index.upsert(created);
        Ok(FileOutcome::Created)
    }

    /// Known genre for the pair, else an external lookup. Skipped when the
    /// artist or track is unknown.
    async fn lookup_genre(&self, index: &CatalogIndex, artist: &str, track: &str) -> Option<String> {
        if is_unknown_artist(artist) || track.trim().is_empty() {
            return None;
        }
        let known = index.known_genre(artist, track).map(str::to_string);
        match &self.genres {
            Some(genres) => genres.resolve_genre(None, known.as_deref(), artist, track).await,
            None => known,
        }
    }
}
