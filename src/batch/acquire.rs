//! Acquiring pending candidates and promoting them into the catalog.

use std::path::Path;

use tracing::{info, warn};

use super::{BatchRunner, require_dir_if_present};
use crate::acquisition::AcquisitionCascade;
use crate::catalog::CatalogStore;
use crate::error::Result;
use crate::genre::GenreEnricher;
use crate::model::{CandidateStatus, CandidateTrack, CatalogEntry, NewCatalogEntry, StoredCandidate};
use crate::normalize::dedup_key;

/// Totals for an acquisition run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquireBatchStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchRunner {
    /// Download up to `limit` pending candidates into `destination_root`.
    ///
    /// Each candidate is marked `Attempted` before its download and
    /// `Succeeded` or `Failed` after. Successful downloads become catalog
    /// entries; `genres` fills in a missing genre on the way.
    pub async fn acquire_pending(
        &self,
        cascade: &AcquisitionCascade,
        destination_root: &Path,
        genres: Option<&GenreEnricher>,
        limit: Option<usize>,
    ) -> Result<AcquireBatchStats> {
        require_dir_if_present(destination_root, "destination root")?;

        let mut pending = self
            .store
            .candidates_with_status(CandidateStatus::Pending)
            .await?;
        if let Some(limit) = limit {
            pending.truncate(limit);
        }

        let total = pending.len();
        let pacer = self.pacer(total);
        let mut stats = AcquireBatchStats::default();

        info!(target: "music_curator::batch", job = "acquire", candidates = total, root = %destination_root.display(), "Starting acquisition");

        for (i, candidate) in pending.iter().enumerate() {
            if self.cancelled("acquire", i, total) {
                break;
            }
            stats.attempted += 1;

            if self.acquire_one(cascade, destination_root, genres, candidate).await {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }

            pacer.after_item(i).await;
        }

        info!(
            target: "music_curator::batch",
            job = "acquire",
            attempted = stats.attempted,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "Acquisition finished"
        );
        Ok(stats)
    }

    async fn acquire_one(
        &self,
        cascade: &AcquisitionCascade,
        destination_root: &Path,
        genres: Option<&GenreEnricher>,
        candidate: &StoredCandidate,
    ) -> bool {
        let track = &candidate.track;
        self.mark(candidate.id, CandidateStatus::Attempted).await;

        let result = cascade.acquire(track, destination_root).await;
        if !result.success {
            warn!(
                target: "music_curator::batch",
                artist = %track.artist_name,
                track = %track.track_name,
                error = result.error.as_deref().unwrap_or_default(),
                "Acquisition failed"
            );
            self.mark(candidate.id, CandidateStatus::Failed).await;
            return false;
        }

        self.mark(candidate.id, CandidateStatus::Succeeded).await;
        match self
            .promote(track, result.relative_path.as_deref(), genres)
            .await
        {
            Ok(entry) => info!(
                target: "music_curator::batch",
                entry = entry.id,
                path = entry.relative_path.as_deref().unwrap_or_default(),
                "Promoted {} - {}", track.artist_name, track.track_name
            ),
            Err(e) => warn!(
                target: "music_curator::batch",
                track = %track.track_name,
                error = %e,
                "Downloaded but could not add to catalog"
            ),
        }
        true
    }

    async fn mark(&self, id: i64, status: CandidateStatus) {
        if let Err(e) = self.store.set_candidate_status(id, status).await {
            warn!(target: "music_curator::batch", candidate = id, status = %status, error = %e, "Failed to update status");
        }
    }

    /// Record an acquired track in the catalog.
    ///
    /// Reuses the entry already at `relative_path`, else the entry with the
    /// same artist and track (taking the path if it has none), else creates
    /// one.
    pub async fn promote(
        &self,
        track: &CandidateTrack,
        relative_path: Option<&str>,
        genres: Option<&GenreEnricher>,
    ) -> Result<CatalogEntry> {
        let entries = self.store.all_entries().await?;
        let key = dedup_key(&track.track_name, &track.artist_name);

        let by_path = relative_path.and_then(|path| {
            entries
                .iter()
                .find(|e| e.relative_path.as_deref() == Some(path))
        });
        let by_name = || {
            entries
                .iter()
                .find(|e| dedup_key(&e.track_name, &e.artist_name) == key)
        };

        let Some(existing) = by_path.or_else(by_name) else {
            let genre = resolve(genres, track).await;
            return self
                .store
                .create_entry(NewCatalogEntry {
                    track_name: track.track_name.clone(),
                    artist_name: track.artist_name.clone(),
                    album: track.album.clone(),
                    genre,
                    relative_path: relative_path.map(str::to_string),
                })
                .await;
        };

        let mut entry = existing.clone();
        if entry.relative_path.is_none() {
            entry.relative_path = relative_path.map(str::to_string);
        }
        if entry.album.is_none() {
            entry.album = track.album.clone();
        }
        if entry.genre.is_none() {
            entry.genre = resolve(genres, track).await;
        }
        if entry != *existing {
            self.store.update_entry(&entry).await?;
        }
        Ok(entry)
    }
}

/// The candidate's own genre, else a lookup when an enricher is available.
async fn resolve(genres: Option<&GenreEnricher>, track: &CandidateTrack) -> Option<String> {
    match genres {
        Some(genres) => {
            genres
                .resolve_genre(track.genre.as_deref(), None, &track.artist_name, &track.track_name)
                .await
        }
        None => track.genre.clone(),
    }
}
