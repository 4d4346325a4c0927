//! Backfilling genres on catalog entries.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::BatchRunner;
use crate::catalog::CatalogStore;
use crate::error::Result;
use crate::genre::GenreEnricher;
use crate::normalize::dedup_key;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenreBatchStats {
    pub examined: usize,
    pub updated: usize,
    pub not_found: usize,
}

impl BatchRunner {
    /// Give every entry without a genre one, when it can be found.
    ///
    /// A genre already recorded for the same artist and track is reused
    /// before any lookup. Entries are only written when a genre is found.
    pub async fn update_missing_genres(&self, genres: &GenreEnricher) -> Result<GenreBatchStats> {
        let mut known: HashMap<(String, String), String> = self
            .store
            .all_entries()
            .await?
            .into_iter()
            .filter_map(|e| {
                let genre = e.genre.filter(|g| !g.trim().is_empty())?;
                Some((dedup_key(&e.track_name, &e.artist_name), genre))
            })
            .collect();
        let missing = self.store.entries_missing_genre().await?;

        let total = missing.len();
        let pacer = self.pacer(total);
        let mut stats = GenreBatchStats::default();

        info!(target: "music_curator::batch", job = "genres", entries = total, "Starting genre update");

        for (i, entry) in missing.into_iter().enumerate() {
            if self.cancelled("genres", i, total) {
                break;
            }
            stats.examined += 1;

            let key = dedup_key(&entry.track_name, &entry.artist_name);
            let reused = known.get(&key).cloned();
            let looked_up = reused.is_none();
            let genre = genres
                .resolve_genre(None, reused.as_deref(), &entry.artist_name, &entry.track_name)
                .await;

            match genre {
                Some(genre) => {
                    let mut updated = entry;
                    updated.genre = Some(genre.clone());
                    match self.store.update_entry(&updated).await {
                        Ok(()) => {
                            debug!(target: "music_curator::batch", entry = updated.id, genre = %genre, "Genre set");
                            known.insert(key, genre);
                            stats.updated += 1;
                        }
                        Err(e) => warn!(target: "music_curator::batch", entry = updated.id, error = %e, "Failed to save genre"),
                    }
                }
                None => stats.not_found += 1,
            }

            // Reused genres made no external call
            if looked_up {
                pacer.after_item(i).await;
            }
        }

        info!(
            target: "music_curator::batch",
            job = "genres",
            examined = stats.examined,
            updated = stats.updated,
            not_found = stats.not_found,
            "Genre update finished"
        );
        Ok(stats)
    }
}
