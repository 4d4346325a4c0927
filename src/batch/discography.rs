//! Discovering candidate tracks from catalog artists.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use super::BatchRunner;
use crate::catalog::{CatalogStore, entry_keys};
use crate::discography::DiscographyAggregator;
use crate::error::Result;
use crate::model::CandidateTrack;
use crate::normalize::dedup_key;

/// Separator between credited artists in a collaboration.
const COLLABORATION_SEPARATOR: char = ';';

/// Totals for a discography load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscographyBatchStats {
    pub artists: usize,
    pub tracks_found: usize,
    pub inserted: usize,
    pub duplicates: usize,
    /// Artists for which no provider returned tracks
    pub failed_artists: usize,
}

/// Unique trimmed names from every `;`-separated collaboration credit.
pub fn collaborator_names(artist_names: &[String]) -> Vec<String> {
    artist_names
        .iter()
        .filter(|name| name.contains(COLLABORATION_SEPARATOR))
        .flat_map(|name| name.split(COLLABORATION_SEPARATOR))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl BatchRunner {
    /// Fetch the discography of every distinct catalog artist and store the
    /// tracks the catalog does not have yet as pending candidates.
    pub async fn load_all_discographies(
        &self,
        aggregator: &DiscographyAggregator,
    ) -> Result<DiscographyBatchStats> {
        let artists = self.store.distinct_artists().await?;
        self.load_artists("load-discographies", aggregator, artists)
            .await
    }

    /// Same as [`Self::load_all_discographies`] for the individual artists
    /// named in collaboration credits ("A; B").
    pub async fn load_collaborators(
        &self,
        aggregator: &DiscographyAggregator,
    ) -> Result<DiscographyBatchStats> {
        let credits = self.store.distinct_artists().await?;
        let artists = collaborator_names(&credits);
        self.load_artists("load-collaborators", aggregator, artists)
            .await
    }

    async fn load_artists(
        &self,
        job: &str,
        aggregator: &DiscographyAggregator,
        artists: Vec<String>,
    ) -> Result<DiscographyBatchStats> {
        // One key set for the whole run: catalog entries plus stored candidates.
        let mut known = entry_keys(self.store()).await?;
        known.extend(self.store.candidate_keys().await?);

        let total = artists.len();
        let pacer = self.pacer(total);
        let mut stats = DiscographyBatchStats::default();

        info!(target: "music_curator::batch", job, artists = total, "Starting discography load");

        for (i, artist) in artists.iter().enumerate() {
            if self.cancelled(job, i, total) {
                break;
            }
            stats.artists += 1;

            let result = aggregator.fetch_discography(artist).await;
            if result.tracks.is_empty() {
                warn!(target: "music_curator::batch", job, artist = %artist, "No tracks found");
                stats.failed_artists += 1;
            } else {
                stats.tracks_found += result.tracks.len();
                for track in &result.tracks {
                    match self.store_candidate(track, &mut known).await {
                        Ok(true) => stats.inserted += 1,
                        Ok(false) => stats.duplicates += 1,
                        Err(e) => warn!(target: "music_curator::batch", job, track = %track.track_name, error = %e, "Failed to store candidate"),
                    }
                }
                info!(
                    target: "music_curator::batch",
                    job,
                    done = i + 1,
                    total,
                    artist = %artist,
                    provider = %result.provider_used,
                    found = result.tracks.len(),
                    "Artist done"
                );
            }

            pacer.after_item(i).await;
        }

        info!(
            target: "music_curator::batch",
            job,
            artists = stats.artists,
            found = stats.tracks_found,
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            failed = stats.failed_artists,
            "Discography load finished"
        );
        Ok(stats)
    }

    /// Insert `track` unless its key is already known. Returns true if stored.
    async fn store_candidate(
        &self,
        track: &CandidateTrack,
        known: &mut HashSet<(String, String)>,
    ) -> Result<bool> {
        let key = dedup_key(&track.track_name, &track.artist_name);
        if track.track_name.trim().is_empty() || known.contains(&key) {
            return Ok(false);
        }
        let inserted = self.store.insert_candidate(track).await?;
        if !inserted {
            debug!(target: "music_curator::batch", track = %track.track_name, "Candidate already stored");
        }
        known.insert(key);
        Ok(inserted)
    }
}
