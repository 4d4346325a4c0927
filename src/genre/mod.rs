//! Genre enrichment from weighted folksonomy tags.
//!
//! A [`GenreEnricher`] wraps a [`TagSource`] and turns its weighted tags into
//! a single display genre: tags on the denylist are dropped, the rest are
//! ranked by weight and the winner is title-cased. Every lookup waits on a
//! fixed interval first, and lookup failures are logged and reported as
//! "no genre".

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::GenreConfig;
use crate::pacing::FixedInterval;
use crate::providers::{GenreTag, TagSource};

/// Resolves display genres for artists and tracks.
pub struct GenreEnricher {
    source: Arc<dyn TagSource>,
    denylist: HashSet<String>,
    interval: FixedInterval,
}

impl GenreEnricher {
    /// Enricher over `source`, skipping `denylist` tags and waiting
    /// `interval` before every lookup.
    pub fn new(source: Arc<dyn TagSource>, denylist: &[String], interval: Duration) -> Self {
        Self {
            source,
            denylist: denylist
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            interval: FixedInterval::new(interval),
        }
    }

    /// Enricher configured from the `[genre]` config section.
    pub fn from_config(source: Arc<dyn TagSource>, config: &GenreConfig) -> Self {
        Self::new(
            source,
            &config.denylist,
            Duration::from_millis(config.request_interval_ms),
        )
    }

    /// Genre of the best-matching artist.
    pub async fn artist_genre(&self, artist: &str) -> Option<String> {
        if artist.trim().is_empty() {
            return None;
        }
        self.interval.wait().await;
        match self.source.artist_tags(artist).await {
            Ok(tags) => self.pick(tags),
            Err(e) => {
                warn!("Artist genre lookup failed for '{}': {}", artist, e);
                None
            }
        }
    }

    /// Genre of the best-matching recording (or its release group).
    pub async fn track_genre(&self, artist: &str, track: &str) -> Option<String> {
        if artist.trim().is_empty() || track.trim().is_empty() {
            return None;
        }
        self.interval.wait().await;
        match self.source.track_tags(artist, track).await {
            Ok(tags) => self.pick(tags),
            Err(e) => {
                warn!("Track genre lookup failed for '{} - {}': {}", artist, track, e);
                None
            }
        }
    }

    /// First non-empty of: `explicit`, `known`, the track lookup, the artist
    /// lookup. Lookups only run when the earlier inputs are empty.
    pub async fn resolve_genre(
        &self,
        explicit: Option<&str>,
        known: Option<&str>,
        artist: &str,
        track: &str,
    ) -> Option<String> {
        if let Some(genre) = non_empty(explicit).or_else(|| non_empty(known)) {
            return Some(genre);
        }
        if let Some(genre) = self.track_genre(artist, track).await {
            return Some(genre);
        }
        debug!(artist, track, "No track genre, falling back to artist");
        self.artist_genre(artist).await
    }

    fn pick(&self, tags: Vec<GenreTag>) -> Option<String> {
        top_genre(tags, &self.denylist)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Highest-weighted tag not on the denylist, title-cased.
///
/// Equal weights keep the source order.
pub fn top_genre(mut tags: Vec<GenreTag>, denylist: &HashSet<String>) -> Option<String> {
    tags.retain(|t| {
        let name = t.name.trim();
        !name.is_empty() && !denylist.contains(&name.to_lowercase())
    });
    tags.sort_by(|a, b| b.weight.cmp(&a.weight));
    tags.first().map(|t| title_case(t.name.trim()))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
///
/// `"hip-hop"` becomes `"Hip-Hop"` and `"r&b"` becomes `"R&B"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
