//! Similarity scoring for catalog matching.
//!
//! Scores are a normalized Levenshtein ratio in `[0, 1]` plus a small
//! bonus when the artists agree. The threshold and bonuses are empirical,
//! so they live in [`MatchWeights`] and come from configuration.

use serde::{Deserialize, Serialize};

use crate::model::is_unknown_artist;
use crate::normalize::{normalize_artist, normalize_text};

/// Tunable weights for fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    /// Minimum score for a fuzzy match
    pub fuzzy_threshold: f64,
    /// Bonus when normalized artists are equal
    pub artist_exact_bonus: f64,
    /// Bonus when one normalized artist contains the other
    pub artist_partial_bonus: f64,
    /// Score at which an existing relative path is replaced (moved files)
    pub relocate_threshold: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.7,
            artist_exact_bonus: 0.2,
            artist_partial_bonus: 0.1,
            relocate_threshold: 0.9,
        }
    }
}

/// Similarity of two already-normalized strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Bonus for agreeing artists. Unknown artists never earn a bonus.
pub fn artist_bonus(a: &str, b: &str, weights: &MatchWeights) -> f64 {
    if is_unknown_artist(a) || is_unknown_artist(b) {
        return 0.0;
    }
    let (a, b) = (normalize_artist(a), normalize_artist(b));
    if a.is_empty() || b.is_empty() {
        0.0
    } else if a == b {
        weights.artist_exact_bonus
    } else if a.contains(&b) || b.contains(&a) {
        weights.artist_partial_bonus
    } else {
        0.0
    }
}

/// Full match score of a file against a catalog entry.
pub fn score(
    file_title: &str,
    file_artist: &str,
    entry_title: &str,
    entry_artist: &str,
    weights: &MatchWeights,
) -> f64 {
    ratio(&normalize_text(file_title), &normalize_text(entry_title))
        + artist_bonus(file_artist, entry_artist, weights)
}
