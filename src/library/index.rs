//! In-memory view of the catalog used while reconciling.

use std::collections::HashMap;
use std::path::Path;

use crate::metadata::FileMetadata;
use crate::model::{CatalogEntry, UNKNOWN_ARTIST};
use crate::normalize::dedup_key;
use crate::similarity::{self, MatchWeights};

/// How a file was matched to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Entry already points at this file
    Path,
    /// Case-insensitive track name equality
    ExactName,
    /// Best similarity score above the threshold
    Fuzzy,
}

/// A chosen entry, by position in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryMatch {
    pub position: usize,
    pub kind: MatchKind,
    pub score: f64,
}

/// Catalog entries loaded once per run and kept in step with every write.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<i64, usize>,
    by_path: HashMap<String, usize>,
    genres: HashMap<(String, String), String>,
}

impl CatalogIndex {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.upsert(entry);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&CatalogEntry> {
        self.entries.get(position)
    }

    pub fn by_path(&self, relative_path: &str) -> Option<&CatalogEntry> {
        self.by_path.get(relative_path).map(|&i| &self.entries[i])
    }

    /// Genre already recorded for this artist and track, if any.
    pub fn known_genre(&self, artist: &str, track: &str) -> Option<&str> {
        self.genres.get(&dedup_key(track, artist)).map(String::as_str)
    }

    /// Insert a new entry or replace the one with the same id.
    pub fn upsert(&mut self, entry: CatalogEntry) {
        let position = match self.by_id.get(&entry.id) {
            Some(&i) => {
                if let Some(old) = self.entries[i].relative_path.take() {
                    self.by_path.remove(&old);
                }
                i
            }
            None => {
                self.entries.push(entry.clone());
                self.by_id.insert(entry.id, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        if let Some(path) = &entry.relative_path {
            self.by_path.insert(path.clone(), position);
        }
        if let Some(genre) = entry.genre.as_deref().filter(|g| !g.trim().is_empty()) {
            self.genres.insert(
                dedup_key(&entry.track_name, &entry.artist_name),
                genre.to_string(),
            );
        }
        self.entries[position] = entry;
    }

    /// Best entry for the file at `relative_path`.
    ///
    /// Tries the path first, then exact track name, then the highest fuzzy
    /// score at or above the threshold. Ties keep the earlier entry. Entries
    /// already backed by a different file that still exists are skipped.
    pub fn best_match(
        &self,
        file: &FileMetadata,
        relative_path: &str,
        root: &Path,
        weights: &MatchWeights,
    ) -> Option<EntryMatch> {
        if let Some(&position) = self.by_path.get(relative_path) {
            return Some(EntryMatch {
                position,
                kind: MatchKind::Path,
                score: f64::INFINITY,
            });
        }

        let file_artist = file.artist.as_deref().unwrap_or(UNKNOWN_ARTIST);
        let wanted = file.track_name.trim().to_lowercase();
        let mut exact: Option<EntryMatch> = None;
        let mut fuzzy: Option<EntryMatch> = None;

        for (position, entry) in self.entries.iter().enumerate() {
            if !is_available(entry, relative_path, root) {
                continue;
            }

            if entry.track_name.trim().to_lowercase() == wanted {
                let score = 1.0 + similarity::artist_bonus(file_artist, &entry.artist_name, weights);
                if exact.is_none_or(|m| score > m.score) {
                    exact = Some(EntryMatch {
                        position,
                        kind: MatchKind::ExactName,
                        score,
                    });
                }
                continue;
            }

            let score = similarity::score(
                &file.track_name,
                file_artist,
                &entry.track_name,
                &entry.artist_name,
                weights,
            );
            if score >= weights.fuzzy_threshold && fuzzy.is_none_or(|m| score > m.score) {
                fuzzy = Some(EntryMatch {
                    position,
                    kind: MatchKind::Fuzzy,
                    score,
                });
            }
        }

        exact.or(fuzzy)
    }
}

/// An entry can take this file unless it is backed by another file that
/// is still on disk.
fn is_available(entry: &CatalogEntry, relative_path: &str, root: &Path) -> bool {
    match entry.relative_path.as_deref() {
        None => true,
        Some(path) if path == relative_path => true,
        Some(path) => !root.join(path).exists(),
    }
}
