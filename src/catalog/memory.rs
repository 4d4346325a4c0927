//! In-process catalog store.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::CatalogStore;
use crate::error::{Error, Result};
use crate::model::{
    CandidateStatus, CandidateTrack, CatalogEntry, NewCatalogEntry, StoredCandidate,
};

#[derive(Default)]
struct State {
    entries: Vec<CatalogEntry>,
    candidates: Vec<StoredCandidate>,
    next_entry_id: i64,
    next_candidate_id: i64,
}

/// Catalog held in memory behind a single async mutex.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<State>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `entries` (ids assigned in order).
    pub fn with_entries(entries: Vec<NewCatalogEntry>) -> Self {
        let mut state = State::default();
        for entry in entries {
            state.next_entry_id += 1;
            state.entries.push(to_entry(state.next_entry_id, entry));
        }
        Self {
            state: Mutex::new(state),
        }
    }
}

fn to_entry(id: i64, entry: NewCatalogEntry) -> CatalogEntry {
    CatalogEntry {
        id,
        track_name: entry.track_name,
        artist_name: entry.artist_name,
        album: entry.album,
        genre: entry.genre,
        relative_path: entry.relative_path,
    }
}

fn path_taken(entries: &[CatalogEntry], path: &str, except_id: Option<i64>) -> bool {
    entries
        .iter()
        .any(|e| Some(e.id) != except_id && e.relative_path.as_deref() == Some(path))
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn all_entries(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.state.lock().await.entries.clone())
    }

    async fn create_entry(&self, entry: NewCatalogEntry) -> Result<CatalogEntry> {
        let mut state = self.state.lock().await;
        if let Some(path) = &entry.relative_path
            && path_taken(&state.entries, path, None)
        {
            return Err(Error::DuplicatePath(path.clone()));
        }
        state.next_entry_id += 1;
        let created = to_entry(state.next_entry_id, entry);
        state.entries.push(created.clone());
        Ok(created)
    }

    async fn update_entry(&self, entry: &CatalogEntry) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(path) = &entry.relative_path
            && path_taken(&state.entries, path, Some(entry.id))
        {
            return Err(Error::DuplicatePath(path.clone()));
        }
        let slot = state
            .entries
            .iter_mut()
            .find(|e| e.id == entry.id)
            .ok_or_else(|| Error::not_found(format!("catalog entry {}", entry.id)))?;
        *slot = entry.clone();
        Ok(())
    }

    async fn distinct_artists(&self) -> Result<Vec<String>> {
        let state = self.state.lock().await;
        let artists: BTreeSet<String> = state
            .entries
            .iter()
            .map(|e| e.artist_name.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect();
        Ok(artists.into_iter().collect())
    }

    async fn entries_missing_genre(&self) -> Result<Vec<CatalogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.genre.as_deref().is_none_or(|g| g.trim().is_empty()))
            .cloned()
            .collect())
    }

    async fn candidate_keys(&self) -> Result<HashSet<(String, String)>> {
        let state = self.state.lock().await;
        Ok(state.candidates.iter().map(|c| c.track.key()).collect())
    }

    async fn insert_candidate(&self, candidate: &CandidateTrack) -> Result<bool> {
        let mut state = self.state.lock().await;
        let key = candidate.key();
        if state.candidates.iter().any(|c| c.track.key() == key) {
            return Ok(false);
        }
        state.next_candidate_id += 1;
        let id = state.next_candidate_id;
        state.candidates.push(StoredCandidate {
            id,
            track: candidate.clone(),
        });
        Ok(true)
    }

    async fn candidates_with_status(&self, status: CandidateStatus) -> Result<Vec<StoredCandidate>> {
        let state = self.state.lock().await;
        Ok(state
            .candidates
            .iter()
            .filter(|c| c.track.status == status)
            .cloned()
            .collect())
    }

    async fn set_candidate_status(&self, id: i64, status: CandidateStatus) -> Result<()> {
        let mut state = self.state.lock().await;
        let candidate = state
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::not_found(format!("candidate {id}")))?;
        candidate.track.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_entries_assigns_ids() {
        let store = MemoryCatalog::with_entries(vec![
            NewCatalogEntry {
                track_name: "One".into(),
                artist_name: "A".into(),
                ..Default::default()
            },
            NewCatalogEntry {
                track_name: "Two".into(),
                artist_name: "B".into(),
                ..Default::default()
            },
        ]);
        let entries = store.all_entries().await.unwrap();
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);

        let created = store
            .create_entry(NewCatalogEntry {
                track_name: "Three".into(),
                artist_name: "C".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, 3);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = MemoryCatalog::new();
        let err = store
            .set_candidate_status(99, CandidateStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
