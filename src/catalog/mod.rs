//! Catalog persistence.
//!
//! Everything above this module talks to a [`CatalogStore`]. Two
//! implementations exist:
//! - [`SqliteCatalog`] - the real store, SQLx over an embedded SQLite file
//! - [`MemoryCatalog`] - in-process store for tests and dry runs
//!
//! Both enforce the same uniqueness rules: one entry per `relative_path`
//! and one candidate per case-insensitive (artist, track) pair.
//!
//! # Example
//!
//! ```ignore
//! use music_curator::catalog::{init_db, SqliteCatalog, CatalogStore};
//!
//! let pool = init_db("sqlite:music_curator.db").await?;
//! let store = SqliteCatalog::new(pool);
//! let artists = store.distinct_artists().await?;
//! ```

mod memory;
mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::{SqliteCatalog, db_url, init_db};

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{CandidateStatus, CandidateTrack, CatalogEntry, NewCatalogEntry, StoredCandidate};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "music_curator.db";

/// Storage for catalog entries and discovered candidates.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every catalog entry, in insertion order.
    async fn all_entries(&self) -> Result<Vec<CatalogEntry>>;

    /// Insert an entry atomically.
    ///
    /// Fails with [`crate::error::Error::DuplicatePath`] when another entry
    /// already owns the relative path.
    async fn create_entry(&self, entry: NewCatalogEntry) -> Result<CatalogEntry>;

    /// Overwrite the stored row with `entry` (matched by id).
    async fn update_entry(&self, entry: &CatalogEntry) -> Result<()>;

    /// Distinct non-blank artist names, sorted.
    async fn distinct_artists(&self) -> Result<Vec<String>>;

    /// Entries whose genre is missing or blank.
    async fn entries_missing_genre(&self) -> Result<Vec<CatalogEntry>>;

    /// Dedup keys of every stored candidate.
    async fn candidate_keys(&self) -> Result<HashSet<(String, String)>>;

    /// Store a candidate. Returns false if the pair already exists.
    async fn insert_candidate(&self, candidate: &CandidateTrack) -> Result<bool>;

    /// Candidates with `status`, oldest first.
    async fn candidates_with_status(&self, status: CandidateStatus) -> Result<Vec<StoredCandidate>>;

    /// Change one candidate's status.
    async fn set_candidate_status(&self, id: i64, status: CandidateStatus) -> Result<()>;
}

/// Dedup keys of every catalog entry.
pub async fn entry_keys(store: &dyn CatalogStore) -> Result<HashSet<(String, String)>> {
    Ok(store
        .all_entries()
        .await?
        .iter()
        .map(|e| crate::normalize::dedup_key(&e.track_name, &e.artist_name))
        .collect())
}
