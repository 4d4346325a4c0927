//! SQLite-backed catalog store.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::{CatalogStore, DEFAULT_DB_NAME};
use crate::error::{Error, Result};
use crate::model::{
    CandidateStatus, CandidateTrack, CatalogEntry, NewCatalogEntry, StoredCandidate,
};
use crate::normalize::dedup_key;

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
///
/// # Arguments
///
/// * `path` - Optional path to the database file
///
/// # Returns
///
/// A SQLite connection URL string (e.g., "sqlite:music_curator.db")
pub fn db_url(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Arguments
///
/// * `db_url` - SQLite connection URL (e.g., "sqlite:music.db")
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

// ============================================================================
// Database Row Types
// ============================================================================

/// Database row for the candidates table.
#[derive(Debug, sqlx::FromRow)]
struct CandidateRow {
    id: i64,
    track_name: String,
    artist_name: String,
    album: Option<String>,
    genre: Option<String>,
    status: String,
}

impl From<CandidateRow> for StoredCandidate {
    fn from(row: CandidateRow) -> Self {
        StoredCandidate {
            id: row.id,
            track: CandidateTrack {
                track_name: row.track_name,
                artist_name: row.artist_name,
                album: row.album,
                genre: row.genre,
                status: row.status.parse().unwrap_or_default(),
            },
        }
    }
}

/// Map a unique-constraint violation on `relative_path` to
/// [`Error::DuplicatePath`].
fn path_conflict(err: sqlx::Error, path: Option<&str>) -> Error {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        return Error::DuplicatePath(path.unwrap_or_default().to_string());
    }
    Error::Database(err)
}

/// Catalog persisted in SQLite.
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating and migrating if needed) the database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = init_db(&db_url(Some(path))).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const ENTRY_COLUMNS: &str = "id, track_name, artist_name, album, genre, relative_path";

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn all_entries(&self) -> Result<Vec<CatalogEntry>> {
        let entries = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM catalog_entries ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn create_entry(&self, entry: NewCatalogEntry) -> Result<CatalogEntry> {
        let created = sqlx::query_as::<_, CatalogEntry>(&format!(
            r#"
            INSERT INTO catalog_entries (track_name, artist_name, album, genre, relative_path)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(&entry.track_name)
        .bind(&entry.artist_name)
        .bind(&entry.album)
        .bind(&entry.genre)
        .bind(&entry.relative_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| path_conflict(e, entry.relative_path.as_deref()))?;
        Ok(created)
    }

    async fn update_entry(&self, entry: &CatalogEntry) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE catalog_entries
            SET track_name = ?, artist_name = ?, album = ?, genre = ?, relative_path = ?
            WHERE id = ?
            "#,
        )
        .bind(&entry.track_name)
        .bind(&entry.artist_name)
        .bind(&entry.album)
        .bind(&entry.genre)
        .bind(&entry.relative_path)
        .bind(entry.id)
        .execute(&self.pool)
        .await
        .map_err(|e| path_conflict(e, entry.relative_path.as_deref()))?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("catalog entry {}", entry.id)));
        }
        Ok(())
    }

    async fn distinct_artists(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT trim(artist_name) AS artist
            FROM catalog_entries
            WHERE trim(artist_name) != ''
            ORDER BY artist
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(a,)| a).collect())
    }

    async fn entries_missing_genre(&self) -> Result<Vec<CatalogEntry>> {
        let entries = sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM catalog_entries \
             WHERE genre IS NULL OR trim(genre) = '' ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn candidate_keys(&self) -> Result<HashSet<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT track_name, artist_name FROM candidates")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(|(t, a)| dedup_key(t, a)).collect())
    }

    async fn insert_candidate(&self, candidate: &CandidateTrack) -> Result<bool> {
        // The unique pair index turns duplicates into a no-op.
        let result = sqlx::query(
            r#"
            INSERT INTO candidates (track_name, artist_name, album, genre, status)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&candidate.track_name)
        .bind(&candidate.artist_name)
        .bind(&candidate.album)
        .bind(&candidate.genre)
        .bind(candidate.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn candidates_with_status(&self, status: CandidateStatus) -> Result<Vec<StoredCandidate>> {
        let rows: Vec<CandidateRow> = sqlx::query_as(
            r#"
            SELECT id, track_name, artist_name, album, genre, status
            FROM candidates
            WHERE status = ?
            ORDER BY id
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoredCandidate::from).collect())
    }

    async fn set_candidate_status(&self, id: i64, status: CandidateStatus) -> Result<()> {
        let result = sqlx::query("UPDATE candidates SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found(format!("candidate {id}")));
        }
        Ok(())
    }
}
