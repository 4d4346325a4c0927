//! Long-running batch jobs over the catalog.
//!
//! Every job runs its items one at a time, pauses between them with a
//! [`BatchPacer`], and checks a [`CancellationToken`] before each item so a
//! cancel stops the job after the item in progress. Configuration problems
//! found before the loop fail the job; per-item failures are counted in the
//! returned stats and logged.

mod acquire;
mod discography;
mod genres;
mod organize;

pub use acquire::AcquireBatchStats;
pub use discography::{DiscographyBatchStats, collaborator_names};
pub use genres::GenreBatchStats;
pub use organize::OrganizeStats;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::catalog::CatalogStore;
use crate::error::{Error, Result};
use crate::pacing::BatchPacer;

/// Runs batch jobs against one catalog.
pub struct BatchRunner {
    store: Arc<dyn CatalogStore>,
    cancel: CancellationToken,
    delay: Option<Duration>,
}

impl BatchRunner {
    pub fn new(store: Arc<dyn CatalogStore>, cancel: CancellationToken) -> Self {
        Self {
            store,
            cancel,
            delay: None,
        }
    }

    /// Use a fixed pause between items instead of the size-based one.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    fn pacer(&self, total: usize) -> BatchPacer {
        match self.delay {
            Some(delay) => BatchPacer::with_delay(total, delay),
            None => BatchPacer::for_batch(total),
        }
    }

    /// True (and logged) once the job should stop.
    fn cancelled(&self, job: &str, done: usize, total: usize) -> bool {
        if self.cancel.is_cancelled() {
            info!(target: "music_curator::batch", job, done, total, "Cancelled, stopping");
            return true;
        }
        false
    }
}

/// Fails when `path` exists but is not a directory.
fn require_dir_if_present(path: &Path, what: &str) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(Error::config(format!(
            "{} {} is not a directory",
            what,
            path.display()
        )));
    }
    Ok(())
}

/// Fails unless `path` is an existing directory.
fn require_dir(path: &Path, what: &str) -> Result<()> {
    if !path.is_dir() {
        return Err(Error::config(format!(
            "{} {} does not exist or is not a directory",
            what,
            path.display()
        )));
    }
    Ok(())
}
