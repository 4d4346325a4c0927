//! Crate-wide error types.
//!
//! Library modules return [`Result`] with the unified [`Error`]; provider
//! clients use their own [`ProviderError`] which converts into it. The CLI
//! wraps everything in `anyhow` for reporting.
//!
//! Batch drivers only surface errors found before their loop starts.
//! Per-item failures are captured into stats or result structs instead.
//!
//! # Example
//!
//! ```ignore
//! use music_curator::error::{Error, Result};
//!
//! fn check_root(path: &Path) -> Result<()> {
//!     if path.exists() && !path.is_dir() {
//!         return Err(Error::config(format!("{} is not a directory", path.display())));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use crate::providers::ProviderError;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Tag reading error
    #[error("Metadata error for {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    /// External metadata provider error
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Unreadable directory or entry during a library walk
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Another catalog entry already owns this relative path
    #[error("Relative path already cataloged: {0}")]
    DuplicatePath(String),

    /// Missing file or record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// True if this is (or wraps) a duplicate relative path rejection.
    pub fn is_duplicate_path(&self) -> bool {
        match self {
            Self::DuplicatePath(_) => true,
            Self::WithContext { source, .. } => source.is_duplicate_path(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("Ed Sheeran/Divide/Shape of You.mp3");
        assert!(err.to_string().contains("Shape of You.mp3"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::not_found("Adele/25/Hello.mp3").context("while promoting track");
        let msg = err.to_string();
        assert!(msg.contains("while promoting track"));
        assert!(msg.contains("Hello.mp3"));
    }

    #[test]
    fn test_metadata_error() {
        let err = Error::metadata("/music/song.mp3", "unsupported format");
        let msg = err.to_string();
        assert!(msg.contains("song.mp3"));
        assert!(msg.contains("unsupported format"));
    }

    #[test]
    fn test_provider_error_converts() {
        let err: Error = ProviderError::RateLimited.into();
        assert!(matches!(err, Error::Provider(ProviderError::RateLimited)));
    }

    #[test]
    fn test_duplicate_path_through_context() {
        let err = Error::DuplicatePath("a/b/c.mp3".into()).context("creating entry");
        assert!(err.is_duplicate_path());
        assert!(!Error::config("x").is_duplicate_path());
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::config("test"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }
}
