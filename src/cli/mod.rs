//! Command-line interface for music-curator.
//!
//! Thin commands over the library: reconciling the catalog with a music
//! folder, loading discographies, acquiring candidates, backfilling genres
//! and organizing loose files.

mod commands;

pub use commands::{Cli, Commands, run_command};

use tracing_subscriber::EnvFilter;

/// Directive always added on top of `RUST_LOG`.
pub const DEFAULT_LOG_DIRECTIVE: &str = "music_curator=info";

/// Log filter for the binary: the `RUST_LOG` directives (if any) plus
/// [`DEFAULT_LOG_DIRECTIVE`].
pub fn log_filter(env_directives: Option<&str>) -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::new(env_directives.unwrap_or_default())
        .add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
}
