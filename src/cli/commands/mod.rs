//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `library`: Reconciling the catalog with a music folder
//! - `discography`: Discography lookups and candidate loading
//! - `acquire`: Downloading pending candidates
//! - `genres`: Genre backfill
//! - `organize`: Sorting loose files into the library layout

mod acquire;
mod discography;
mod genres;
mod library;
mod organize;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::batch::BatchRunner;
use crate::catalog::SqliteCatalog;
use crate::config::{self, Config};
use crate::pacing;
use crate::providers::ProviderSet;

pub use acquire::cmd_acquire;
pub use discography::{cmd_discography, cmd_load_collaborators, cmd_load_discographies};
pub use genres::cmd_genres;
pub use library::cmd_reconcile;
pub use organize::cmd_organize;

/// Music Curator CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog database path (default: from config, else the config directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file path (default: the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Spotify client id (overrides the config file)
    #[arg(long, env = "SPOTIFY_CLIENT_ID", global = true, hide_env_values = true)]
    pub spotify_client_id: Option<String>,

    /// Spotify client secret (overrides the config file)
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Match the files under a music folder against the catalog
    Reconcile {
        /// Library root (default: from config)
        root: Option<PathBuf>,
        /// Skip genre lookups for new or updated entries
        #[arg(long)]
        no_genres: bool,
    },
    /// Print the discography found for one artist
    Discography {
        /// Artist name
        artist: String,
    },
    /// Load candidates from the discography of every catalog artist
    LoadDiscographies,
    /// Load candidates for the artists named in collaboration credits
    LoadCollaborators,
    /// Download pending candidates into the library
    Acquire {
        /// Maximum number of candidates to attempt
        #[arg(short, long)]
        limit: Option<usize>,
        /// Library root (default: from config)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Fill in missing genres
    Genres,
    /// Move loose audio files into the Artist/Album layout
    Organize {
        /// Folder of unsorted files
        source: PathBuf,
        /// Library root to move them into
        root: PathBuf,
    },
    /// Show the pause used between items of a batch of N
    Delay {
        /// Batch size
        n: usize,
    },
    /// Write the default config file if none exists
    InitConfig,
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was
/// specified (the caller prints help).
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(command) = &cli.command else {
        return Ok(false);
    };

    let rt = Runtime::new()?;

    match command {
        Commands::Reconcile { root, no_genres } => {
            cmd_reconcile(&rt, cli, root.as_deref(), *no_genres)?;
        }
        Commands::Discography { artist } => cmd_discography(&rt, cli, artist)?,
        Commands::LoadDiscographies => cmd_load_discographies(&rt, cli)?,
        Commands::LoadCollaborators => cmd_load_collaborators(&rt, cli)?,
        Commands::Acquire { limit, root } => cmd_acquire(&rt, cli, *limit, root.as_deref())?,
        Commands::Genres => cmd_genres(&rt, cli)?,
        Commands::Organize { source, root } => cmd_organize(&rt, cli, source, root)?,
        Commands::Delay { n } => cmd_delay(*n),
        Commands::InitConfig => cmd_init_config(cli)?,
    }
    Ok(true)
}

/// Print the batch delay for `n` items.
pub fn cmd_delay(n: usize) {
    println!("{:.2}", pacing::delay_for(n));
}

/// Write a default config file unless one is already there.
pub fn cmd_init_config(cli: &Cli) -> anyhow::Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config::config_path().context("Could not determine config directory")?,
    };
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    config::save_to(&Config::default(), &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Config file plus command-line and environment overrides.
pub(crate) fn load_config(cli: &Cli) -> Config {
    let config = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    config.with_spotify_credentials(
        cli.spotify_client_id.clone(),
        cli.spotify_client_secret.clone(),
    )
}

/// Open (creating if needed) the catalog database.
pub(crate) async fn open_store(cli: &Cli, config: &Config) -> anyhow::Result<Arc<SqliteCatalog>> {
    let path = cli
        .db
        .clone()
        .or_else(|| config.database_path())
        .context("No database path: pass --db or set library.database")?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let store = SqliteCatalog::open(&path)
        .await
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;
    info!(target: "music_curator::cli", db = %path.display(), "Catalog opened");
    Ok(Arc::new(store))
}

/// HTTP clients for every provider.
pub(crate) fn providers(config: &Config) -> anyhow::Result<ProviderSet> {
    ProviderSet::new(&config.provider_config()).context("Failed to build provider clients")
}

/// Library root from the argument, else the config.
pub(crate) fn library_root(arg: Option<&Path>, config: &Config) -> anyhow::Result<PathBuf> {
    arg.map(Path::to_path_buf)
        .or_else(|| config.library.root.clone())
        .context("No library root: pass one or set library.root in the config")
}

/// Batch runner whose token is cancelled on Ctrl+C.
///
/// Must be called inside the runtime.
pub(crate) fn batch_runner(store: Arc<SqliteCatalog>) -> BatchRunner {
    BatchRunner::new(store, cancel_on_ctrl_c())
}

/// A token cancelled by the first Ctrl+C.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after the current item...");
            signal_token.cancel();
        }
    });
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "music-curator",
            "acquire",
            "--limit",
            "5",
            "--db",
            "/tmp/c.db",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/c.db")));
        assert!(matches!(cli.command, Some(Commands::Acquire { limit: Some(5), .. })));
    }

    #[test]
    fn test_library_root_prefers_argument() {
        let mut config = Config::default();
        config.library.root = Some(PathBuf::from("/music"));

        assert_eq!(
            library_root(Some(Path::new("/other")), &config).unwrap(),
            PathBuf::from("/other")
        );
        assert_eq!(library_root(None, &config).unwrap(), PathBuf::from("/music"));
        assert!(library_root(None, &Config::default()).is_err());
    }

    #[test]
    fn test_init_config_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from([
            "music-curator",
            "--config",
            path.to_str().unwrap(),
            "init-config",
        ])
        .unwrap();

        cmd_init_config(&cli).unwrap();
        assert!(path.exists());
        let written = std::fs::read_to_string(&path).unwrap();

        std::fs::write(&path, "# edited\n").unwrap();
        cmd_init_config(&cli).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");
        assert!(written.contains("[genre]"));
    }
}
