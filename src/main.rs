//! Music Curator - catalog maintenance for a local music library.
//!
//! Every feature is a CLI subcommand; run with `--help` for the list.

use clap::{CommandFactory, Parser};
use music_curator::cli;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(cli::log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())?)
        .init();

    if !cli::run_command(&args)? {
        cli::Cli::command().print_help()?;
        println!();
    }
    Ok(())
}
