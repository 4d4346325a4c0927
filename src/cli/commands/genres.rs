//! Genre backfill command.

use std::sync::Arc;

use tokio::runtime::Runtime;

use super::{Cli, batch_runner, load_config, open_store, providers};
use crate::genre::GenreEnricher;
use crate::providers::TagSource;

/// Fill in missing genres on catalog entries
pub fn cmd_genres(rt: &Runtime, cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli);
    let source: Arc<dyn TagSource> = providers(&config)?.musicbrainz;
    let genres = GenreEnricher::from_config(source, &config.genre);

    rt.block_on(async {
        let store = open_store(cli, &config).await?;
        let stats = batch_runner(store).update_missing_genres(&genres).await?;

        println!("\nGenre update complete:");
        println!("  Examined:  {}", stats.examined);
        println!("  Updated:   {}", stats.updated);
        println!("  Not found: {}", stats.not_found);
        Ok::<_, anyhow::Error>(())
    })
}
