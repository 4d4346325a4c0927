//! Candidate download command.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;

use super::{Cli, batch_runner, library_root, load_config, open_store, providers};
use crate::acquisition::AcquisitionCascade;
use crate::genre::GenreEnricher;
use crate::providers::TagSource;

/// Download pending candidates into the library
pub fn cmd_acquire(
    rt: &Runtime,
    cli: &Cli,
    limit: Option<usize>,
    root: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(cli);
    let root = library_root(root, &config)?;
    let cascade = AcquisitionCascade::with_default_tools(&config.acquisition_settings(), root.clone());

    let source: Arc<dyn TagSource> = providers(&config)?.musicbrainz;
    let genres = GenreEnricher::from_config(source, &config.genre);

    rt.block_on(async {
        let store = open_store(cli, &config).await?;
        let stats = batch_runner(store)
            .acquire_pending(&cascade, &root, Some(&genres), limit)
            .await?;

        println!("\nAcquisition complete:");
        println!("  Attempted: {}", stats.attempted);
        println!("  Succeeded: {}", stats.succeeded);
        println!("  Failed:    {}", stats.failed);
        Ok::<_, anyhow::Error>(())
    })
}
