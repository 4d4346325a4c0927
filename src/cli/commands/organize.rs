//! File organization command.

use std::path::Path;

use tokio::runtime::Runtime;

use super::{Cli, batch_runner, load_config, open_store, providers};

/// Move loose files from `source` into `root/Artist/Album/`
pub fn cmd_organize(rt: &Runtime, cli: &Cli, source: &Path, root: &Path) -> anyhow::Result<()> {
    let config = load_config(cli);
    let lookup = providers(&config)?.musicbrainz;

    rt.block_on(async {
        let store = open_store(cli, &config).await?;
        println!("Organizing {} into {}", source.display(), root.display());

        let stats = batch_runner(store)
            .organize_unsorted(lookup.as_ref(), source, root)
            .await?;

        println!("\nOrganize complete:");
        println!("  Files processed: {}", stats.files_processed);
        println!("  Files moved:     {}", stats.files_moved);
        println!("  Files skipped:   {}", stats.files_skipped);
        println!("  Folders created: {}", stats.folders_created);
        println!("  Lookups made:    {}", stats.lookups_made);
        println!("  Errors:          {}", stats.errors);
        Ok::<_, anyhow::Error>(())
    })
}
