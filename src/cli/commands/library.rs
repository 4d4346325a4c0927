//! Catalog reconciliation command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Runtime;

use super::{Cli, cancel_on_ctrl_c, library_root, load_config, open_store, providers};
use crate::catalog::CatalogStore;
use crate::genre::GenreEnricher;
use crate::library::CatalogReconciler;
use crate::providers::TagSource;

/// Reconcile the catalog with the files under `root`
pub fn cmd_reconcile(
    rt: &Runtime,
    cli: &Cli,
    root: Option<&Path>,
    no_genres: bool,
) -> anyhow::Result<()> {
    let config = load_config(cli);
    let root = library_root(root, &config)?;

    rt.block_on(async {
        let store = open_store(cli, &config).await?;
        let mut reconciler =
            CatalogReconciler::new(store as Arc<dyn CatalogStore>, config.matching)
                .with_cancellation(cancel_on_ctrl_c());

        if !no_genres {
            let set = providers(&config)?;
            let source: Arc<dyn TagSource> = set.musicbrainz.clone();
            reconciler = reconciler
                .with_genre_enricher(Arc::new(GenreEnricher::from_config(source, &config.genre)));
        }

        println!("Reconciling {}", root.display());
        let stats = reconciler
            .reconcile(&root)
            .await
            .with_context(|| format!("Failed to reconcile {}", root.display()))?;

        println!("\nReconciliation complete:");
        println!("  Files scanned: {}", stats.files_scanned);
        println!("  Created:       {}", stats.created);
        println!("  Updated:       {}", stats.updated);
        println!("  Unchanged:     {}", stats.skipped);
        println!("  Errors:        {}", stats.errors);
        Ok::<_, anyhow::Error>(())
    })
}
