//! Discography lookup and candidate loading commands.

use tokio::runtime::Runtime;

use super::{Cli, batch_runner, load_config, open_store, providers};
use crate::batch::DiscographyBatchStats;
use crate::discography::{DiscographyAggregator, NO_PROVIDER};

/// Print the discography of one artist
pub fn cmd_discography(rt: &Runtime, cli: &Cli, artist: &str) -> anyhow::Result<()> {
    let config = load_config(cli);
    let aggregator = DiscographyAggregator::from_provider_set(&providers(&config)?);

    rt.block_on(async {
        let result = aggregator.fetch_discography(artist).await;
        if result.provider_used == NO_PROVIDER {
            println!("No tracks found for {}", artist);
            return;
        }

        println!(
            "{} tracks for {} (via {}):",
            result.tracks.len(),
            artist,
            result.provider_used
        );
        for track in &result.tracks {
            let album = track.album.as_deref().unwrap_or("-");
            match &track.genre {
                Some(genre) => println!("  {} - {} [{}] ({})", track.artist_name, track.track_name, album, genre),
                None => println!("  {} - {} [{}]", track.artist_name, track.track_name, album),
            }
        }
    });
    Ok(())
}

/// Load candidates for every catalog artist
pub fn cmd_load_discographies(rt: &Runtime, cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli);
    let aggregator = DiscographyAggregator::from_provider_set(&providers(&config)?);

    rt.block_on(async {
        let store = open_store(cli, &config).await?;
        let stats = batch_runner(store)
            .load_all_discographies(&aggregator)
            .await?;
        print_stats(&stats);
        Ok::<_, anyhow::Error>(())
    })
}

/// Load candidates for the artists in collaboration credits
pub fn cmd_load_collaborators(rt: &Runtime, cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli);
    let aggregator = DiscographyAggregator::from_provider_set(&providers(&config)?);

    rt.block_on(async {
        let store = open_store(cli, &config).await?;
        let stats = batch_runner(store).load_collaborators(&aggregator).await?;
        print_stats(&stats);
        Ok::<_, anyhow::Error>(())
    })
}

fn print_stats(stats: &DiscographyBatchStats) {
    println!("\nDiscography load complete:");
    println!("  Artists:      {}", stats.artists);
    println!("  Tracks found: {}", stats.tracks_found);
    println!("  New:          {}", stats.inserted);
    println!("  Duplicates:   {}", stats.duplicates);
    println!("  No tracks:    {}", stats.failed_artists);
}
