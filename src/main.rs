// src/main.rs

mod aggregator;
mod cli;
mod colors;
mod error;
mod fetch;
mod model;
mod normalize;
mod renderer;
mod store;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Args;
use colors::ColorRegistry;
use fetch::StatsFetcher;
use store::SnapshotStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.start > args.end {
        bail!("start month {} is after end month {}", args.start, args.end);
    }
    let start_time = Instant::now();
    let stats_root = args.stats_root();

    if args.download {
        let fetcher = StatsFetcher::new(&stats_root, args.form_rank())?;
        fetcher.fetch_range(args.start, args.end)?;
    }
    if args.normalize {
        normalize::normalize_range(&stats_root, args.start, args.end)?;
    }

    let store = SnapshotStore::new(&stats_root);
    let table = aggregator::build_ranking_table(&store, args.start, args.end, args.top);
    let months_with_data = table.values().filter(|entry| !entry.is_empty()).count();
    println!(
        "Aggregation finished in {:.2?}. {} of {} months have usage data.",
        start_time.elapsed(),
        months_with_data,
        table.len()
    );

    let tally = aggregator::tally_appearances(&table);
    println!("Top-{} appearances across {} months:", args.top, table.len());
    for (name, count) in aggregator::top_entities_by_appearance(&tally) {
        println!("{name}: {count}");
    }

    let mut registry = ColorRegistry::seeded();
    if let Some(path) = &args.palette {
        registry.load_overrides(path);
        info!(colors = registry.color_count(), "palette loaded");
    }

    println!("Starting page rendering...");
    let render_start = Instant::now();
    let pages = renderer::render(&table, &mut registry, args.graph_dir().as_deref())?;
    println!(
        "Rendering finished in {:.2?}. Produced {} pages.",
        render_start.elapsed(),
        pages.len()
    );
    for page in &pages {
        if let Some(path) = &page.path {
            println!("  {}", path.display());
        }
    }

    if let Some(path) = &args.palette {
        registry
            .save(path)
            .with_context(|| format!("cannot write palette {}", path.display()))?;
        info!(new_colors = registry.newly_generated(), "palette updated");
    }

    println!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}
