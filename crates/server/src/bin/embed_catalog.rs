//! Regenerate product embeddings in a catalog dump.
//!
//! ```bash
//! # Re-embed every product with the configured embedder
//! embed-catalog --catalog catalog.json
//!
//! # Only fill in products that have no embedding yet
//! embed-catalog --catalog catalog.json --missing-only
//! ```

use anyhow::{Context, Result};
use catalog::{CatalogSource, JsonCatalogSource};
use clap::Parser;
use server::{embed_products, EmbedScope, ServerConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Writes fresh embeddings into a catalog dump.
///
/// The embedder comes from the same configuration the server reads
/// (`server.*` file and `CATALOG_SEARCH__*` variables).
#[derive(Parser)]
#[command(name = "embed-catalog", version, about)]
struct Cli {
    /// Catalog dump to read (defaults to `catalog.path` from the config)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Where to write the result (defaults to overwriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep existing embeddings and only embed products without one
    #[arg(long)]
    missing_only: bool,

    /// Texts per embedder call
    #[arg(long, default_value_t = server::embed::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = ServerConfig::load()?;
    let input = cli
        .catalog
        .or_else(|| config.catalog.path.clone())
        .context("no catalog given; pass --catalog or set catalog.path")?;

    let source = JsonCatalogSource::new(&input);
    let mut dump = source
        .load()
        .with_context(|| format!("loading {}", input.display()))?;
    tracing::info!(products = dump.products.len(), "Fetched products");

    let embedder = semantic::build_embedder(&config.semantic)?;
    let scope = if cli.missing_only {
        EmbedScope::Missing
    } else {
        EmbedScope::All
    };
    let written = embed_products(&mut dump, embedder.as_ref(), scope, cli.batch_size).await?;

    let target = JsonCatalogSource::new(cli.output.unwrap_or(input));
    target
        .store(&dump)
        .with_context(|| format!("writing {}", target.path().display()))?;

    println!(
        "Embedded {written} of {} products into {}",
        dump.products.len(),
        target.path().display()
    );
    Ok(())
}
