use std::path::PathBuf;

use anyhow::{Context, Result};

use glow_pick::load_file;

/// Catalog file used when no path is given, as shipped with the original
/// application.
const DEFAULT_CATALOG: &str = "cosmetic_p.csv";

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));

    // Fail fast: a missing or malformed catalog aborts startup.
    let catalog = load_file(&path)
        .with_context(|| format!("loading catalog from {}", path.display()))?;

    let (price_min, price_max) = catalog.price_range();
    let (rank_min, rank_max) = catalog.rank_range();

    println!("{} products loaded from {}", catalog.len(), path.display());
    println!(
        "{} brands, {} distinct ingredients",
        catalog.brands().len(),
        catalog.ingredients().len()
    );
    println!("price range: {price_min:.2} - {price_max:.2}");
    println!("rank range: {rank_min} - {rank_max}");

    Ok(())
}
