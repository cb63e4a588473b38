use anyhow::{Context, Result};
use log::info;
use serde_json::json;
use std::path::Path;

use super::load::build_collection;
use super::{CollectionArgs, Config, ScanArgs};

/// Parse every run, then write cached runs and a metadata snapshot to `output`
pub fn run(
    scan: &ScanArgs,
    args: &CollectionArgs,
    config: &Config,
    output: &Path,
    name: &str,
    json: bool,
) -> Result<()> {
    let mut collection = build_collection(scan, args, config)?;
    info!(
        "Caching {} samples with {} execution",
        collection.len(),
        collection.strategy()
    );

    collection
        .initialize_all()
        .context("Failed to initialize runs")?;

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    collection
        .save_all(output)
        .with_context(|| format!("Failed to save runs to {}", output.display()))?;
    let hash = collection
        .save_metadata(output, name)
        .context("Failed to save metadata snapshot")?;

    let snapshot = output.join(format!("{}.msAIm", name));
    if json {
        let summary = json!({
            "samples": collection.len(),
            "output": output.display().to_string(),
            "snapshot": snapshot.display().to_string(),
            "hash": hash,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Cached {} samples to {}", collection.len(), output.display());
        println!("Snapshot: {}", snapshot.display());
        println!("SHA-256:  {}", hash);
    }

    Ok(())
}
