use anyhow::{Context, Result};
use log::info;

use msai::catalog::FileCatalog;

use super::{Config, ScanArgs};

/// List the run files found under a directory
pub fn run(scan: &ScanArgs, config: &Config, json: bool) -> Result<()> {
    let filter = scan.type_filter(config);
    info!("Scanning {} for {:?} runs", scan.directory.display(), filter);

    let catalog = FileCatalog::build(&scan.directory, filter, scan.recursive(config))
        .with_context(|| format!("Failed to catalog {}", scan.directory.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.entries())?);
        return Ok(());
    }

    let width = catalog
        .entries()
        .iter()
        .map(|entry| entry.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{:<width$}  {:<6}  {:>10}  path", "name", "type", "size_mb", width = width);
    for entry in catalog.entries() {
        println!(
            "{:<width$}  {:<6}  {:>10.3}  {}",
            entry.name,
            entry.file_type.to_string(),
            entry.size_mb,
            entry.path.display(),
            width = width
        );
    }
    println!();
    println!("{} files", catalog.len());

    Ok(())
}
