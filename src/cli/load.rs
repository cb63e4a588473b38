use anyhow::{Context, Result};
use serde_json::{json, Map};

use msai::catalog::FileCatalog;
use msai::collection::SampleCollection;
use msai::metadata::{MetadataRecord, MetadataTable, Value};

use super::{CollectionArgs, Config, ScanArgs};

/// Catalog the directory, import the metadata files and join them
pub(crate) fn build_collection(
    scan: &ScanArgs,
    args: &CollectionArgs,
    config: &Config,
) -> Result<SampleCollection> {
    let catalog = FileCatalog::build(&scan.directory, scan.type_filter(config), scan.recursive(config))
        .with_context(|| format!("Failed to catalog {}", scan.directory.display()))?;

    let tables = args
        .metadata
        .iter()
        .map(|path| {
            MetadataTable::import(path, true)
                .with_context(|| format!("Failed to import metadata: {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    SampleCollection::build(catalog, &tables, args.options(config))
        .context("Failed to build sample collection")
}

/// A metadata record as a flat JSON object of plain values
fn record_json(record: &MetadataRecord) -> serde_json::Value {
    let fields: Map<String, serde_json::Value> = record
        .iter()
        .map(|(label, value)| {
            let value = match value {
                Value::Integer(v) => json!(v),
                Value::Float(v) => json!(v),
                Value::Boolean(v) => json!(v),
                Value::Text(v) => json!(v),
            };
            (label.to_string(), value)
        })
        .collect();
    serde_json::Value::Object(fields)
}

/// Initialize every run of a collection and print a summary
pub fn run(scan: &ScanArgs, args: &CollectionArgs, config: &Config, json: bool) -> Result<()> {
    let mut collection = build_collection(scan, args, config)?;
    collection
        .initialize_all()
        .context("Failed to initialize runs")?;

    let payloads = || collection.rows().iter().filter_map(|row| row.run.payload());
    let spectra: usize = payloads().map(|p| p.spectrum_count()).sum();
    let peaks: usize = payloads().map(|p| p.peak_count()).sum();

    if json {
        let samples: Vec<_> = collection
            .rows()
            .iter()
            .map(|row| {
                let payload = row.run.payload();
                json!({
                    "name": row.name,
                    "path": row.path.display().to_string(),
                    "spectra": payload.map(|p| p.spectrum_count()),
                    "peaks": payload.map(|p| p.peak_count()),
                    "tic": payload.map(|p| p.tic_sum()),
                    "metadata": record_json(&row.metadata),
                })
            })
            .collect();
        let summary = json!({ "samples": samples, "spectra": spectra, "peaks": peaks });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", collection);
        println!();
        println!(
            "{} samples, {} spectra, {} peaks",
            collection.len(),
            spectra,
            peaks
        );
    }

    Ok(())
}
