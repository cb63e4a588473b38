use anyhow::{Context, Result};
use log::info;
use serde_json::json;
use std::path::Path;

use msai::metadata::{MetadataTable, TableIndex};

/// Import a metadata file and print its columns and rows
pub fn run(file: &Path, index: Option<&str>, auto_index: bool, json: bool) -> Result<()> {
    let mut table = MetadataTable::import(file, auto_index && index.is_none())
        .with_context(|| format!("Failed to import metadata: {}", file.display()))?;

    if let Some(column) = index {
        table
            .set_index(column)
            .with_context(|| format!("Cannot index by {}", column))?;
        info!("Indexed by {}", column);
    }

    let index_label = match table.index() {
        TableIndex::Positional => "positional".to_string(),
        TableIndex::Column(column) => column.clone(),
    };

    if json {
        let summary = json!({
            "source": file.display().to_string(),
            "rows": table.len(),
            "index": index_label,
            "columns": table.describe(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Source: {}", file.display());
    println!("Rows:   {}", table.len());
    println!("Index:  {}", index_label);
    println!();
    println!("{:<24} {:<8} {:>8} {:>8}", "column", "type", "non-null", "distinct");
    for summary in table.describe() {
        println!(
            "{:<24} {:<8} {:>8} {:>8}",
            summary.column,
            summary.kind.to_string(),
            summary.non_null,
            summary.distinct
        );
    }
    println!();
    println!("{}", table);

    Ok(())
}
