use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use msai::catalog::CACHED_RUN_EXTENSION;
use msai::metadata::{MetadataTable, Value, CACHE_HASH_COLUMN};
use msai::store::ContentStore;

use super::status;

/// Outcome of checking one cached run
enum Check {
    Match,
    Mismatch,
    Missing,
    NoHash,
}

impl Check {
    fn label(&self) -> &'static str {
        match self {
            Check::Match => "OK",
            Check::Mismatch => "MISMATCH",
            Check::Missing => "MISSING",
            Check::NoHash => "NO HASH",
        }
    }

    fn is_ok(&self) -> bool {
        matches!(self, Check::Match)
    }
}

/// Check every cached run listed in a metadata snapshot against its recorded hash
pub fn run(snapshot: &Path, expected: Option<&str>, json: bool) -> Result<()> {
    let loaded = MetadataTable::import_snapshot(snapshot, expected)
        .with_context(|| format!("Failed to load snapshot: {}", snapshot.display()))?;
    let table = loaded.value;
    let directory = snapshot.parent().unwrap_or_else(|| Path::new("."));

    let mut results = Vec::with_capacity(table.len());
    for key in table.keys() {
        let recorded = table
            .record(&key)
            .and_then(|record| record.get(CACHE_HASH_COLUMN).and_then(Value::as_str).map(String::from));
        let path = directory.join(format!("{}.{}", key, CACHED_RUN_EXTENSION));

        let check = match recorded {
            None => Check::NoHash,
            Some(_) if !path.is_file() => Check::Missing,
            Some(hash) => {
                if ContentStore::verify(&path, &hash)
                    .with_context(|| format!("Failed to hash {}", path.display()))?
                {
                    Check::Match
                } else {
                    Check::Mismatch
                }
            }
        };
        results.push((key, check));
    }

    let failures = results.iter().filter(|(_, check)| !check.is_ok()).count()
        + usize::from(loaded.verified == Some(false));

    if json {
        let runs: Vec<_> = results
            .iter()
            .map(|(name, check)| json!({ "name": name, "status": check.label() }))
            .collect();
        let summary = json!({
            "snapshot": snapshot.display().to_string(),
            "snapshot_verified": loaded.verified,
            "runs": runs,
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        if let Some(verified) = loaded.verified {
            let label = if verified { "OK" } else { "MISMATCH" };
            println!("{:<10} {}", status(verified, label), snapshot.display());
        }
        for (name, check) in &results {
            println!("{:<10} {}", status(check.is_ok(), check.label()), name);
        }
        println!();
        println!("{} runs checked, {} problems", results.len(), failures);
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
