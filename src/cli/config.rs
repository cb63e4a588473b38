//! TOML configuration file support.
//!
//! Settings shared by several subcommands can live in a config file instead of
//! being repeated as flags; flags given on the command line win:
//!
//! ```toml
//! # msai.toml
//! [parallel]
//! mode = "auto"      # auto | enabled | disabled
//! workers = 8
//!
//! [catalog]
//! recursive = true
//! file_type = "all"  # all | raw | cached
//!
//! [collection]
//! inner_join = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use msai::catalog::TypeFilter;
use msai::parallel::ParallelConfig;

/// Root configuration structure for msai.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Worker settings for bulk operations.
    #[serde(default)]
    pub parallel: ParallelConfig,

    /// Directory scan settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Metadata join settings.
    #[serde(default)]
    pub collection: CollectionConfig,
}

/// Configuration for directory scans.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
    /// Search subdirectories.
    pub recursive: Option<bool>,

    /// File types to collect.
    pub file_type: Option<TypeFilter>,
}

/// Configuration for sample collections.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionConfig {
    /// Keep only samples present in every metadata table.
    pub inner_join: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
