//! # File catalog
//!
//! Discovers run files under a directory. Raw files (`.mzML`) and cached run
//! snapshots (`.msAIr`) are recognised, with extensions compared
//! case-insensitively. Each file is keyed by its base name, which must be
//! unique across the whole catalog, raw and cached alike.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

mod error;


pub use error::{CatalogError, DuplicateEntry};

/// Extension of raw instrument files
pub const RAW_EXTENSION: &str = "mzML";

/// Extension of cached run snapshots
pub const CACHED_RUN_EXTENSION: &str = "msAIr";

/// Extension of metadata snapshots
pub const METADATA_SNAPSHOT_EXTENSION: &str = "msAIm";

/// Bytes per MB used for catalog sizes
const BYTES_PER_MB: f64 = 1_000_000.0;

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Normalized type of a run file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Raw instrument file
    Raw,
    /// Cached run snapshot
    Cached,
}

impl FileType {
    /// Classify a path by its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        if has_extension(path, RAW_EXTENSION) {
            Some(FileType::Raw)
        } else if has_extension(path, CACHED_RUN_EXTENSION) {
            Some(FileType::Cached)
        } else {
            None
        }
    }

    /// Canonical extension for this type
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Raw => RAW_EXTENSION,
            FileType::Cached => CACHED_RUN_EXTENSION,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which file types a scan collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    /// Raw and cached files
    #[default]
    All,
    /// Raw files only
    Raw,
    /// Cached files only
    Cached,
}

impl TypeFilter {
    /// Whether `file_type` passes this filter
    pub fn accepts(&self, file_type: FileType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Raw => file_type == FileType::Raw,
            TypeFilter::Cached => file_type == FileType::Cached,
        }
    }
}

/// One discovered run file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// File name without extension; unique within a catalog
    pub name: String,
    /// Normalized file type
    pub file_type: FileType,
    /// File size in MB
    pub size_mb: f64,
    /// Full path
    pub path: PathBuf,
}

/// Run files discovered under a directory, ordered by path
#[derive(Debug, Clone, PartialEq)]
pub struct FileCatalog {
    root: PathBuf,
    entries: Vec<CatalogEntry>,
}

impl FileCatalog {
    /// Scan `directory` for run files.
    ///
    /// Subdirectories are searched when `recursive` is set. Fails with
    /// [`CatalogError::DuplicateNames`] if any base name occurs more than once,
    /// listing every colliding file.
    pub fn build<P: AsRef<Path>>(
        directory: P,
        type_filter: TypeFilter,
        recursive: bool,
    ) -> Result<Self, CatalogError> {
        let root = directory.as_ref();
        if !root.is_dir() {
            return Err(CatalogError::InvalidDirectory(root.to_path_buf()));
        }

        let mut walker = WalkDir::new(root).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(file_type) = FileType::from_path(path) else {
                continue;
            };
            if !type_filter.accepts(file_type) {
                continue;
            }

            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let size_mb = entry.metadata()?.len() as f64 / BYTES_PER_MB;

            entries.push(CatalogEntry {
                name,
                file_type,
                size_mb,
                path: path.to_path_buf(),
            });
        }

        check_unique_names(&entries)?;
        debug!("Catalogued {} files under {}", entries.len(), root.display());

        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    /// Build a catalog from entries discovered elsewhere
    pub fn from_entries<P: Into<PathBuf>>(
        root: P,
        entries: Vec<CatalogEntry>,
    ) -> Result<Self, CatalogError> {
        check_unique_names(&entries)?;
        Ok(Self {
            root: root.into(),
            entries,
        })
    }

    /// Directory the catalog was built from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discovered files
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no files were found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the catalog, yielding its entries
    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries
    }
}

fn check_unique_names(entries: &[CatalogEntry]) -> Result<(), CatalogError> {
    let mut by_name: BTreeMap<&str, Vec<&CatalogEntry>> = BTreeMap::new();
    for entry in entries {
        by_name.entry(entry.name.as_str()).or_default().push(entry);
    }

    let duplicates: Vec<DuplicateEntry> = by_name
        .into_values()
        .filter(|group| group.len() > 1)
        .flatten()
        .map(|entry| DuplicateEntry {
            name: entry.name.clone(),
            path: entry.path.clone(),
        })
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::DuplicateNames(duplicates))
    }
}
