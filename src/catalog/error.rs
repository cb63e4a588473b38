use std::fmt;
use std::path::PathBuf;

/// A file that shares its name with at least one other discovered file
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateEntry {
    /// Shared base name
    pub name: String,
    /// Full path of this copy
    pub path: PathBuf,
}

impl fmt::Display for DuplicateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Errors raised while building a [`FileCatalog`](super::FileCatalog)
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The scan root is missing or is not a directory
    #[error("Not a directory: {0}")]
    InvalidDirectory(PathBuf),

    /// Directory traversal failed
    #[error("Failed to scan directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Two or more files share a base name
    #[error("Duplicated file names: {}", format_duplicates(.0))]
    DuplicateNames(Vec<DuplicateEntry>),
}

fn format_duplicates(entries: &[DuplicateEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
