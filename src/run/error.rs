use std::path::PathBuf;

use crate::spectra::RawReadError;
use crate::store::StoreError;

/// Errors raised by [`RunHandle`](super::RunHandle)
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The file is neither a raw nor a cached run
    #[error("Cannot initialize {0}: unsupported file extension")]
    UnsupportedExtension(PathBuf),

    /// The raw file could not be parsed
    #[error("Failed to read raw file {path}: {source}")]
    Read {
        /// Raw file path
        path: PathBuf,
        /// Reader failure
        #[source]
        source: RawReadError,
    },

    /// The cached run could not be loaded or saved
    #[error("Cache error for {path}: {source}")]
    Store {
        /// Cache file path
        path: PathBuf,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// `save` was called before `initialize`
    #[error("Run {0} has not been initialized")]
    NotInitialized(PathBuf),
}
