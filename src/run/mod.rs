//! # Run handles
//!
//! A [`RunHandle`] is one sample's deferred access to its spectral data.
//! Creating a handle only records the path; the expensive step is the explicit
//! [`RunHandle::initialize`] call, which parses a raw file or reloads a cached
//! snapshot:
//!
//! ```text
//! new(path) ──▶ attach_metadata(record)* ──▶ initialize() ──▶ save(dir, name)
//!   no I/O          merge fields             parse / load       snapshot + hash
//! ```
//!
//! Calling `initialize` again reloads the payload from disk.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::catalog::{FileType, CACHED_RUN_EXTENSION};
use crate::metadata::{MetadataRecord, Value, CACHE_HASH_COLUMN};
use crate::spectra::{default_reader, RawReader, SpectralPayload};
use crate::store::{ContentStore, Loaded};

mod error;


pub use error::RunError;

/// Lazily materialized spectral data for one sample
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunHandle {
    path: PathBuf,
    payload: Option<SpectralPayload>,
    metadata: Option<MetadataRecord>,
}

impl RunHandle {
    /// Handle for the run file at `path`. Performs no I/O.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            payload: None,
            metadata: None,
        }
    }

    /// Path of the run file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The materialized payload, once initialized
    pub fn payload(&self) -> Option<&SpectralPayload> {
        self.payload.as_ref()
    }

    /// Take the payload out of the handle
    pub fn take_payload(&mut self) -> Option<SpectralPayload> {
        self.payload.take()
    }

    /// Attached metadata
    pub fn metadata(&self) -> Option<&MetadataRecord> {
        self.metadata.as_ref()
    }

    /// Whether a payload is loaded
    pub fn is_initialized(&self) -> bool {
        self.payload.is_some()
    }

    /// Digest recorded for this run's cache file, from the `cache_hash` metadata field
    pub fn cache_hash(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .get(CACHE_HASH_COLUMN)
            .and_then(Value::as_str)
    }

    /// Merge `record` into the handle's metadata; later fields overwrite earlier ones
    pub fn attach_metadata(&mut self, record: MetadataRecord) {
        match &mut self.metadata {
            Some(existing) => existing.merge(record),
            None => self.metadata = Some(record),
        }
    }

    /// Materialize the payload with the default raw reader
    pub fn initialize(&mut self) -> Result<(), RunError> {
        self.initialize_with(default_reader().as_ref())
    }

    /// Materialize the payload.
    ///
    /// Raw files are parsed with `reader`. Cached files are loaded and checked
    /// against [`cache_hash`](Self::cache_hash); a mismatch is logged and the
    /// loaded payload is still used.
    pub fn initialize_with(&mut self, reader: &dyn RawReader) -> Result<(), RunError> {
        let payload = match FileType::from_path(&self.path) {
            Some(FileType::Raw) => reader.read(&self.path).map_err(|source| RunError::Read {
                path: self.path.clone(),
                source,
            })?,
            Some(FileType::Cached) => {
                let loaded: Loaded<SpectralPayload> =
                    ContentStore::load(&self.path, self.cache_hash()).map_err(|source| {
                        RunError::Store {
                            path: self.path.clone(),
                            source,
                        }
                    })?;
                match loaded.verified {
                    None => info!("No cache hash recorded for {}; loaded unverified", self.path.display()),
                    Some(false) => warn!(
                        "Cache hash mismatch for {}; using loaded data anyway",
                        self.path.display()
                    ),
                    Some(true) => {}
                }
                loaded.value
            }
            None => return Err(RunError::UnsupportedExtension(self.path.clone())),
        };

        self.payload = Some(payload);
        Ok(())
    }

    /// Save the payload as `directory/filename.msAIr` and return its digest
    pub fn save<P: AsRef<Path>>(&self, directory: P, filename: &str) -> Result<String, RunError> {
        let payload = self
            .payload
            .as_ref()
            .ok_or_else(|| RunError::NotInitialized(self.path.clone()))?;

        let target = directory
            .as_ref()
            .join(format!("{}.{}", filename, CACHED_RUN_EXTENSION));
        ContentStore::save(payload, &target).map_err(|source| RunError::Store {
            path: target.clone(),
            source,
        })
    }
}
