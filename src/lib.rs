//! # msai - Sample Collections for Mass Spectrometry Runs
//!
//! `msai` pairs a directory of mass spectrometry run files with tabular sample
//! metadata, materializes the spectral data of each run on demand, and caches
//! the result as compressed, content-addressed snapshots for fast reloading.
//!
//! ## Key Features
//!
//! - **File catalogs**: Directory scans for raw (`.mzML`) and cached
//!   (`.msAIr`) runs, keyed by unique sample name.
//!
//! - **Metadata tables**: CSV, TSV and SDRF import with per-column type
//!   inference and automatic selection of an identifying index column.
//!
//! - **Lazy runs**: Each sample's spectra are parsed or reloaded only on an
//!   explicit `initialize` call.
//!
//! - **Verified caching**: Snapshots are bzip2-compressed and identified by the
//!   SHA-256 digest of the file, checked again on reload.
//!
//! - **Parallel bulk operations**: Initialization and saving run on a worker
//!   pool, one contiguous partition of samples per worker.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use msai::prelude::*;
//!
//! let catalog = FileCatalog::build("runs/", TypeFilter::Raw, true)?;
//! let samples = MetadataTable::import("samples.csv", true)?;
//!
//! let mut collection =
//!     SampleCollection::build(catalog, &[samples], CollectionOptions::default())?;
//! collection.initialize_all()?;
//! collection.save_all("cache/")?;
//! let hash = collection.save_metadata("cache/", "study")?;
//!
//! // Later: reload from the cache instead of parsing mzML again
//! let catalog = FileCatalog::build("cache/", TypeFilter::Cached, false)?;
//! let snapshot = MetadataTable::import("cache/study.msAIm", false)?;
//! let mut reloaded =
//!     SampleCollection::build(catalog, &[snapshot], CollectionOptions::default())?;
//! reloaded.initialize_all()?;
//! println!("{}\n{}", reloaded, hash);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! This produces a cache directory like:
//! ```text
//! cache/
//! ├── S1.msAIr        # one compressed SpectralPayload per sample
//! ├── S2.msAIr
//! └── study.msAIm     # metadata + cache_hash per sample
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`]: directory scans and unique sample names
//! - [`metadata`]: metadata tables, records and index selection
//! - [`run`]: lazily materialized runs
//! - [`collection`]: catalog/metadata joins and bulk operations
//! - [`parallel`]: ordered parallel row mapping
//! - [`store`]: compressed, hash-verified snapshots
//! - [`spectra`]: the in-memory spectral payload and raw readers
//! - [`mzml`]: streaming mzML parser
//! - [`timing`]: elapsed-time logging

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod collection;
pub mod metadata;
#[cfg(feature = "mzml")]
pub mod mzml;
pub mod parallel;
pub mod run;
pub mod spectra;
pub mod store;
pub mod timing;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::catalog::{CatalogEntry, FileCatalog, FileType, TypeFilter};
    pub use crate::collection::{CollectionError, CollectionOptions, SampleCollection, SampleRow};
    pub use crate::metadata::{MetadataRecord, MetadataTable, TableIndex, Value};
    pub use crate::parallel::{map_rows, ExecutionStrategy, ParallelConfig, ParallelMode};
    pub use crate::run::{RunError, RunHandle};
    pub use crate::spectra::{default_reader, RawReader, SpectralPayload};
    pub use crate::store::{ContentStore, Loaded};
    pub use crate::timing::Shaped;
}
