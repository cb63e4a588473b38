//! # Spectral payloads
//!
//! A [`SpectralPayload`] is the fully materialized content of one run: a
//! per-spectrum summary table, a long per-peak table, and a handful of run-level
//! scalars. Payloads are produced by a [`RawReader`] from an instrument file or
//! reloaded from a cached snapshot, and are owned by exactly one
//! [`RunHandle`](crate::run::RunHandle).
//!
//! ## Tables
//!
//! | Table | Key | Columns |
//! |-------|-----|---------|
//! | spectra | spectrum_id | retention_time (min), peak_count, tic, ms_level, filter_string |
//! | peaks | (spectrum_id, peak_index) | retention_time (min), mz, intensity |
//!
//! m/z values are rounded to 5 decimals when a payload is built.

mod arrow;
mod builder;
mod error;
mod payload;
mod reader;


pub use self::arrow::{peaks_schema, spectra_schema};
pub use builder::{PayloadBuilder, Scan, ScanBuilder};
pub use error::RawReadError;
pub use payload::{PeakRow, SpectralPayload, SpectrumRow};
#[cfg(feature = "mzml")]
pub use reader::MzMLReader;
pub use reader::{default_reader, RawReader};
