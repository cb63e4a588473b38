//! # Sample metadata
//!
//! Tabular metadata describing the samples of an experiment: one row per
//! sample, arbitrary columns. Tables are imported from delimited text
//! (`.csv`, or tab-separated `.tsv` / SDRF-Proteomics `.sdrf` sheets) or from a
//! `.msAIm` snapshot written by
//! [`SampleCollection::save_metadata`](crate::collection::SampleCollection::save_metadata).
//!
//! ## Indexing
//!
//! A freshly imported table has a positional index. To be joined with run
//! files it needs a key column whose values name the samples. [`MetadataTable::auto_index`]
//! picks it when exactly one column is a total, strictly unique key:
//!
//! 1. Count distinct non-null values per column.
//! 2. Keep the column(s) with the highest count.
//! 3. Require a single candidate whose count equals the row count.
//!
//! When that fails the reason is logged and the positional index stays;
//! [`MetadataTable::set_index`] chooses the column explicitly.

mod delimited;
mod error;
mod record;
mod table;
mod value;


pub use error::MetadataError;
pub use record::MetadataRecord;
pub use table::{ColumnSummary, MetadataTable, TableIndex};
pub use value::{ColumnKind, Value};

pub(crate) use value::column_array;

/// Metadata column holding the SHA-256 digest of a sample's cached run
pub const CACHE_HASH_COLUMN: &str = "cache_hash";
