//! # Sample collections
//!
//! A [`SampleCollection`] pairs every file of a [`FileCatalog`] with its rows
//! from zero or more [`MetadataTable`]s, keyed by sample name, and runs bulk
//! operations over the resulting [`RunHandle`]s:
//!
//! ```text
//! FileCatalog ──┐
//!               ├──▶ join on name ──▶ SampleRow { entry, run, metadata }
//! MetadataTable*┘                          │
//!                    ┌─────────────────────┼──────────────────────┐
//!                    ▼                     ▼                      ▼
//!             initialize_all()       save_all(dir)      save_metadata(dir, name)
//!              parse / reload      *.msAIr + cache_hash       name.msAIm
//! ```
//!
//! Bulk operations run sequentially or on a worker pool, as resolved from
//! [`CollectionOptions::parallel`]. Each row is moved into exactly one worker.
//!
//! ## Joins
//!
//! A left join (the default) keeps every catalog file; samples missing from a
//! table get no values for its columns and a warning is logged. An inner join
//! keeps only the samples present in every table, in catalog order.
//!
//! A metadata column whose name is already used, by the catalog columns or by
//! an earlier table, is renamed with the table's 1-based ordinal as suffix
//! (`group` from the second table becomes `group_2`). Run handles receive each
//! table's record under the table's own labels.
//!
//! ## Example
//!
//! ```rust,no_run
//! use msai::catalog::{FileCatalog, TypeFilter};
//! use msai::collection::{CollectionOptions, SampleCollection};
//! use msai::metadata::MetadataTable;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = FileCatalog::build("runs/", TypeFilter::Raw, true)?;
//! let samples = MetadataTable::import("samples.csv", true)?;
//!
//! let mut collection =
//!     SampleCollection::build(catalog, &[samples], CollectionOptions::default())?;
//! collection.initialize_all()?;
//! collection.save_all("cache/")?;
//! let hash = collection.save_metadata("cache/", "study")?;
//! println!("{}\n{}", collection, hash);
//! # Ok(())
//! # }
//! ```

use std::convert::Infallible;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::pretty::pretty_format_batches;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, FileCatalog, FileType, METADATA_SNAPSHOT_EXTENSION};
use crate::metadata::{
    column_array, ColumnKind, MetadataRecord, MetadataTable, Value, CACHE_HASH_COLUMN,
};
use crate::parallel::{ExecutionStrategy, ParallelConfig};
use crate::run::{RunError, RunHandle};
use crate::spectra::RawReader;
use crate::timing::{log_finished, Shaped};

mod builder;
mod error;

#[cfg(test)]
mod tests;

pub use builder::CollectionBuilder;
pub use error::CollectionError;

/// Column holding the sample name in collection tables and metadata snapshots
pub const NAME_COLUMN: &str = "name";

/// Columns contributed by the catalog and run state; metadata columns never reuse them
pub const RESERVED_COLUMNS: [&str; 5] = [NAME_COLUMN, "file_type", "size_mb", "path", "initialized"];

/// How a [`SampleCollection`] is joined and executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionOptions {
    /// Keep only samples found in every metadata table
    #[serde(default)]
    pub inner_join: bool,

    /// Worker configuration for bulk operations
    #[serde(default)]
    pub parallel: ParallelConfig,
}

/// One sample: its catalog entry, run handle and joined metadata
#[derive(Debug, Clone)]
pub struct SampleRow {
    /// Sample name (file name without extension)
    pub name: String,
    /// Type of the run file
    pub file_type: FileType,
    /// Run file size in MB
    pub size_mb: f64,
    /// Run file path
    pub path: PathBuf,
    /// Deferred access to the spectral data
    pub run: RunHandle,
    /// Metadata under collection column names; samples without metadata have no fields
    pub metadata: MetadataRecord,
}

impl SampleRow {
    fn from_entry(entry: CatalogEntry) -> Self {
        Self {
            name: entry.name,
            file_type: entry.file_type,
            size_mb: entry.size_mb,
            path: entry.path,
            run: RunHandle::default(),
            metadata: MetadataRecord::new(),
        }
    }
}

/// A row moved through a worker along with the outcome of its operation
struct Job<T> {
    row: SampleRow,
    outcome: Option<Result<T, RunError>>,
}

/// Run files joined with sample metadata
pub struct SampleCollection {
    rows: Vec<SampleRow>,
    metadata_columns: Vec<String>,
    strategy: ExecutionStrategy,
    reader: Arc<dyn RawReader>,
}

impl SampleCollection {
    /// Join `catalog` with `tables` and create a run handle per sample
    pub fn build(
        catalog: FileCatalog,
        tables: &[MetadataTable],
        options: CollectionOptions,
    ) -> Result<Self, CollectionError> {
        Self::builder(catalog).tables(tables).options(options).build()
    }

    /// Builder for a collection over `catalog`
    pub fn builder<'a>(catalog: FileCatalog) -> CollectionBuilder<'a> {
        CollectionBuilder::new(catalog)
    }

    /// Samples in catalog order
    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    /// Sample by name
    pub fn get(&self, name: &str) -> Option<&SampleRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the collection has no samples
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metadata column names, in join order
    pub fn metadata_columns(&self) -> &[String] {
        &self.metadata_columns
    }

    /// Resolved execution strategy for bulk operations
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Materialize every run.
    ///
    /// Raw files are parsed with the collection's reader; cached files are
    /// loaded and checked against their `cache_hash` metadata. If any run
    /// fails, no row is changed.
    pub fn initialize_all(&mut self) -> Result<(), CollectionError> {
        let reader = Arc::clone(&self.reader);
        self.run_bulk(
            "initialize_all",
            |row| {
                let mut run = RunHandle::new(row.run.path());
                if let Some(metadata) = row.run.metadata() {
                    run.attach_metadata(metadata.clone());
                }
                run.initialize_with(reader.as_ref())?;
                Ok(run)
            },
            |row, run| row.run = run,
        )
    }

    /// Save every run as `directory/<name>.msAIr`, recording each digest in
    /// the `cache_hash` column.
    ///
    /// Digests are recorded only once every run has been saved; if any run
    /// fails, no row or column is changed.
    pub fn save_all<P: AsRef<Path>>(&mut self, directory: P) -> Result<(), CollectionError> {
        let directory = directory.as_ref();
        self.run_bulk(
            "save_all",
            |row| row.run.save(directory, &row.name),
            |row, hash| {
                let cache_hash: MetadataRecord =
                    [(CACHE_HASH_COLUMN, Value::from(hash))].into_iter().collect();
                row.metadata.merge(cache_hash.clone());
                row.run.attach_metadata(cache_hash);
            },
        )?;

        if !self.metadata_columns.iter().any(|c| c == CACHE_HASH_COLUMN) {
            self.metadata_columns.push(CACHE_HASH_COLUMN.to_string());
        }
        Ok(())
    }

    /// Save the metadata columns, indexed by sample name, as
    /// `directory/filename.msAIm` and return the snapshot digest
    pub fn save_metadata<P: AsRef<Path>>(
        &self,
        directory: P,
        filename: &str,
    ) -> Result<String, CollectionError> {
        let start = Instant::now();
        let target = directory
            .as_ref()
            .join(format!("{}.{}", filename, METADATA_SNAPSHOT_EXTENSION));

        let mut columns = Vec::with_capacity(self.metadata_columns.len() + 1);
        columns.push(NAME_COLUMN.to_string());
        columns.extend(self.metadata_columns.iter().cloned());

        let rows = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(Some(Value::from(row.name.as_str())))
                    .chain(self.metadata_columns.iter().map(|c| row.metadata.get(c).cloned()))
                    .collect()
            })
            .collect();

        let mut table = MetadataTable::from_parts(&target, columns, rows);
        if !table.is_empty() {
            table.set_index(NAME_COLUMN)?;
        }
        let hash = table.save_snapshot(&target)?;

        log_finished("save_metadata", start, Some(&table));
        Ok(hash)
    }

    /// The collection as an Arrow record batch: catalog columns, metadata
    /// columns, then whether each run is initialized
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let mut fields = vec![
            Field::new(NAME_COLUMN, DataType::Utf8, false),
            Field::new("file_type", DataType::Utf8, false),
            Field::new("size_mb", DataType::Float64, false),
            Field::new("path", DataType::Utf8, false),
        ];

        let mut names = StringBuilder::new();
        let mut types = StringBuilder::new();
        let mut sizes = Float64Builder::new();
        let mut paths = StringBuilder::new();
        let mut initialized = BooleanBuilder::new();
        for row in &self.rows {
            names.append_value(&row.name);
            types.append_value(row.file_type.to_string());
            sizes.append_value(row.size_mb);
            paths.append_value(row.path.display().to_string());
            initialized.append_value(row.run.is_initialized());
        }

        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(names.finish()),
            Arc::new(types.finish()),
            Arc::new(sizes.finish()),
            Arc::new(paths.finish()),
        ];

        for column in &self.metadata_columns {
            let values = || self.rows.iter().map(|row| row.metadata.get(column));
            let kind = ColumnKind::of(values());
            fields.push(Field::new(column, kind.data_type(), true));
            arrays.push(column_array(kind, values()));
        }

        fields.push(Field::new("initialized", DataType::Boolean, false));
        arrays.push(Arc::new(initialized.finish()));

        RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &RecordBatchOptions::new().with_row_count(Some(self.rows.len())),
        )
    }

    /// Apply `op` to every row with the resolved strategy, then `commit` each
    /// result to its row.
    ///
    /// Nothing is committed unless every row succeeds. On failure the rows are
    /// restored unchanged and in order, and the first failing row in catalog
    /// order is reported.
    fn run_bulk<T, F, C>(
        &mut self,
        operation: &'static str,
        op: F,
        mut commit: C,
    ) -> Result<(), CollectionError>
    where
        T: Send,
        F: Fn(&SampleRow) -> Result<T, RunError> + Sync,
        C: FnMut(&mut SampleRow, T),
    {
        let start = Instant::now();
        let jobs: Vec<Job<T>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| Job { row, outcome: None })
            .collect();

        let jobs = self.strategy.apply(jobs, |mut job| {
            job.outcome = Some(op(&job.row));
            Ok::<_, Infallible>(job)
        })?;

        let mut results = Vec::with_capacity(jobs.len());
        let mut failure = None;
        for job in jobs {
            match job.outcome {
                Some(Ok(value)) => results.push(Some(value)),
                Some(Err(source)) => {
                    if failure.is_none() {
                        failure = Some(CollectionError::Run {
                            operation,
                            sample: job.row.name.clone(),
                            source,
                        });
                    }
                    results.push(None);
                }
                None => results.push(None),
            }
            self.rows.push(job.row);
        }

        if let Some(err) = failure {
            return Err(err);
        }

        for (row, value) in self.rows.iter_mut().zip(results) {
            if let Some(value) = value {
                commit(row, value);
            }
        }
        log_finished(operation, start, Some(&*self));
        Ok(())
    }
}

impl Shaped for SampleCollection {
    fn shape(&self) -> (usize, usize) {
        (self.rows.len(), RESERVED_COLUMNS.len() + self.metadata_columns.len())
    }
}

impl fmt::Debug for SampleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleCollection")
            .field("rows", &self.rows)
            .field("metadata_columns", &self.metadata_columns)
            .field("strategy", &self.strategy)
            .field("reader", &self.reader.format_name())
            .finish()
    }
}

impl fmt::Display for SampleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = self.to_record_batch().map_err(|_| fmt::Error)?;
        let table = pretty_format_batches(&[batch]).map_err(|_| fmt::Error)?;
        write!(f, "{}", table)
    }
}
