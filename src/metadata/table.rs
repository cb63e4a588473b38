use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::datatypes::{Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::pretty::pretty_format_batches;
use log::{error, warn};
use serde::{Deserialize, Serialize};

use super::delimited;
use super::error::MetadataError;
use super::record::MetadataRecord;
use super::value::{column_array, ColumnKind, Value};
use crate::catalog::{has_extension, METADATA_SNAPSHOT_EXTENSION};
use crate::store::{ContentStore, Loaded};
use crate::timing::{log_finished, Shaped};

/// How rows of a [`MetadataTable`] are identified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableIndex {
    /// Rows are only identified by position; no key lookups
    Positional,
    /// Rows are keyed by the values of this column
    Column(String),
}

/// Per-column summary produced by [`MetadataTable::describe`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    /// Column name
    pub column: String,
    /// Inferred value type
    pub kind: ColumnKind,
    /// Number of non-null cells
    pub non_null: usize,
    /// Number of distinct non-null values
    pub distinct: usize,
}

/// Tabular sample metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataTable {
    #[serde(skip)]
    source: PathBuf,
    index: TableIndex,
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
    #[serde(skip)]
    keys: HashMap<String, usize>,
}

impl MetadataTable {
    /// Import metadata from `path`.
    ///
    /// `.csv` files are comma separated; `.tsv` and `.sdrf` files are tab
    /// separated. Delimited sources are checked with [`verify`](Self::verify)
    /// and, when `auto_index` is set, indexed with
    /// [`auto_index`](Self::auto_index). `.msAIm` snapshots are loaded as saved,
    /// without a hash check.
    pub fn import<P: AsRef<Path>>(path: P, auto_index: bool) -> Result<Self, MetadataError> {
        let start = Instant::now();
        let path = path.as_ref();

        let table = if has_extension(path, METADATA_SNAPSHOT_EXTENSION) {
            Self::import_snapshot(path, None)?.value
        } else {
            let delimiter = delimiter_for(path)
                .ok_or_else(|| MetadataError::UnsupportedExtension(path.to_path_buf()))?;
            let file = File::open(path)?;
            let mut table = Self::from_reader(BufReader::new(file), delimiter, path)?;
            table.verify()?;
            if auto_index {
                table.auto_index();
            }
            table
        };

        log_finished("metadata import", start, Some(&table));
        Ok(table)
    }

    /// Parse delimited text with a positional index
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        source: impl Into<PathBuf>,
    ) -> Result<Self, MetadataError> {
        let parsed = delimited::parse(reader, delimiter)?;
        Ok(Self::from_parts(source, parsed.columns, parsed.rows))
    }

    /// Load a `.msAIm` snapshot, checking it against `expected_hash` when given.
    ///
    /// A digest mismatch is logged as a warning; the table is still returned.
    pub fn import_snapshot<P: AsRef<Path>>(
        path: P,
        expected_hash: Option<&str>,
    ) -> Result<Loaded<Self>, MetadataError> {
        let path = path.as_ref();
        let mut loaded: Loaded<Self> = ContentStore::load(path, expected_hash)?;
        if loaded.verified == Some(false) {
            warn!("Metadata snapshot {} does not match its recorded hash", path.display());
        }
        loaded.value.source = path.to_path_buf();
        loaded.value.rebuild_keys();
        Ok(loaded)
    }

    /// Save this table as a snapshot, returning its hash
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<String, MetadataError> {
        Ok(ContentStore::save(self, path)?)
    }

    pub(crate) fn from_parts(
        source: impl Into<PathBuf>,
        columns: Vec<String>,
        rows: Vec<Vec<Option<Value>>>,
    ) -> Self {
        Self {
            source: source.into(),
            index: TableIndex::Positional,
            columns,
            rows,
            keys: HashMap::new(),
        }
    }

    /// Check the table has at least one row and at least two columns
    pub fn verify(&self) -> Result<(), MetadataError> {
        if self.rows.is_empty() {
            return Err(MetadataError::Verify("No metadata entries found".to_string()));
        }
        if self.columns.len() < 2 {
            return Err(MetadataError::Verify(format!(
                "Not enough metadata labels: {} labels found",
                self.columns.len()
            )));
        }
        Ok(())
    }

    /// Index by the single column that uniquely identifies every row.
    ///
    /// The column with the most distinct values is chosen; it must be the only
    /// column with that count and must have a distinct value in every row.
    /// Otherwise the reason is logged and the positional index is kept.
    /// Returns whether an index was set.
    pub fn auto_index(&mut self) -> bool {
        match self.unique_key_candidate() {
            Ok(column) => match self.set_index(&column) {
                Ok(()) => true,
                Err(e) => {
                    error!("Can not auto index metadata {}: {}", self.source.display(), e);
                    false
                }
            },
            Err(reason) => {
                error!("Can not auto index metadata {}: {}", self.source.display(), reason);
                false
            }
        }
    }

    fn unique_key_candidate(&self) -> Result<String, String> {
        let counts: Vec<usize> = (0..self.columns.len())
            .map(|col| self.distinct_count(col))
            .collect();
        let max = counts.iter().copied().max().unwrap_or(0);
        let candidates: Vec<&String> = self
            .columns
            .iter()
            .zip(&counts)
            .filter(|(_, count)| **count == max)
            .map(|(column, _)| column)
            .collect();

        if max != self.rows.len() {
            return Err(format!(
                "Count of unique metadata labels (n={}) not equal to entry count (n={})",
                max,
                self.rows.len()
            ));
        }
        if candidates.len() != 1 {
            return Err(format!(
                "{} labels possible for use as index",
                candidates.len()
            ));
        }
        Ok(candidates[0].clone())
    }

    /// Index by `column`.
    ///
    /// Fails if the column does not exist, has a null, or repeats a value.
    pub fn set_index(&mut self, column: &str) -> Result<(), MetadataError> {
        let col = self
            .column_position(column)
            .ok_or_else(|| MetadataError::Index(format!("no column named {:?}", column)))?;

        let mut keys = HashMap::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let key = row[col]
                .as_ref()
                .ok_or_else(|| {
                    MetadataError::Index(format!("column {:?} is null in row {}", column, row_idx))
                })?
                .to_string();
            if keys.insert(key.clone(), row_idx).is_some() {
                return Err(MetadataError::Index(format!(
                    "column {:?} has duplicate value {:?}",
                    column, key
                )));
            }
        }

        self.index = TableIndex::Column(column.to_string());
        self.keys = keys;
        Ok(())
    }

    fn rebuild_keys(&mut self) {
        self.keys.clear();
        if let Some(col) = self.index_column().and_then(|c| self.column_position(c)) {
            for (row_idx, row) in self.rows.iter().enumerate() {
                if let Some(value) = &row[col] {
                    self.keys.insert(value.to_string(), row_idx);
                }
            }
        }
    }

    /// File the table was imported from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Current index
    pub fn index(&self) -> &TableIndex {
        &self.index
    }

    /// Name of the index column, if indexed
    pub fn index_column(&self) -> Option<&str> {
        match &self.index {
            TableIndex::Column(name) => Some(name),
            TableIndex::Positional => None,
        }
    }

    /// All column names, index column included
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns carried into records (everything except the index column)
    pub fn value_columns(&self) -> impl Iterator<Item = &str> {
        let index = self.index_column();
        self.columns
            .iter()
            .map(String::as_str)
            .filter(move |c| Some(*c) != index)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, top to bottom
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = Option<&Value>>> {
        let col = self.column_position(column)?;
        Some(self.rows.iter().map(move |row| row[col].as_ref()))
    }

    /// Index keys in row order; empty for positional tables
    pub fn keys(&self) -> Vec<String> {
        let mut keyed: Vec<(&String, &usize)> = self.keys.iter().collect();
        keyed.sort_by_key(|(_, row)| **row);
        keyed.into_iter().map(|(key, _)| key.clone()).collect()
    }

    /// Whether `key` is an index key of this table
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Record for index value `key`. Positional tables have no keys.
    pub fn record(&self, key: &str) -> Option<MetadataRecord> {
        let row_idx = *self.keys.get(key)?;
        let index = self.index_column();
        Some(
            self.columns
                .iter()
                .zip(&self.rows[row_idx])
                .filter(|(column, _)| Some(column.as_str()) != index)
                .filter_map(|(column, cell)| cell.clone().map(|value| (column.clone(), value)))
                .collect(),
        )
    }

    /// Per-column type, non-null and distinct counts
    pub fn describe(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .enumerate()
            .map(|(col, column)| ColumnSummary {
                column: column.clone(),
                kind: ColumnKind::of(self.rows.iter().map(|row| row[col].as_ref())),
                non_null: self.rows.iter().filter(|row| row[col].is_some()).count(),
                distinct: self.distinct_count(col),
            })
            .collect()
    }

    /// The table as an Arrow record batch
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays = Vec::with_capacity(self.columns.len());

        for (col, column) in self.columns.iter().enumerate() {
            let kind = ColumnKind::of(self.rows.iter().map(|row| row[col].as_ref()));
            fields.push(Field::new(column, kind.data_type(), true));
            arrays.push(column_array(kind, self.rows.iter().map(|row| row[col].as_ref())));
        }

        RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &RecordBatchOptions::new().with_row_count(Some(self.rows.len())),
        )
    }

    fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    fn distinct_count(&self, col: usize) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row[col].as_ref().map(Value::distinct_key))
            .collect::<HashSet<_>>()
            .len()
    }
}

impl Shaped for MetadataTable {
    fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }
}

impl fmt::Display for MetadataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let batch = self.to_record_batch().map_err(|_| fmt::Error)?;
        let table = pretty_format_batches(&[batch]).map_err(|_| fmt::Error)?;
        write!(f, "{}", table)
    }
}

/// Delimiter for a delimited-text metadata file, by extension
fn delimiter_for(path: &Path) -> Option<u8> {
    if has_extension(path, "csv") {
        Some(b',')
    } else if has_extension(path, "tsv") || has_extension(path, "sdrf") {
        Some(b'\t')
    } else {
        None
    }
}
