use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use super::{CollectionError, CollectionOptions, SampleCollection, SampleRow, RESERVED_COLUMNS};
use crate::catalog::FileCatalog;
use crate::metadata::{MetadataRecord, MetadataTable};
use crate::run::RunHandle;
use crate::spectra::{default_reader, RawReader};
use crate::timing::log_finished;

/// Builder for [`SampleCollection`]
pub struct CollectionBuilder<'a> {
    catalog: FileCatalog,
    tables: Vec<&'a MetadataTable>,
    options: CollectionOptions,
    reader: Option<Arc<dyn RawReader>>,
}

/// A metadata table with its columns renamed to be unique in the collection
struct JoinedTable<'a> {
    table: &'a MetadataTable,
    renames: Vec<(String, String)>,
}

impl JoinedTable<'_> {
    /// `record` with its labels renamed to collection column names
    fn collection_record(&self, record: &MetadataRecord) -> MetadataRecord {
        record
            .iter()
            .map(|(label, value)| {
                let column = self
                    .renames
                    .iter()
                    .find(|(from, _)| from == label)
                    .map_or(label, |(_, renamed)| renamed.as_str());
                (column.to_string(), value.clone())
            })
            .collect()
    }
}

impl<'a> CollectionBuilder<'a> {
    /// Start a collection over `catalog`
    pub fn new(catalog: FileCatalog) -> Self {
        Self {
            catalog,
            tables: Vec::new(),
            options: CollectionOptions::default(),
            reader: None,
        }
    }

    /// Join one metadata table
    pub fn table(mut self, table: &'a MetadataTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Join several metadata tables, in order
    pub fn tables(mut self, tables: &'a [MetadataTable]) -> Self {
        self.tables.extend(tables);
        self
    }

    /// Set join and execution options
    pub fn options(mut self, options: CollectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `reader` for raw files instead of the default reader
    pub fn with_reader(mut self, reader: Arc<dyn RawReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Join the catalog with the metadata tables and create one run handle per sample
    pub fn build(self) -> Result<SampleCollection, CollectionError> {
        let start = Instant::now();
        let strategy = self.options.parallel.resolve();
        debug!("Building sample collection with {} execution", strategy);

        let (joined, metadata_columns) = plan_columns(&self.tables);

        let mut rows: Vec<SampleRow> = self
            .catalog
            .into_entries()
            .into_iter()
            .map(SampleRow::from_entry)
            .collect();

        if self.options.inner_join {
            rows.retain(|row| joined.iter().all(|j| j.table.contains_key(&row.name)));
        }

        let mut rows = strategy.apply(rows, |mut row| {
            row.run = RunHandle::new(&row.path);
            Ok::<_, Infallible>(row)
        })?;

        for joined_table in &joined {
            for row in &mut rows {
                match joined_table.table.record(&row.name) {
                    Some(record) => {
                        row.metadata.merge(joined_table.collection_record(&record));
                        row.run.attach_metadata(record);
                    }
                    None => warn!(
                        "Missing metadata from: {}, for sample: {}",
                        source_name(joined_table.table),
                        row.name
                    ),
                }
            }
        }

        let collection = SampleCollection {
            rows,
            metadata_columns,
            strategy,
            reader: self.reader.unwrap_or_else(default_reader),
        };
        log_finished("sample collection build", start, Some(&collection));
        Ok(collection)
    }
}

/// Assign collection column names to every table's value columns.
///
/// A name already used by the catalog columns or an earlier table gets the
/// table's 1-based ordinal as suffix.
fn plan_columns<'a>(tables: &[&'a MetadataTable]) -> (Vec<JoinedTable<'a>>, Vec<String>) {
    let mut taken: HashSet<String> = RESERVED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut columns = Vec::new();
    let mut joined = Vec::with_capacity(tables.len());

    for (i, &table) in tables.iter().enumerate() {
        let mut renames = Vec::new();
        for column in table.value_columns() {
            let mut name = column.to_string();
            if taken.contains(&name) {
                name = format!("{}_{}", column, i + 1);
                renames.push((column.to_string(), name.clone()));
            }
            taken.insert(name.clone());
            columns.push(name);
        }
        joined.push(JoinedTable { table, renames });
    }

    (joined, columns)
}

fn source_name(table: &MetadataTable) -> String {
    table
        .source()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| table.source().display().to_string())
}
