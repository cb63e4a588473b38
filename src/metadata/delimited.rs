//! Delimited-text import with per-column type inference

use std::collections::{HashMap, HashSet};
use std::io::Read;

use super::error::MetadataError;
use super::value::{parse_cell, ColumnKind, Value};

/// Column names and typed rows parsed from delimited text
pub(crate) struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<Value>>>,
}

/// Parse header-plus-rows text separated by `delimiter`.
///
/// Empty cells become nulls, short rows are padded with nulls, and repeated
/// header names are suffixed `.1`, `.2`, ...
pub(crate) fn parse<R: Read>(reader: R, delimiter: u8) -> Result<ParsedTable, MetadataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let columns = dedup_headers(
        csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if h.is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    h.to_string()
                }
            })
            .collect(),
    );

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(MetadataError::InvalidFormat(format!(
                "row {} has {} fields but the header has {}",
                line + 1,
                record.len(),
                columns.len()
            )));
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect();
        row.resize(columns.len(), None);
        raw_rows.push(row);
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|col| infer_kind(raw_rows.iter().filter_map(|row| row[col].as_deref())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(cell, kind)| cell.and_then(|raw| parse_cell(&raw, *kind)))
                .collect()
        })
        .collect();

    Ok(ParsedTable { columns, rows })
}

/// Narrowest kind every cell parses as
fn infer_kind<'a, I>(cells: I) -> ColumnKind
where
    I: Iterator<Item = &'a str> + Clone,
{
    let mut cells = cells.peekable();
    if cells.peek().is_none() {
        return ColumnKind::Empty;
    }
    // Zero-padded identifiers such as sample numbers must keep their text
    if cells.clone().any(has_leading_zero) {
        return ColumnKind::Text;
    }

    [ColumnKind::Integer, ColumnKind::Float, ColumnKind::Boolean]
        .into_iter()
        .find(|kind| cells.clone().all(|cell| parse_cell(cell, *kind).is_some()))
        .unwrap_or(ColumnKind::Text)
}

/// Whether `cell` is a number written with a redundant leading zero, like `007`
fn has_leading_zero(cell: &str) -> bool {
    let digits = cell.strip_prefix(['+', '-']).unwrap_or(cell);
    let mut chars = digits.chars();
    matches!((chars.next(), chars.next()), (Some('0'), Some(c)) if c.is_ascii_digit())
}

/// Disambiguate repeated names as `name.1`, `name.2`, ...
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::with_capacity(headers.len());

    for header in headers {
        let mut name = header.clone();
        if taken.contains(&name) {
            let counter = counters.entry(header.clone()).or_insert(0);
            loop {
                *counter += 1;
                name = format!("{}.{}", header, counter);
                if !taken.contains(&name) {
                    break;
                }
            }
        }
        taken.insert(name.clone());
        result.push(name);
    }

    result
}
