//! CSV record source shared by the GeoJSON and budget pipelines

use crate::error::{IngestError, Result};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// One data row of a CSV file, keyed by the header row
#[derive(Debug, Clone)]
pub struct CsvRow {
    /// 1-based data row number (the header is row 0)
    pub number: usize,
    fields: Vec<(String, String)>,
}

impl CsvRow {
    pub fn new(number: usize, fields: Vec<(String, String)>) -> Self {
        Self { number, fields }
    }

    /// Value of `column`, or [`IngestError::MissingColumn`]
    pub fn get(&self, column: &str) -> Result<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| IngestError::MissingColumn {
                row: self.number,
                column: column.to_string(),
            })
    }

    /// Parse `column` with [`parse_value`]; empty cells become `None`
    pub fn parse<T: FromStr>(&self, column: &str) -> Result<Option<T>> {
        let raw = self.get(column)?;
        parse_value(raw).ok_or_else(|| IngestError::InvalidValue {
            row: self.number,
            column: column.to_string(),
            value: raw.to_string(),
        })
    }

    /// Columns in header order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a cell: `Some(None)` when empty, `None` when unparseable
pub fn parse_value<T: FromStr>(raw: &str) -> Option<Option<T>> {
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse().ok().map(Some)
}

/// Read all rows of a comma-separated file with a header row
pub fn read_rows(path: &Path) -> Result<Vec<CsvRow>> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    read_rows_from(file)
}

/// Rows may be shorter or longer than the header. Missing trailing cells
/// surface as [`IngestError::MissingColumn`] when read; extra cells are dropped.
pub fn read_rows_from<R: std::io::Read>(reader: R) -> Result<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(CsvRow::new(index + 1, fields));
    }

    Ok(rows)
}
