use std::path::Path;

use crate::input::InputError;
use crate::input::reader::{delimiter_for, open_maybe_gz};

/// In-memory delimited table. Cells are kept as trimmed strings; numeric
/// coercion happens where a cell is consumed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    /// Explicit row labels once a column has been promoted to the index.
    pub index: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns,
            index: None,
            rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn column_values(&self, col: usize) -> Vec<&str> {
        (0..self.rows.len()).map(|row| self.cell(row, col)).collect()
    }

    /// Promotes column `col` to the row index. A table that already has an
    /// index is returned unchanged.
    pub fn with_index(mut self, col: usize) -> Self {
        if self.index.is_some() || col >= self.columns.len() {
            return self;
        }
        self.columns.remove(col);
        let mut index = Vec::with_capacity(self.rows.len());
        for row in &mut self.rows {
            if col < row.len() {
                index.push(row.remove(col));
            } else {
                index.push(String::new());
            }
        }
        self.index = Some(index);
        self
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads a delimited (optionally gzip-compressed) table. With `row_cap` only
/// that many data rows are materialized.
pub fn load_table(path: &Path, row_cap: Option<usize>) -> Result<RawTable, InputError> {
    let source = open_maybe_gz(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let columns: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(InputError::Parse(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        if row_cap.is_some_and(|cap| rows.len() >= cap) {
            break;
        }
        let record = record?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        if record.len() > columns.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(InputError::Parse(format!(
                "{} line {} has {} fields, header has {}",
                path.display(),
                line,
                record.len(),
                columns.len()
            )));
        }
        let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        n_rows = rows.len(),
        n_columns = columns.len(),
        capped = row_cap.is_some(),
        "table loaded"
    );

    Ok(RawTable::new(columns, rows))
}
