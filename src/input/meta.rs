use std::collections::HashMap;

use crate::input::RawTable;

/// Clinical table keyed by its identifier column. Rows with a blank id are
/// dropped; a repeated id keeps its first position but takes the later row.
#[derive(Debug, Clone)]
pub struct ClinicalIndex {
    pub id_column: String,
    pub columns: Vec<String>,
    /// Identifiers in file order, parallel to `rows`.
    pub ids: Vec<String>,
    pub rows: Vec<Vec<String>>,
    by_id: HashMap<String, usize>,
}

/// First entry of `candidates` that names a column of `columns`.
pub fn find_id_column<'a>(columns: &[String], candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|candidate| columns.iter().any(|c| c == *candidate))
        .map(String::as_str)
}

impl ClinicalIndex {
    pub fn build(table: &RawTable, candidates: &[String]) -> Option<Self> {
        let id_column = find_id_column(&table.columns, candidates)?.to_string();
        let id_idx = table.column_position(&id_column)?;

        let mut ids = Vec::new();
        let mut rows = Vec::new();
        let mut by_id = HashMap::new();

        for row_idx in 0..table.n_rows() {
            let id = table.cell(row_idx, id_idx).trim();
            if id.is_empty() {
                tracing::warn!(row = row_idx + 1, "clinical row has empty identifier; skipping");
                continue;
            }
            if let Some(&position) = by_id.get(id) {
                tracing::warn!(
                    row = row_idx + 1,
                    id,
                    "duplicate identifier in clinical data; keeping last"
                );
                rows[position] = table.rows[row_idx].clone();
                continue;
            }
            by_id.insert(id.to_string(), ids.len());
            ids.push(id.to_string());
            rows.push(table.rows[row_idx].clone());
        }

        Some(Self {
            id_column,
            columns: table.columns.clone(),
            ids,
            rows,
            by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }
}
