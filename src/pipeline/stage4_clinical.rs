use serde::Serialize;

use crate::input::meta::ClinicalIndex;
use crate::input::{RawTable, coerce_cell};
use crate::model::record::{ClinicalData, PatientRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClinicalMatch {
    Exact(usize),
    /// One id contains the other. `ambiguous` is set when a later clinical
    /// row would also have matched.
    Containment { row: usize, ambiguous: bool },
}

impl ClinicalMatch {
    pub fn row(&self) -> usize {
        match self {
            ClinicalMatch::Exact(row) => *row,
            ClinicalMatch::Containment { row, .. } => *row,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// `None` when no identifier column was found and the merge was skipped.
    pub id_column: Option<String>,
    pub clinical_rows: usize,
    pub matched_exact: usize,
    pub matched_containment: usize,
    pub ambiguous_containment: usize,
    pub unmatched: usize,
}

impl MergeSummary {
    pub fn skipped(&self) -> bool {
        self.id_column.is_none()
    }
}

/// Exact id first, then the first clinical row (file order) whose id
/// contains or is contained in the patient id.
pub fn find_clinical_match(index: &ClinicalIndex, patient_id: &str) -> Option<ClinicalMatch> {
    if let Some(row) = index.position_of(patient_id) {
        return Some(ClinicalMatch::Exact(row));
    }
    let mut candidates = index
        .ids
        .iter()
        .enumerate()
        .filter(|(_, clin_id)| {
            patient_id.contains(clin_id.as_str()) || clin_id.contains(patient_id)
        })
        .map(|(row, _)| row);
    let row = candidates.next()?;
    Some(ClinicalMatch::Containment {
        row,
        ambiguous: candidates.next().is_some(),
    })
}

pub fn clinical_row_data(index: &ClinicalIndex, row: usize) -> ClinicalData {
    let mut data = ClinicalData::new();
    for (col, name) in index.columns.iter().enumerate() {
        let raw = index.rows[row].get(col).map(String::as_str).unwrap_or("");
        data.insert(name.clone(), coerce_cell(raw).to_json());
    }
    data
}

pub fn run_stage4(
    records: Vec<PatientRecord>,
    clinical: &RawTable,
    id_columns: &[String],
) -> (Vec<PatientRecord>, MergeSummary) {
    let Some(index) = ClinicalIndex::build(clinical, id_columns) else {
        tracing::warn!(
            columns = ?clinical.columns.iter().take(10).collect::<Vec<_>>(),
            "no patient identifier column in clinical data; merge skipped"
        );
        return (records, MergeSummary::default());
    };

    let mut summary = MergeSummary {
        id_column: Some(index.id_column.clone()),
        clinical_rows: index.len(),
        ..MergeSummary::default()
    };

    let merged = records
        .into_iter()
        .map(|record| match find_clinical_match(&index, &record.patient_id) {
            Some(found) => {
                match found {
                    ClinicalMatch::Exact(_) => summary.matched_exact += 1,
                    ClinicalMatch::Containment { ambiguous, .. } => {
                        summary.matched_containment += 1;
                        if ambiguous {
                            summary.ambiguous_containment += 1;
                            tracing::warn!(
                                patient_id = %record.patient_id,
                                clinical_id = %index.ids[found.row()],
                                "several clinical rows contain-match patient; using first in file order"
                            );
                        }
                    }
                }
                let data = clinical_row_data(&index, found.row());
                record.with_clinical_data(data)
            }
            None => {
                summary.unmatched += 1;
                record
            }
        })
        .collect();

    tracing::info!(
        id_column = %index.id_column,
        exact = summary.matched_exact,
        containment = summary.matched_containment,
        unmatched = summary.unmatched,
        "clinical data merged"
    );
    (merged, summary)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_clinical.rs"]
mod tests;
