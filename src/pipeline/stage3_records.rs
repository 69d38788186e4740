use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::input::coerce_cell;
use crate::model::record::{ExpressionValue, PatientRecord, RecordError};
use crate::pipeline::stage2_orient::OrientedTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub patients_seen: usize,
    pub records: usize,
    pub dropped_no_numeric: usize,
    pub skipped_blank_id: usize,
    pub skipped_duplicate_id: usize,
    pub batches: usize,
}

/// Yields patient records one batch of patients at a time. Batch size only
/// bounds how many records are materialized together; the concatenated
/// output is the same for any batch size.
pub struct PatientBatches<'a> {
    oriented: &'a OrientedTable,
    cohort: &'a str,
    batch_size: usize,
    next_patient: usize,
    seen: HashSet<String>,
    stats: BuildStats,
}

impl<'a> PatientBatches<'a> {
    pub fn new(oriented: &'a OrientedTable, cohort: &'a str, batch_size: usize) -> Self {
        Self {
            oriented,
            cohort,
            batch_size: batch_size.max(1),
            next_patient: 0,
            seen: HashSet::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    fn build_patient(&mut self, patient: usize) -> Option<PatientRecord> {
        self.stats.patients_seen += 1;
        let patient_id = self.oriented.patient_id(patient).trim();
        if patient_id.is_empty() {
            self.stats.skipped_blank_id += 1;
            tracing::warn!(patient_index = patient, "blank patient label; skipping");
            return None;
        }
        if !self.seen.insert(patient_id.to_string()) {
            self.stats.skipped_duplicate_id += 1;
            tracing::warn!(patient_id, "duplicate patient label; keeping first");
            return None;
        }

        let mut expressions = BTreeMap::new();
        for gene in &self.oriented.genes.genes {
            let raw = self.oriented.value(patient, gene);
            if let Some(value) = ExpressionValue::from_cell(coerce_cell(raw)) {
                expressions.insert(gene.symbol.clone(), value);
            }
        }

        match PatientRecord::new(patient_id, self.cohort, expressions) {
            Ok(record) => Some(record),
            Err(RecordError::NoNumericExpression(id)) => {
                self.stats.dropped_no_numeric += 1;
                tracing::debug!(patient_id = %id, "no numeric expression; patient dropped");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "invalid patient record; skipping");
                None
            }
        }
    }
}

impl Iterator for PatientBatches<'_> {
    type Item = Vec<PatientRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let n_patients = self.oriented.n_patients();
        if self.next_patient >= n_patients {
            return None;
        }
        let start = self.next_patient;
        let end = (start + self.batch_size).min(n_patients);
        self.next_patient = end;

        let mut batch = Vec::with_capacity(end - start);
        for patient in start..end {
            if let Some(record) = self.build_patient(patient) {
                batch.push(record);
            }
        }
        self.stats.batches += 1;
        self.stats.records += batch.len();
        tracing::debug!(
            batch = self.stats.batches,
            patients = end - start,
            records = batch.len(),
            "patient batch built"
        );
        Some(batch)
    }
}

pub fn run_stage3(
    oriented: &OrientedTable,
    cohort: &str,
    batch_size: usize,
) -> (Vec<PatientRecord>, BuildStats) {
    let mut batches = PatientBatches::new(oriented, cohort, batch_size);
    let mut records = Vec::new();
    for batch in batches.by_ref() {
        records.extend(batch);
    }
    (records, batches.stats())
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_records.rs"]
mod tests;
