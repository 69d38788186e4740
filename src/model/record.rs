use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::Cell;
use crate::model::scores::PathwayScores;

/// Expression value for one gene: a number, or the raw cell text when it
/// could not be coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpressionValue {
    Numeric(f64),
    Text(String),
}

impl ExpressionValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExpressionValue::Numeric(v) => Some(*v),
            ExpressionValue::Text(_) => None,
        }
    }

    pub fn from_cell(cell: Cell<'_>) -> Option<Self> {
        match cell {
            Cell::Number(v) => Some(ExpressionValue::Numeric(v)),
            Cell::Text(s) => Some(ExpressionValue::Text(s.to_string())),
            Cell::Missing => None,
        }
    }
}

pub type ClinicalData = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("patient id is empty")]
    EmptyPatientId,
    #[error("cohort label is empty for patient {0}")]
    EmptyCohort(String),
    #[error("patient {0} has no numeric gene expression")]
    NoNumericExpression(String),
}

/// Normalized per-patient record. Keys of `gene_expressions` are canonical
/// target symbols; at least one of them holds a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub cancer_cohort: String,
    pub gene_expressions: BTreeMap<String, ExpressionValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_data: Option<ClinicalData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathway_scores: Option<PathwayScores>,
}

impl PatientRecord {
    pub fn new(
        patient_id: impl Into<String>,
        cancer_cohort: impl Into<String>,
        gene_expressions: BTreeMap<String, ExpressionValue>,
    ) -> Result<Self, RecordError> {
        let patient_id = patient_id.into();
        let cancer_cohort = cancer_cohort.into();
        if patient_id.trim().is_empty() {
            return Err(RecordError::EmptyPatientId);
        }
        if cancer_cohort.trim().is_empty() {
            return Err(RecordError::EmptyCohort(patient_id));
        }
        if !gene_expressions.values().any(|v| v.as_f64().is_some()) {
            return Err(RecordError::NoNumericExpression(patient_id));
        }
        Ok(Self {
            patient_id,
            cancer_cohort,
            gene_expressions,
            clinical_data: None,
            pathway_scores: None,
        })
    }

    pub fn numeric_expression(&self, symbol: &str) -> Option<f64> {
        self.gene_expressions.get(symbol).and_then(ExpressionValue::as_f64)
    }

    pub fn with_clinical_data(self, clinical_data: ClinicalData) -> Self {
        Self {
            clinical_data: Some(clinical_data),
            ..self
        }
    }

    pub fn with_pathway_scores(self, pathway_scores: PathwayScores) -> Self {
        Self {
            pathway_scores: Some(pathway_scores),
            ..self
        }
    }
}
