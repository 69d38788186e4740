pub mod json;
pub mod text;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::genes::PathwayGroup;
use crate::model::config::PipelineConfig;
use crate::model::record::PatientRecord;
use crate::pipeline::{ClinicalReport, FileReport, RunOutput};

pub const TOOL_NAME: &str = "kira-cohortexpr";

/// Median of each pathway group over one cohort's scored records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    pub cohort: String,
    pub n_records: usize,
    pub n_with_clinical: usize,
    /// `None` when no record in the cohort has a score for that group.
    pub pathway_medians: BTreeMap<String, Option<f64>>,
    pub overall_median: Option<f64>,
    pub n_with_overall: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub config: PipelineConfig,
    pub n_files: usize,
    pub n_files_processed: usize,
    pub n_records: usize,
    pub files: Vec<FileReport>,
    pub clinical: Option<ClinicalReport>,
    pub cohorts: Vec<CohortSummary>,
}

pub fn build_run_summary(output: &RunOutput, config: &PipelineConfig) -> RunSummary {
    RunSummary {
        tool: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: config.clone(),
        n_files: output.files.len(),
        n_files_processed: output.files_processed(),
        n_records: output.records.len(),
        files: output.files.clone(),
        clinical: output.clinical.clone(),
        cohorts: cohort_summaries(&output.records, &config.pathways),
    }
}

/// Cohorts in name order.
pub fn cohort_summaries(records: &[PatientRecord], groups: &[PathwayGroup]) -> Vec<CohortSummary> {
    let mut by_cohort: BTreeMap<&str, Vec<&PatientRecord>> = BTreeMap::new();
    for record in records {
        by_cohort
            .entry(record.cancer_cohort.as_str())
            .or_default()
            .push(record);
    }

    by_cohort
        .into_iter()
        .map(|(cohort, members)| {
            let mut pathway_medians = BTreeMap::new();
            for group in groups {
                let values: Vec<f64> = members
                    .iter()
                    .filter_map(|r| r.pathway_scores.as_ref()?.group(&group.name))
                    .collect();
                pathway_medians.insert(group.name.clone(), median_opt(&values));
            }
            let overall: Vec<f64> = members
                .iter()
                .filter_map(|r| r.pathway_scores.as_ref()?.overall)
                .collect();
            CohortSummary {
                cohort: cohort.to_string(),
                n_records: members.len(),
                n_with_clinical: members.iter().filter(|r| r.clinical_data.is_some()).count(),
                pathway_medians,
                overall_median: median_opt(&overall),
                n_with_overall: overall.len(),
            }
        })
        .collect()
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}

pub fn format_opt_6(v: Option<f64>) -> String {
    v.map(format_f64_6).unwrap_or_else(|| "NA".to_string())
}

/// Middle value; an even count averages the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn median_opt(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(median(values))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
