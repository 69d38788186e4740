use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::genes::PathwayGroup;
use crate::model::config::PipelineConfig;
use crate::model::record::PatientRecord;
use crate::pipeline::RunOutput;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{RunSummary, build_run_summary};
use crate::store::{JsonlStore, RecordStore, StoreError};

pub const RECORDS_FILE: &str = "records.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "report.txt";
pub const PATHWAY_SCORES_FILE: &str = "pathway_scores.tsv";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Truncate `records.jsonl` before writing. A run without records
    /// never truncates.
    Replace,
    Append,
}

#[derive(Debug)]
pub struct OutputPaths {
    pub records: PathBuf,
    pub summary: PathBuf,
    pub report: PathBuf,
    pub pathway_scores: PathBuf,
    pub stored: usize,
}

pub fn write_outputs(
    output: &RunOutput,
    config: &PipelineConfig,
    out_dir: &Path,
    mode: StoreMode,
) -> Result<OutputPaths, OutputError> {
    fs::create_dir_all(out_dir)?;

    let records_path = out_dir.join(RECORDS_FILE);
    let stored = if output.records.is_empty() {
        tracing::warn!(
            store = %records_path.display(),
            "no records produced; store left unchanged"
        );
        0
    } else {
        let mut store = JsonlStore::new(&records_path);
        if mode == StoreMode::Replace {
            store.clear()?;
        }
        store_records(&mut store, &output.records, config.batch_size)?
    };

    let summary = build_run_summary(output, config);

    let summary_path = out_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, render_summary_json(&summary)?)?;

    let report_path = out_dir.join(REPORT_FILE);
    fs::write(&report_path, render_report_text(&summary))?;

    let scores_path = out_dir.join(PATHWAY_SCORES_FILE);
    write_pathway_scores(&output.records, &config.pathways, &scores_path)?;

    log_summary(&summary, out_dir);

    Ok(OutputPaths {
        records: records_path,
        summary: summary_path,
        report: report_path,
        pathway_scores: scores_path,
        stored,
    })
}

/// Hands records to the store in `batch_size` chunks.
pub fn store_records(
    store: &mut dyn RecordStore,
    records: &[PatientRecord],
    batch_size: usize,
) -> Result<usize, StoreError> {
    let mut stored = 0usize;
    for chunk in records.chunks(batch_size.max(1)) {
        stored += store.insert_many(chunk)?;
    }
    Ok(stored)
}

pub fn write_pathway_scores(
    records: &[PatientRecord],
    groups: &[PathwayGroup],
    path: &Path,
) -> Result<(), OutputError> {
    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    let mut header = vec!["patient_id".to_string(), "cohort".to_string()];
    header.extend(groups.iter().map(|g| g.name.clone()));
    header.push("overall".to_string());
    w.write_record(&header)?;

    for record in records {
        let scores = record.pathway_scores.as_ref();
        let mut row = vec![record.patient_id.clone(), record.cancer_cohort.clone()];
        for group in groups {
            row.push(format_score(scores.and_then(|s| s.group(&group.name))));
        }
        row.push(format_score(scores.and_then(|s| s.overall)));
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

fn format_score(v: Option<f64>) -> String {
    v.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

fn log_summary(summary: &RunSummary, out_dir: &Path) {
    tracing::info!(
        out_dir = %out_dir.display(),
        files = summary.n_files,
        processed = summary.n_files_processed,
        records = summary.n_records,
        cohorts = summary.cohorts.len(),
        "outputs written"
    );
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_output.rs"]
mod tests;
