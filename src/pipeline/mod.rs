use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::genes::MatchStrategy;
use crate::input::{InputError, cohort_from_path, load_table};
use crate::model::config::PipelineConfig;
use crate::model::record::PatientRecord;

pub mod stage1_load;
pub mod stage2_orient;
pub mod stage3_records;
pub mod stage4_clinical;
pub mod stage5_pathways;
pub mod stage6_output;

use stage2_orient::Orientation;
use stage3_records::BuildStats;
use stage4_clinical::MergeSummary;

/// Per-file failures. Either one skips the file; the run goes on.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load {path}: {source}")]
    LoadFailure { path: PathBuf, source: InputError },
    #[error("no target genes resolved in {0}")]
    NoGenesResolved(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Processed {
        orientation: Orientation,
        strategy: MatchStrategy,
        wide: bool,
        /// Canonical symbol -> label found in the file.
        resolved_genes: BTreeMap<String, String>,
        stats: BuildStats,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: String,
    pub cohort: String,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn records(&self) -> usize {
        match &self.outcome {
            FileOutcome::Processed { stats, .. } => stats.records,
            FileOutcome::Skipped { .. } => 0,
        }
    }
}

#[derive(Debug)]
pub struct ProcessedFile {
    pub records: Vec<PatientRecord>,
    pub outcome: FileOutcome,
}

/// Load, orient and build records for one expression file. Clinical merge
/// and pathway scoring happen once over the whole run.
pub fn process_file(
    path: &Path,
    cohort: &str,
    config: &PipelineConfig,
) -> Result<ProcessedFile, PipelineError> {
    let start = Instant::now();
    let stage1 = stage1_load::run_stage1(path, config).map_err(|source| {
        PipelineError::LoadFailure {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let wide = stage1.layout.is_wide();

    let oriented = stage2_orient::run_stage2(stage1.table, stage1.layout, &config.target_genes)
        .ok_or_else(|| PipelineError::NoGenesResolved(path.to_path_buf()))?;
    info!(
        path = %path.display(),
        orientation = ?oriented.orientation,
        strategy = %oriented.genes.strategy,
        resolved = oriented.genes.len(),
        targets = config.target_genes.len(),
        "genes resolved"
    );

    let (records, stats) = stage3_records::run_stage3(&oriented, cohort, config.batch_size);
    info!(
        path = %path.display(),
        cohort,
        records = stats.records,
        dropped = stats.dropped_no_numeric,
        batches = stats.batches,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "file processed"
    );

    Ok(ProcessedFile {
        records,
        outcome: FileOutcome::Processed {
            orientation: oriented.orientation,
            strategy: oriented.genes.strategy,
            wide,
            resolved_genes: oriented.genes.to_map(),
            stats,
        },
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClinicalReport {
    pub path: String,
    /// Set when the clinical table could not be read; the merge was skipped.
    pub error: Option<String>,
    pub merge: MergeSummary,
}

#[derive(Debug)]
pub struct RunOutput {
    pub records: Vec<PatientRecord>,
    pub files: Vec<FileReport>,
    pub clinical: Option<ClinicalReport>,
}

impl RunOutput {
    pub fn files_processed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Processed { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunInputs<'a> {
    pub files: &'a [PathBuf],
    /// Overrides the filename-derived cohort for every file.
    pub cohort: Option<&'a str>,
    pub clinical: Option<&'a Path>,
    pub config: &'a PipelineConfig,
}

pub fn run_pipeline(inputs: &RunInputs<'_>) -> RunOutput {
    let start = Instant::now();
    let mut records = Vec::new();
    let mut files = Vec::with_capacity(inputs.files.len());

    for path in inputs.files {
        let cohort = inputs
            .cohort
            .map(str::to_string)
            .unwrap_or_else(|| cohort_from_path(path));
        let outcome = match process_file(path, &cohort, inputs.config) {
            Ok(processed) => {
                records.extend(processed.records);
                processed.outcome
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "file skipped");
                FileOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
        };
        files.push(FileReport {
            path: path.display().to_string(),
            cohort,
            outcome,
        });
    }

    let clinical = match inputs.clinical {
        Some(path) => {
            let (merged, report) = merge_clinical(records, path, inputs.config);
            records = merged;
            Some(report)
        }
        None => None,
    };

    let records = stage5_pathways::run_stage5(records, &inputs.config.pathways);

    info!(
        files = files.len(),
        records = records.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pipeline finished"
    );

    RunOutput {
        records,
        files,
        clinical,
    }
}

fn merge_clinical(
    records: Vec<PatientRecord>,
    path: &Path,
    config: &PipelineConfig,
) -> (Vec<PatientRecord>, ClinicalReport) {
    let table = match load_table(path, None) {
        Ok(table) => table,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "clinical data unreadable; merge skipped");
            let report = ClinicalReport {
                path: path.display().to_string(),
                error: Some(err.to_string()),
                merge: MergeSummary::default(),
            };
            return (records, report);
        }
    };
    let (merged, merge) = stage4_clinical::run_stage4(records, &table, &config.clinical_id_columns);
    let report = ClinicalReport {
        path: path.display().to_string(),
        error: None,
        merge,
    };
    (merged, report)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/mod.rs"]
mod tests;
