use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genes::defs::{builtin_pathway_groups, builtin_targets};
use crate::genes::{PathwayGroup, TargetGeneList};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_SNIFF_ROWS: usize = 10;
pub const DEFAULT_WIDE_COLUMN_THRESHOLD: usize = 100;
pub const WIDE_INDEX_COLUMN: &str = "sample";
const CLINICAL_ID_COLUMNS: &[&str] = &[
    "patient_id",
    "sample",
    "bcr_patient_barcode",
    "_PATIENT",
    "PATIENT_ID",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Immutable settings threaded through every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub target_genes: TargetGeneList,
    pub pathways: Vec<PathwayGroup>,
    /// Patients materialized per builder batch.
    pub batch_size: usize,
    /// Data rows read while sniffing a file's layout.
    pub sniff_rows: usize,
    /// More columns than this means genes-as-rows.
    pub wide_column_threshold: usize,
    /// Clinical identifier columns, highest priority first.
    pub clinical_id_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::default_v1()
    }
}

impl PipelineConfig {
    pub fn default_v1() -> Self {
        Self {
            target_genes: builtin_targets(),
            pathways: builtin_pathway_groups(),
            batch_size: DEFAULT_BATCH_SIZE,
            sniff_rows: DEFAULT_SNIFF_ROWS,
            wide_column_threshold: DEFAULT_WIDE_COLUMN_THRESHOLD,
            clinical_id_columns: CLINICAL_ID_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Reads a JSON override; absent keys keep their `default_v1` values.
    /// Not validated: callers apply CLI overrides first, then `validate`.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_genes.is_empty() {
            return Err(ConfigError::Invalid("target_genes is empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be > 0".to_string()));
        }
        if self.sniff_rows == 0 {
            return Err(ConfigError::Invalid("sniff_rows must be > 0".to_string()));
        }
        if self.clinical_id_columns.is_empty() {
            return Err(ConfigError::Invalid(
                "clinical_id_columns is empty".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for group in &self.pathways {
            if group.name.is_empty() || group.name == "overall" {
                return Err(ConfigError::Invalid(format!(
                    "invalid pathway name '{}'",
                    group.name
                )));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate pathway '{}'",
                    group.name
                )));
            }
            if !group.weight.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "pathway '{}' has a non-finite weight",
                    group.name
                )));
            }
            for gene in &group.genes {
                if !self.target_genes.contains(gene) {
                    tracing::warn!(
                        pathway = %group.name,
                        gene = %gene,
                        "pathway gene is not a target gene and will never contribute"
                    );
                }
            }
        }
        Ok(())
    }

    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        if let Some(size) = batch_size {
            self.batch_size = size;
        }
        self
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/config.rs"]
mod tests;
