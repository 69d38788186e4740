use std::path::Path;

use crate::input::{InputError, RawTable, load_table};
use crate::model::config::{PipelineConfig, WIDE_INDEX_COLUMN};

/// Layout guessed from the header before the full read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Genes are rows, patients are columns; `index_column` holds gene labels.
    Wide { index_column: usize },
    /// Orientation still open; resolved from labels in stage 2.
    Standard,
}

impl Layout {
    pub fn is_wide(&self) -> bool {
        matches!(self, Layout::Wide { .. })
    }
}

/// Large-matrix heuristic: a literal `sample` column or more columns than
/// the configured threshold.
pub fn detect_layout(columns: &[String], config: &PipelineConfig) -> Layout {
    let sample_col = columns.iter().position(|c| c == WIDE_INDEX_COLUMN);
    if let Some(index_column) = sample_col {
        return Layout::Wide { index_column };
    }
    if columns.len() > config.wide_column_threshold {
        return Layout::Wide { index_column: 0 };
    }
    Layout::Standard
}

#[derive(Debug)]
pub struct Stage1Output {
    pub layout: Layout,
    pub table: RawTable,
}

pub fn run_stage1(path: &Path, config: &PipelineConfig) -> Result<Stage1Output, InputError> {
    let sample = load_table(path, Some(config.sniff_rows))?;
    let layout = detect_layout(&sample.columns, config);
    tracing::info!(
        path = %path.display(),
        n_columns = sample.n_columns(),
        wide = layout.is_wide(),
        "file layout sniffed"
    );

    let table = load_table(path, None)?;
    Ok(Stage1Output { layout, table })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_load.rs"]
mod tests;
