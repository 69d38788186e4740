use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod cell;
pub mod meta;
pub mod reader;
pub mod table;

pub use cell::{Cell, coerce_cell};
pub use table::{RawTable, load_table};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("parse error: {0}")]
    Parse(String),
}

const TABLE_EXTENSIONS: &[&str] = &[".tsv", ".txt", ".csv"];

/// Cohort label derived from a file name: the part before the first `_`.
/// Names without an underscore fall back to the name minus its table
/// extensions (`LAML.tsv.gz` -> `LAML`).
pub fn cohort_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some((head, _)) = name.split_once('_') {
        return head.to_string();
    }
    let stem = name.strip_suffix(".gz").unwrap_or(&name);
    for ext in TABLE_EXTENSIONS {
        if let Some(stripped) = stem.strip_suffix(ext) {
            return stripped.to_string();
        }
    }
    stem.to_string()
}

pub fn is_table_file(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_ascii_lowercase()) else {
        return false;
    };
    let stem = name.strip_suffix(".gz").unwrap_or(&name);
    TABLE_EXTENSIONS.iter().any(|ext| stem.ends_with(ext))
}

/// Expands `--input` arguments: files are kept as given, directories are
/// scanned (non-recursively) for table files in name order.
pub fn discover_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, InputError> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = BTreeSet::new();
            for entry in std::fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_table_file(&path) {
                    found.insert(path);
                }
            }
            if found.is_empty() {
                tracing::warn!(dir = %input.display(), "no expression tables found in directory");
            }
            out.extend(found);
        } else if input.exists() {
            out.push(input.clone());
        } else {
            return Err(InputError::MissingInput(format!(
                "{} does not exist",
                input.display()
            )));
        }
    }
    if out.is_empty() {
        return Err(InputError::MissingInput(
            "no expression tables to process".to_string(),
        ));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
