use std::fs;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::genes::TargetGeneList;
use crate::input::RawTable;

pub const SAMPLE_FILE: &str = "sample_TCGA_gene_expression.tsv";
pub const DEFAULT_SEED: u64 = 42;
const FILLER_GENES: usize = 20;
const PATIENTS: usize = 30;
const MAX_EXPRESSION: f64 = 15.0;

/// Genes-as-rows table: a `Gene` label column, then one column per patient.
/// Target genes come first, followed by `Gene_1..Gene_20`.
pub fn generate_sample_table(targets: &TargetGeneList, seed: u64) -> RawTable {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut columns = Vec::with_capacity(PATIENTS + 1);
    columns.push("Gene".to_string());
    columns.extend((1..=PATIENTS).map(|i| format!("TCGA-PATIENT-{i:04}")));

    let genes = targets
        .symbols()
        .iter()
        .cloned()
        .chain((1..=FILLER_GENES).map(|i| format!("Gene_{i}")));

    let rows = genes
        .map(|gene| {
            let mut row = Vec::with_capacity(PATIENTS + 1);
            row.push(gene);
            for _ in 0..PATIENTS {
                let v: f64 = rng.random_range(0.0..MAX_EXPRESSION);
                row.push(format!("{v:.4}"));
            }
            row
        })
        .collect();

    RawTable::new(columns, rows)
}

pub fn write_sample_dataset(
    out_dir: &Path,
    targets: &TargetGeneList,
    seed: u64,
) -> Result<PathBuf, csv::Error> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(SAMPLE_FILE);
    let table = generate_sample_table(targets, seed);

    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(&path)?;
    w.write_record(&table.columns)?;
    for row in &table.rows {
        w.write_record(row)?;
    }
    w.flush()?;

    tracing::info!(
        path = %path.display(),
        genes = table.n_rows(),
        patients = PATIENTS,
        seed,
        "sample dataset written"
    );
    Ok(path)
}

#[cfg(test)]
#[path = "../tests/src_inline/sample.rs"]
mod tests;
