use std::collections::BTreeMap;
use std::fs;

use super::*;
use crate::model::record::ExpressionValue;
use crate::pipeline::stage5_pathways::run_stage5;
use crate::store::MemoryStore;
use tempfile::TempDir;

fn record(id: &str, cohort: &str, nfkb1: f64) -> PatientRecord {
    let mut expr = BTreeMap::new();
    expr.insert("NFKB1".to_string(), ExpressionValue::Numeric(nfkb1));
    PatientRecord::new(id, cohort, expr).unwrap()
}

fn run_output(config: &PipelineConfig) -> RunOutput {
    let records = vec![
        record("P1", "BRCA", 1.0),
        record("P2", "BRCA", 3.0),
        record("P3", "LUAD", 2.0),
    ];
    RunOutput {
        records: run_stage5(records, &config.pathways),
        files: Vec::new(),
        clinical: None,
    }
}

#[test]
fn test_write_outputs_creates_all_files() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default_v1();
    let output = run_output(&config);

    let paths = write_outputs(&output, &config, dir.path(), StoreMode::Replace).unwrap();
    assert_eq!(paths.stored, 3);
    assert!(paths.summary.exists());
    assert!(paths.report.exists());

    let store = JsonlStore::new(&paths.records);
    assert_eq!(store.count().unwrap(), 3);
    assert_eq!(store.load_all().unwrap(), output.records);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.summary).unwrap()).unwrap();
    assert_eq!(summary["tool"], "kira-cohortexpr");
    assert_eq!(summary["n_records"], 3);
    assert_eq!(summary["cohorts"][0]["cohort"], "BRCA");
    assert_eq!(summary["cohorts"][0]["pathway_medians"]["signaling"], 2.0);

    let report = fs::read_to_string(&paths.report).unwrap();
    assert!(report.contains("descriptive aggregates"));
    assert!(report.contains("BRCA: 2 records"));
}

#[test]
fn test_append_mode_keeps_previous_records() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default_v1();
    let output = run_output(&config);

    write_outputs(&output, &config, dir.path(), StoreMode::Replace).unwrap();
    let paths = write_outputs(&output, &config, dir.path(), StoreMode::Append).unwrap();
    assert_eq!(JsonlStore::new(&paths.records).count().unwrap(), 6);

    let paths = write_outputs(&output, &config, dir.path(), StoreMode::Replace).unwrap();
    assert_eq!(JsonlStore::new(&paths.records).count().unwrap(), 3);
}

#[test]
fn test_pathway_scores_tsv() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default_v1();
    let output = run_output(&config);
    let path = dir.path().join(PATHWAY_SCORES_FILE);

    write_pathway_scores(&output.records, &config.pathways, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "patient_id\tcohort\tcGAS_activation\tinflammatory_response\tsignaling\toverall"
    );
    assert_eq!(lines[1], "P1\tBRCA\t\t\t1.000000\t");
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_store_records_in_batches() {
    let config = PipelineConfig::default_v1();
    let output = run_output(&config);
    let mut store = MemoryStore::default();
    let stored = store_records(&mut store, &output.records, 2).unwrap();
    assert_eq!(stored, 3);
    assert_eq!(store.records(), output.records.as_slice());
}

#[test]
fn test_run_without_records_keeps_existing_store() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default_v1();
    write_outputs(&run_output(&config), &config, dir.path(), StoreMode::Replace).unwrap();

    let failed = RunOutput {
        records: Vec::new(),
        files: Vec::new(),
        clinical: None,
    };
    let paths = write_outputs(&failed, &config, dir.path(), StoreMode::Replace).unwrap();
    assert_eq!(paths.stored, 0);
    assert_eq!(JsonlStore::new(&paths.records).count().unwrap(), 3);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.summary).unwrap()).unwrap();
    assert_eq!(summary["n_records"], 0);
}
