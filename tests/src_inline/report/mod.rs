use std::collections::BTreeMap;

use super::*;
use crate::genes::defs::builtin_pathway_groups;
use crate::model::record::ExpressionValue;
use crate::pipeline::stage5_pathways::run_stage5;
use crate::genes::MatchStrategy;
use crate::pipeline::stage2_orient::Orientation;
use crate::pipeline::stage3_records::BuildStats;
use crate::pipeline::stage4_clinical::MergeSummary;
use crate::pipeline::{FileOutcome, RunOutput};

fn record(id: &str, cohort: &str, values: &[(&str, f64)]) -> PatientRecord {
    let expr: BTreeMap<String, ExpressionValue> = values
        .iter()
        .map(|(g, v)| (g.to_string(), ExpressionValue::Numeric(*v)))
        .collect();
    PatientRecord::new(id, cohort, expr).unwrap()
}

#[test]
fn test_median_and_formatting() {
    let v = vec![5.0, 1.0, 3.0, 2.0, 4.0];
    assert_eq!(median(&v), 3.0);
    assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    assert_eq!(median(&[7.0]), 7.0);
    assert_eq!(median(&[]), 0.0);
    assert_eq!(median_opt(&[]), None);
    assert_eq!(format_opt_6(None), "NA");
    assert_eq!(format_opt_6(Some(0.5)), "0.500000");
}

#[test]
fn test_cohort_summaries() {
    let groups = builtin_pathway_groups();
    let full = [
        ("C6orf150", 1.0),
        ("CCL5", 1.0),
        ("NFKB1", 1.0),
    ];
    let records = run_stage5(
        vec![
            record("P1", "LUAD", &full),
            record("P2", "BRCA", &[("NFKB1", 2.0)]),
            record("P3", "BRCA", &[("TP53", 9.0)]),
        ],
        &groups,
    );

    let summaries = cohort_summaries(&records, &groups);
    assert_eq!(summaries.len(), 2);
    let brca = &summaries[0];
    assert_eq!(brca.cohort, "BRCA");
    assert_eq!(brca.n_records, 2);
    assert_eq!(brca.pathway_medians["signaling"], Some(2.0));
    assert_eq!(brca.pathway_medians["cGAS_activation"], None);
    assert_eq!(brca.overall_median, None);
    assert_eq!(brca.n_with_overall, 0);

    let luad = &summaries[1];
    assert_eq!(luad.n_with_overall, 1);
    assert!((luad.overall_median.unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_run_summary_and_text() {
    let config = PipelineConfig::default_v1();
    let output = RunOutput {
        records: run_stage5(vec![record("P1", "BRCA", &[("NFKB1", 2.0)])], &config.pathways),
        files: vec![FileReport {
            path: "GBM_bad.tsv".to_string(),
            cohort: "GBM".to_string(),
            outcome: FileOutcome::Skipped {
                reason: "no target genes resolved in GBM_bad.tsv".to_string(),
            },
        }],
        clinical: None,
    };

    let summary = build_run_summary(&output, &config);
    assert_eq!(summary.n_files, 1);
    assert_eq!(summary.n_files_processed, 0);
    assert_eq!(summary.n_records, 1);

    let json = json::render_summary_json(&summary).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["files"][0]["outcome"]["status"], "skipped");
    assert_eq!(value["config"]["batch_size"], 1000);

    let text = text::render_report_text(&summary);
    assert!(text.contains("GBM_bad.tsv [GBM]: skipped"));
    assert!(text.contains("No clinical table supplied."));
    assert!(text.contains("signaling: 2.000000"));
    assert!(text.contains("overall: NA (n=0)"));
}

#[test]
fn test_text_lists_processed_files_and_skipped_merge() {
    let config = PipelineConfig::default_v1();
    let stats = BuildStats {
        patients_seen: 4,
        records: 3,
        dropped_no_numeric: 1,
        ..BuildStats::default()
    };
    let output = RunOutput {
        records: Vec::new(),
        files: vec![FileReport {
            path: "BRCA_expr.tsv".to_string(),
            cohort: "BRCA".to_string(),
            outcome: FileOutcome::Processed {
                orientation: Orientation::GenesAsRows,
                strategy: MatchStrategy::Exact,
                wide: false,
                resolved_genes: BTreeMap::from([("TP53".to_string(), "TP53".to_string())]),
                stats,
            },
        }],
        clinical: Some(ClinicalReport {
            path: "clinical.tsv".to_string(),
            error: None,
            merge: MergeSummary::default(),
        }),
    };

    let text = text::render_report_text(&build_run_summary(&output, &config));
    assert!(text.contains("BRCA_expr.tsv [BRCA]: 3 records, 1 genes (exact)"));
    assert!(text.contains("dropped without numeric expression: 1"));
    assert!(text.contains("Skipped: no patient identifier column found."));
    assert!(!text.contains("Identifier column:"));
}
