use crate::pipeline::FileOutcome;
use crate::report::{CohortSummary, RunSummary, format_opt_6};

pub fn render_report_text(data: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("Cohort Expression Ingestion Report\n");
    out.push_str("==================================\n\n");

    out.push_str("1. Inputs\n");
    out.push_str(&format!(
        "Files: {} ({} processed, {} skipped)\n",
        data.n_files,
        data.n_files_processed,
        data.n_files - data.n_files_processed
    ));
    for file in &data.files {
        match &file.outcome {
            FileOutcome::Processed {
                orientation,
                strategy,
                resolved_genes,
                stats,
                ..
            } => {
                out.push_str(&format!(
                    "  {} [{}]: {} records, {} genes ({}), orientation {:?}\n",
                    file.path,
                    file.cohort,
                    file.records(),
                    resolved_genes.len(),
                    strategy,
                    orientation
                ));
                if stats.dropped_no_numeric > 0 {
                    out.push_str(&format!(
                        "    dropped without numeric expression: {}\n",
                        stats.dropped_no_numeric
                    ));
                }
            }
            FileOutcome::Skipped { reason } => {
                out.push_str(&format!("  {} [{}]: skipped ({})\n", file.path, file.cohort, reason));
            }
        }
    }
    out.push_str(&format!("Target genes: {}\n\n", data.config.target_genes.len()));

    out.push_str("2. Clinical merge\n");
    match &data.clinical {
        None => out.push_str("No clinical table supplied.\n\n"),
        Some(clinical) => {
            if let Some(err) = &clinical.error {
                out.push_str(&format!("Skipped: {} could not be read ({})\n\n", clinical.path, err));
            } else if clinical.merge.skipped() {
                out.push_str("Skipped: no patient identifier column found.\n\n");
            } else {
                let merge = &clinical.merge;
                out.push_str(&format!(
                    "Identifier column: {}\n",
                    merge.id_column.as_deref().unwrap_or("")
                ));
                out.push_str(&format!(
                    "Matched exact: {}\nMatched by containment: {}\nUnmatched: {}\n",
                    merge.matched_exact, merge.matched_containment, merge.unmatched
                ));
                if merge.ambiguous_containment > 0 {
                    out.push_str(&format!(
                        "Ambiguous containment matches: {} (first clinical row in file order used)\n",
                        merge.ambiguous_containment
                    ));
                }
                out.push('\n');
            }
        }
    }

    out.push_str("3. Pathway scores by cohort (median)\n");
    if data.cohorts.is_empty() {
        out.push_str("No records.\n");
    }
    for cohort in &data.cohorts {
        push_cohort(&mut out, cohort);
    }
    out.push('\n');

    out.push_str("4. Caveats\n");
    out.push_str(
        "Pathway scores are descriptive aggregates (group means and their weighted sum), \
         not statistically validated pathway-activity measures.\n",
    );
    out.push_str("Gene resolution is best-effort; substring matches may include false positives.\n");

    out
}

fn push_cohort(out: &mut String, cohort: &CohortSummary) {
    out.push_str(&format!(
        "{}: {} records ({} with clinical data)\n",
        cohort.cohort, cohort.n_records, cohort.n_with_clinical
    ));
    for (name, value) in &cohort.pathway_medians {
        out.push_str(&format!("  {}: {}\n", name, format_opt_6(*value)));
    }
    out.push_str(&format!(
        "  overall: {} (n={})\n",
        format_opt_6(cohort.overall_median),
        cohort.n_with_overall
    ));
}
