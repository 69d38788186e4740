use std::collections::BTreeMap;

use crate::genes::PathwayGroup;
use crate::model::record::PatientRecord;
use crate::model::scores::PathwayScores;

/// Mean of the record's numeric expressions over `genes`; `None` when none
/// of them is present.
pub fn group_mean(record: &PatientRecord, genes: &[String]) -> Option<f64> {
    let mut sum = 0.0f64;
    let mut n = 0usize;
    for gene in genes {
        if let Some(v) = record.numeric_expression(gene) {
            if v.is_nan() {
                continue;
            }
            sum += v;
            n += 1;
        }
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Descriptive aggregate only: group means and their weighted sum, with no
/// normalization or statistical correction.
pub fn compute_pathway_scores(record: &PatientRecord, groups: &[PathwayGroup]) -> PathwayScores {
    let mut scores = BTreeMap::new();
    let mut overall = 0.0f64;
    let mut complete = !groups.is_empty();
    for group in groups {
        let score = group_mean(record, &group.genes);
        match score {
            Some(v) => overall += group.weight * v,
            None => complete = false,
        }
        scores.insert(group.name.clone(), score);
    }
    PathwayScores {
        groups: scores,
        overall: if complete { Some(overall) } else { None },
    }
}

pub fn score_record(record: PatientRecord, groups: &[PathwayGroup]) -> PatientRecord {
    let scores = compute_pathway_scores(&record, groups);
    record.with_pathway_scores(scores)
}

pub fn run_stage5(records: Vec<PatientRecord>, groups: &[PathwayGroup]) -> Vec<PatientRecord> {
    let scored: Vec<PatientRecord> = records
        .into_iter()
        .map(|record| score_record(record, groups))
        .collect();
    let with_overall = scored
        .iter()
        .filter(|r| r.pathway_scores.as_ref().is_some_and(|s| s.overall.is_some()))
        .count();
    tracing::info!(
        records = scored.len(),
        with_overall,
        "pathway scores computed"
    );
    scored
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_pathways.rs"]
mod tests;
