use crate::genes::{MatchStrategy, ResolvedGene, ResolvedGeneSet, TargetGeneList};

/// A resolver strategy: a pure function from table labels and targets to the
/// genes it could place, or `None` when it placed nothing.
pub type StrategyFn = fn(&[String], &TargetGeneList) -> Option<ResolvedGeneSet>;

/// Tried in order; the first strategy that resolves anything wins.
pub const STRATEGIES: &[(MatchStrategy, StrategyFn)] = &[
    (MatchStrategy::Exact, match_exact),
    (MatchStrategy::CaseInsensitive, match_case_insensitive),
    (MatchStrategy::Substring, match_substring),
];

pub fn resolve_labels(labels: &[String], targets: &TargetGeneList) -> Option<ResolvedGeneSet> {
    for (strategy, matcher) in STRATEGIES {
        if let Some(resolved) = matcher(labels, targets) {
            tracing::debug!(
                strategy = %strategy,
                resolved = resolved.len(),
                targets = targets.len(),
                "target genes resolved"
            );
            return Some(resolved);
        }
        tracing::debug!(strategy = %strategy, "no target genes matched");
    }
    None
}

/// Wide matrices resolve each target on its own: exact label first, then a
/// case-insensitive one. Substring matching only runs when no target resolved
/// either way. The reported strategy is the weakest one used.
pub fn resolve_labels_per_target(
    labels: &[String],
    targets: &TargetGeneList,
) -> Option<ResolvedGeneSet> {
    let upper: Vec<String> = labels.iter().map(|l| normalize_symbol(l)).collect();
    let mut strategy = MatchStrategy::Exact;
    let mut genes = Vec::new();
    for target in targets.symbols() {
        let target_norm = normalize_symbol(target);
        let position = match labels.iter().position(|l| l == target) {
            Some(position) => Some(position),
            None if target_norm.is_empty() => None,
            None => {
                let found = upper.iter().position(|l| *l == target_norm);
                if found.is_some() {
                    strategy = MatchStrategy::CaseInsensitive;
                }
                found
            }
        };
        if let Some(position) = position {
            genes.push(ResolvedGene {
                symbol: target.clone(),
                label: labels[position].clone(),
                position,
            });
        }
    }

    let resolved = match finish(strategy, genes) {
        Some(resolved) => resolved,
        None => {
            tracing::debug!("no exact or case-insensitive hits; trying substring");
            match_substring(labels, targets)?
        }
    };
    tracing::debug!(
        strategy = %resolved.strategy,
        resolved = resolved.len(),
        targets = targets.len(),
        "target genes resolved per target"
    );
    Some(resolved)
}

pub fn match_exact(labels: &[String], targets: &TargetGeneList) -> Option<ResolvedGeneSet> {
    collect(MatchStrategy::Exact, labels, targets, |label, target| label == target)
}

pub fn match_case_insensitive(
    labels: &[String],
    targets: &TargetGeneList,
) -> Option<ResolvedGeneSet> {
    let upper: Vec<String> = labels.iter().map(|l| normalize_symbol(l)).collect();
    collect_normalized(
        MatchStrategy::CaseInsensitive,
        labels,
        &upper,
        targets,
        |label, target| label == target,
    )
}

/// Fuzzy fallback: short symbols can hit unrelated labels (`ATM` in `PATM1`).
pub fn match_substring(labels: &[String], targets: &TargetGeneList) -> Option<ResolvedGeneSet> {
    let upper: Vec<String> = labels.iter().map(|l| normalize_symbol(l)).collect();
    collect_normalized(
        MatchStrategy::Substring,
        labels,
        &upper,
        targets,
        |label, target| label.contains(target),
    )
}

pub fn normalize_symbol(s: &str) -> String {
    s.trim().to_uppercase()
}

fn collect(
    strategy: MatchStrategy,
    labels: &[String],
    targets: &TargetGeneList,
    matches: impl Fn(&str, &str) -> bool,
) -> Option<ResolvedGeneSet> {
    let mut genes = Vec::new();
    for target in targets.symbols() {
        if let Some(position) = labels
            .iter()
            .position(|l| matches(l.as_str(), target.as_str()))
        {
            genes.push(ResolvedGene {
                symbol: target.clone(),
                label: labels[position].clone(),
                position,
            });
        }
    }
    finish(strategy, genes)
}

fn collect_normalized(
    strategy: MatchStrategy,
    labels: &[String],
    normalized: &[String],
    targets: &TargetGeneList,
    matches: impl Fn(&str, &str) -> bool,
) -> Option<ResolvedGeneSet> {
    let mut genes = Vec::new();
    for target in targets.symbols() {
        let target_norm = normalize_symbol(target);
        if target_norm.is_empty() {
            continue;
        }
        if let Some(position) = normalized
            .iter()
            .position(|l| matches(l.as_str(), target_norm.as_str()))
        {
            genes.push(ResolvedGene {
                symbol: target.clone(),
                label: labels[position].clone(),
                position,
            });
        }
    }
    finish(strategy, genes)
}

fn finish(strategy: MatchStrategy, genes: Vec<ResolvedGene>) -> Option<ResolvedGeneSet> {
    if genes.is_empty() {
        None
    } else {
        Some(ResolvedGeneSet { strategy, genes })
    }
}
