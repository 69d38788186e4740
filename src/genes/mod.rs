pub mod defs;
pub mod mapping;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use mapping::{resolve_labels, resolve_labels_per_target};

/// Ordered, de-duplicated canonical gene symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TargetGeneList {
    symbols: Vec<String>,
}

impl TargetGeneList {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for symbol in symbols {
            let s = symbol.as_ref().trim();
            if s.is_empty() || !seen.insert(s.to_string()) {
                continue;
            }
            out.push(s.to_string());
        }
        Self { symbols: out }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }
}

impl From<Vec<String>> for TargetGeneList {
    fn from(value: Vec<String>) -> Self {
        Self::new(value)
    }
}

impl From<TargetGeneList> for Vec<String> {
    fn from(value: TargetGeneList) -> Self {
        value.symbols
    }
}

/// Genes contributing to one pathway score and the group's weight in the
/// overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayGroup {
    pub name: String,
    pub genes: Vec<String>,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    CaseInsensitive,
    Substring,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::CaseInsensitive => "case_insensitive",
            MatchStrategy::Substring => "substring",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGene {
    /// Canonical target symbol.
    pub symbol: String,
    /// Label as it appears in the table.
    pub label: String,
    /// Position of `label` in the label list it was matched against.
    pub position: usize,
}

/// Target genes found in one table. Unresolved targets have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGeneSet {
    pub strategy: MatchStrategy,
    pub genes: Vec<ResolvedGene>,
}

impl ResolvedGeneSet {
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[cfg(test)]
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.genes
            .iter()
            .find(|g| g.symbol == symbol)
            .map(|g| g.label.as_str())
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.genes
            .iter()
            .map(|g| (g.symbol.clone(), g.label.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/genes/tests.rs"]
mod tests;
