use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-group pathway means and their weighted combination. A group without
/// any contributing gene is `None`; `overall` is `None` unless every group
/// has a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayScores {
    #[serde(flatten)]
    pub groups: BTreeMap<String, Option<f64>>,
    pub overall: Option<f64>,
}

impl PathwayScores {
    pub fn group(&self, name: &str) -> Option<f64> {
        self.groups.get(name).copied().flatten()
    }
}
