use crate::genes::{PathwayGroup, TargetGeneList};

const ONCOGENIC_CORE: &[&str] = &[
    "TP53", "BRCA1", "BRCA2", "EGFR", "KRAS", "PTEN", "PIK3CA", "AKT1", "MYC", "BRAF",
];
const CGAS_ACTIVATION: &[&str] = &["C6orf150", "TMEM173"];
const INFLAMMATORY_RESPONSE: &[&str] = &["CCL5", "CXCL10", "CXCL9", "CXCL11", "IL6", "CXCL8"];
const SIGNALING: &[&str] = &["NFKB1", "IKBKE", "IRF3", "TREX1", "ATM"];

#[derive(Debug, Clone, Copy)]
pub struct PathwayDef {
    pub name: &'static str,
    pub genes: &'static [&'static str],
    pub weight: f64,
}

const BUILTIN_PATHWAYS: &[PathwayDef] = &[
    PathwayDef {
        name: "cGAS_activation",
        genes: CGAS_ACTIVATION,
        weight: 0.4,
    },
    PathwayDef {
        name: "inflammatory_response",
        genes: INFLAMMATORY_RESPONSE,
        weight: 0.4,
    },
    PathwayDef {
        name: "signaling",
        genes: SIGNALING,
        weight: 0.2,
    },
];

// Legacy symbols used by older expression releases and their current names.
const ALIASES: &[(&str, &str)] = &[
    ("C6orf150", "cGAS"),
    ("TMEM173", "STING"),
    ("CXCL8", "IL8"),
];

pub fn builtin_pathway_groups() -> Vec<PathwayGroup> {
    BUILTIN_PATHWAYS
        .iter()
        .map(|def| PathwayGroup {
            name: def.name.to_string(),
            genes: def.genes.iter().map(|g| g.to_string()).collect(),
            weight: def.weight,
        })
        .collect()
}

/// Oncogenic core followed by every pathway gene, in definition order.
pub fn builtin_targets() -> TargetGeneList {
    let pathway_genes = BUILTIN_PATHWAYS.iter().flat_map(|def| def.genes.iter());
    TargetGeneList::new(ONCOGENIC_CORE.iter().chain(pathway_genes))
}

pub fn alias_of(symbol: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(canonical, _)| *canonical == symbol)
        .map(|(_, alias)| *alias)
}
