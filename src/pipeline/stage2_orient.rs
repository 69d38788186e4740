use serde::Serialize;

use crate::genes::{
    ResolvedGene, ResolvedGeneSet, TargetGeneList, resolve_labels, resolve_labels_per_target,
};
use crate::input::RawTable;
use crate::pipeline::stage1_load::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Gene labels in the row index, one patient per column.
    GenesAsRows,
    /// Patient ids in the row index, one gene per column.
    GenesAsColumns,
}

/// Table with its label column promoted to the index and the target genes
/// resolved against the gene axis.
#[derive(Debug, Clone)]
pub struct OrientedTable {
    pub table: RawTable,
    pub orientation: Orientation,
    pub genes: ResolvedGeneSet,
}

impl OrientedTable {
    pub fn n_patients(&self) -> usize {
        match self.orientation {
            Orientation::GenesAsRows => self.table.n_columns(),
            Orientation::GenesAsColumns => self.table.n_rows(),
        }
    }

    pub fn patient_id(&self, patient: usize) -> &str {
        match self.orientation {
            Orientation::GenesAsRows => self
                .table
                .columns
                .get(patient)
                .map(String::as_str)
                .unwrap_or(""),
            Orientation::GenesAsColumns => self
                .table
                .index
                .as_ref()
                .and_then(|index| index.get(patient))
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    pub fn value(&self, patient: usize, gene: &ResolvedGene) -> &str {
        match self.orientation {
            Orientation::GenesAsRows => self.table.cell(gene.position, patient),
            Orientation::GenesAsColumns => self.table.cell(patient, gene.position),
        }
    }
}

pub fn run_stage2(
    table: RawTable,
    layout: Layout,
    targets: &TargetGeneList,
) -> Option<OrientedTable> {
    if table.is_empty() {
        return None;
    }

    if let Layout::Wide { index_column } = layout {
        let labels: Vec<String> = table
            .column_values(index_column)
            .into_iter()
            .map(str::to_string)
            .collect();
        let genes = resolve_labels_per_target(&labels, targets)?;
        return Some(OrientedTable {
            table: table.with_index(index_column),
            orientation: Orientation::GenesAsRows,
            genes,
        });
    }

    let row_labels: Vec<String> = table
        .column_values(0)
        .into_iter()
        .map(str::to_string)
        .collect();
    if let Some(genes) = resolve_labels(&row_labels, targets) {
        return Some(OrientedTable {
            table: table.with_index(0),
            orientation: Orientation::GenesAsRows,
            genes,
        });
    }

    tracing::debug!("no target genes among row labels; trying column labels");
    // Column 0 identifies patients and becomes the index, so positions in
    // the remaining columns line up with the re-indexed table.
    let genes = resolve_labels(&table.columns[1..], targets)?;
    Some(OrientedTable {
        table: table.with_index(0),
        orientation: Orientation::GenesAsColumns,
        genes,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_orient.rs"]
mod tests;
