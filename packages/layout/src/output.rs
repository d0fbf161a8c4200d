use serde::{Deserialize, Serialize};

use folio_common::Warning;

/// Computed pagination for one section: page index → column index →
/// ordered placed blocks. Deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLayout {
    pub section_id: String,
    pub pages: Vec<Page>,
    /// Degradations encountered while paginating (overflow, etc.).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub placements: Vec<Placement>,
}

/// One block's slot in a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub block_id: String,
    /// Top offset within the column, in points. An exact multiple of the
    /// grid spacing when the baseline grid is on.
    pub top: f64,
    pub height: f64,
    /// Marked for landscape rotation instead of truncation.
    pub rotated: bool,
}

impl SectionLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Zero-based page index a block was placed on.
    pub fn page_of(&self, block_id: &str) -> Option<usize> {
        self.pages.iter().position(|page| {
            page.columns
                .iter()
                .any(|col| col.placements.iter().any(|p| p.block_id == block_id))
        })
    }

    /// One-based page number a block was placed on.
    pub fn page_number_of(&self, block_id: &str) -> Option<usize> {
        self.page_of(block_id).map(|index| index + 1)
    }

    /// Every placement in page/column/list order.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.pages
            .iter()
            .flat_map(|page| page.columns.iter())
            .flat_map(|col| col.placements.iter())
    }
}
