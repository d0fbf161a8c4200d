use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::page_master::{LayoutIntent, PageMaster};

/// Root document node.
///
/// Sections are kept sorted by `order`; `order` values are unique within a
/// document and define render/paginate order. Children are held behind
/// `Arc` so snapshots and mutated copies share untouched subtrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sections: Vec<Arc<Section>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A paginated region of a document with its own page geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub page_master: PageMaster,
    pub layout_intent: LayoutIntent,
    #[serde(default)]
    pub flows: Vec<Arc<Flow>>,
    pub order: u32,

    /// Blocks attached directly to a Section are a migration error: they
    /// are captured here on deserialize, never rendered, and never written
    /// back. The sanitize pass drains them into a schema warning.
    #[serde(rename = "blocks", default, skip_serializing)]
    legacy_blocks: Vec<serde_json::Value>,
}

/// An ordered, independently paginated stream of blocks within a Section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FlowKind,
    #[serde(default)]
    pub blocks: Vec<Arc<Block>>,
    pub order: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Linear,
    Grid,
    Branching,
}

impl Document {
    /// Create an empty document with no sections.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            sections: Vec::new(),
            metadata: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Serialize to the canonical JSON wire shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from the canonical JSON wire shape.
    ///
    /// Callers ingesting legacy payloads should follow up with the
    /// sanitize pass in `folio-common`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn find_section(&self, section_id: &str) -> Option<&Arc<Section>> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    /// Locate a flow anywhere in the tree as `(section index, flow index)`.
    pub fn flow_path(&self, flow_id: &str) -> Option<(usize, usize)> {
        self.sections.iter().enumerate().find_map(|(si, section)| {
            section
                .flows
                .iter()
                .position(|f| f.id == flow_id)
                .map(|fi| (si, fi))
        })
    }

    /// Locate a block anywhere in the tree as
    /// `(section index, flow index, block index)`.
    pub fn block_path(&self, block_id: &str) -> Option<(usize, usize, usize)> {
        self.sections.iter().enumerate().find_map(|(si, section)| {
            section.flows.iter().enumerate().find_map(|(fi, flow)| {
                flow.blocks
                    .iter()
                    .position(|b| b.id == block_id)
                    .map(|bi| (si, fi, bi))
            })
        })
    }

    pub fn find_block(&self, block_id: &str) -> Option<&Arc<Block>> {
        let (si, fi, bi) = self.block_path(block_id)?;
        Some(&self.sections[si].flows[fi].blocks[bi])
    }

    /// Next available section `order` (current max + 1).
    pub fn next_section_order(&self) -> u32 {
        self.sections.iter().map(|s| s.order).max().unwrap_or(0) + 1
    }

    /// Index at which a section with `order` keeps the list sorted.
    /// Ties resolve after existing entries (insertion order).
    pub fn section_insertion_index(&self, order: u32) -> usize {
        self.sections
            .iter()
            .position(|s| s.order > order)
            .unwrap_or(self.sections.len())
    }

    pub fn has_section_order(&self, order: u32) -> bool {
        self.sections.iter().any(|s| s.order == order)
    }
}

impl Section {
    /// Create an empty section with the default page master and the
    /// `standard` layout intent.
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            page_master: PageMaster::default(),
            layout_intent: LayoutIntent::Standard,
            flows: Vec::new(),
            order,
            legacy_blocks: Vec::new(),
        }
    }

    pub fn find_flow(&self, flow_id: &str) -> Option<&Arc<Flow>> {
        self.flows.iter().find(|f| f.id == flow_id)
    }

    pub fn flow_index(&self, flow_id: &str) -> Option<usize> {
        self.flows.iter().position(|f| f.id == flow_id)
    }

    /// Next available flow `order` within this section.
    pub fn next_flow_order(&self) -> u32 {
        self.flows.iter().map(|f| f.order).max().unwrap_or(0) + 1
    }

    pub fn flow_insertion_index(&self, order: u32) -> usize {
        self.flows
            .iter()
            .position(|f| f.order > order)
            .unwrap_or(self.flows.len())
    }

    pub fn has_flow_order(&self, order: u32) -> bool {
        self.flows.iter().any(|f| f.order == order)
    }

    /// Whether this section carries quarantined direct-block data.
    pub fn has_legacy_blocks(&self) -> bool {
        !self.legacy_blocks.is_empty()
    }

    /// Drain quarantined direct-block data, returning how many entries
    /// were discarded.
    pub fn take_legacy_blocks(&mut self) -> usize {
        let count = self.legacy_blocks.len();
        self.legacy_blocks.clear();
        count
    }
}

impl Flow {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: FlowKind::Linear,
            blocks: Vec::new(),
            order,
        }
    }

    pub fn block_index(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }
}
