use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::toc_config::TocConfig;

/// A typed content block.
///
/// The `id` is stable across edits and is the join key for version
/// diffing. The content payload's shape is determined by the `type` tag;
/// the two serialize side by side as `{"type": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(flatten)]
    pub content: BlockContent,
    #[serde(default, skip_serializing_if = "BlockMetadata::is_empty")]
    pub metadata: BlockMetadata,
    #[serde(rename = "paginationRules", default)]
    pub pagination_rules: PaginationRules,
}

/// Content payload, one variant per block type.
///
/// Consumers pattern-match on the variant; no field is shared across
/// variants except by coincidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum BlockContent {
    Heading { text: String, level: u8 },

    Paragraph {
        text: String,
    },

    Quote {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },

    OrderedList {
        items: Vec<String>,
    },

    UnorderedList {
        items: Vec<String>,
    },

    #[serde(rename_all = "camelCase")]
    Figure {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
    },

    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },

    Chart {
        kind: ChartKind,
        series: Vec<ChartSeries>,
    },

    #[serde(rename_all = "camelCase")]
    CrossReference {
        target_block_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    Divider,

    Spacer {
        height: f64,
    },

    TableOfContents(TocConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<f64>,
}

/// Presentation hints attached to a block. All fields are optional; the
/// rendering consumer interprets them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<BlockMargins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<WidthMode>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub hints: BTreeMap<String, String>,
}

/// Block-level margins in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthMode {
    Auto,
    Full,
    Narrow,
}

/// Page-break behavior for a block. All rules default to off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationRules {
    pub keep_with_next: bool,
    pub break_before: bool,
    pub break_after: bool,
    pub break_avoid: bool,
}

impl Block {
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            content,
            metadata: BlockMetadata::default(),
            pagination_rules: PaginationRules::default(),
        }
    }

    /// Heading level (1-6) when this block is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match &self.content {
            BlockContent::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }
}

impl BlockContent {
    /// The wire tag for this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockContent::Heading { .. } => "heading",
            BlockContent::Paragraph { .. } => "paragraph",
            BlockContent::Quote { .. } => "quote",
            BlockContent::OrderedList { .. } => "ordered-list",
            BlockContent::UnorderedList { .. } => "unordered-list",
            BlockContent::Figure { .. } => "figure",
            BlockContent::Table { .. } => "table",
            BlockContent::Chart { .. } => "chart",
            BlockContent::CrossReference { .. } => "cross-reference",
            BlockContent::Divider => "divider",
            BlockContent::Spacer { .. } => "spacer",
            BlockContent::TableOfContents(_) => "table-of-contents",
        }
    }

    /// Whether this content may rotate to landscape when wider than its
    /// column and the page master permits rotation.
    pub fn is_rotatable(&self) -> bool {
        matches!(
            self,
            BlockContent::Table { .. } | BlockContent::Chart { .. }
        )
    }
}

impl BlockMetadata {
    pub fn is_empty(&self) -> bool {
        self.margins.is_none() && self.width.is_none() && self.hints.is_empty()
    }
}
