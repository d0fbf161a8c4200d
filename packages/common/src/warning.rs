use std::fmt;

use serde::{Deserialize, Serialize};

/// Recoverable degradation reported while processing a document.
///
/// Warnings are values, not errors: the operation that produced one has
/// already degraded gracefully (ignored data, allowed overflow, omitted a
/// page number) and the document remains usable. Producers log each
/// warning via `tracing::warn!` in addition to returning it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// Legacy data attached blocks directly to a section; the blocks were
    /// ignored and will not be rendered or re-serialized.
    Schema {
        section_id: String,
        discarded_blocks: usize,
    },

    /// A block was taller than one full column and was placed at the top
    /// of a column, allowed to overflow.
    Overflow {
        block_id: String,
        height: f64,
        column_height: f64,
    },

    /// An outline entry references a section that has no computed layout;
    /// the entry was emitted without a page number.
    StaleReference {
        block_id: String,
        section_id: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Schema {
                section_id,
                discarded_blocks,
            } => write!(
                f,
                "section {} carried {} block(s) outside any flow; ignored",
                section_id, discarded_blocks
            ),
            Warning::Overflow {
                block_id,
                height,
                column_height,
            } => write!(
                f,
                "block {} ({}pt) exceeds column height ({}pt); allowed to overflow",
                block_id, height, column_height
            ),
            Warning::StaleReference {
                block_id,
                section_id,
            } => write!(
                f,
                "heading {} in section {} has no computed layout; page number omitted",
                block_id, section_id
            ),
        }
    }
}
