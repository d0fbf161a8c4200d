use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use folio_common::flatten_blocks;
use folio_model::{Block, Document};

/// One block's classification in a snapshot comparison.
///
/// `Modified` carries both versions so consumers can render either side;
/// owning section/flow ids come from the snapshot the block exists in
/// (the new one, for blocks present in both).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BlockDiff {
    Added {
        block: Arc<Block>,
        section_id: String,
        flow_id: String,
    },
    Removed {
        block: Arc<Block>,
        section_id: String,
        flow_id: String,
    },
    Modified {
        old: Arc<Block>,
        new: Arc<Block>,
        section_id: String,
        flow_id: String,
    },
    Unchanged {
        block: Arc<Block>,
        section_id: String,
        flow_id: String,
    },
}

impl BlockDiff {
    pub fn block_id(&self) -> &str {
        match self {
            BlockDiff::Added { block, .. }
            | BlockDiff::Removed { block, .. }
            | BlockDiff::Unchanged { block, .. } => &block.id,
            BlockDiff::Modified { new, .. } => &new.id,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, BlockDiff::Unchanged { .. })
    }
}

/// Tallied counts over a classified diff list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

/// The full classification of one snapshot pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDiff {
    pub entries: Vec<BlockDiff>,
    pub stats: DiffStats,
}

impl DocumentDiff {
    /// Entries with `unchanged` filtered out — the usual display set.
    pub fn changes(&self) -> impl Iterator<Item = &BlockDiff> {
        self.entries.iter().filter(|e| e.is_change())
    }
}

/// Compare two document snapshots structurally.
///
/// Entries follow the old snapshot's traversal order, with blocks new in
/// `new` appended in that snapshot's traversal order.
pub fn diff_documents(old: &Document, new: &Document) -> DocumentDiff {
    let old_flat = flatten_blocks(old);
    let new_flat = flatten_blocks(new);

    let new_by_id: HashMap<&str, &folio_common::FlatBlock<'_>> = new_flat
        .iter()
        .map(|entry| (entry.block.id.as_str(), entry))
        .collect();
    let old_ids: HashSet<&str> = old_flat
        .iter()
        .map(|entry| entry.block.id.as_str())
        .collect();

    let mut entries = Vec::with_capacity(old_flat.len() + new_flat.len());

    for old_entry in &old_flat {
        match new_by_id.get(old_entry.block.id.as_str()) {
            None => entries.push(BlockDiff::Removed {
                block: Arc::clone(old_entry.block),
                section_id: old_entry.section_id.to_string(),
                flow_id: old_entry.flow_id.to_string(),
            }),
            Some(new_entry) => {
                let old_block = old_entry.block;
                let new_block = new_entry.block;
                let changed = old_block.content != new_block.content
                    || old_block.metadata != new_block.metadata;
                if changed {
                    entries.push(BlockDiff::Modified {
                        old: Arc::clone(old_block),
                        new: Arc::clone(new_block),
                        section_id: new_entry.section_id.to_string(),
                        flow_id: new_entry.flow_id.to_string(),
                    });
                } else {
                    entries.push(BlockDiff::Unchanged {
                        block: Arc::clone(new_block),
                        section_id: new_entry.section_id.to_string(),
                        flow_id: new_entry.flow_id.to_string(),
                    });
                }
            }
        }
    }

    for new_entry in &new_flat {
        if !old_ids.contains(new_entry.block.id.as_str()) {
            entries.push(BlockDiff::Added {
                block: Arc::clone(new_entry.block),
                section_id: new_entry.section_id.to_string(),
                flow_id: new_entry.flow_id.to_string(),
            });
        }
    }

    let mut stats = DiffStats::default();
    for entry in &entries {
        match entry {
            BlockDiff::Added { .. } => stats.added += 1,
            BlockDiff::Removed { .. } => stats.removed += 1,
            BlockDiff::Modified { .. } => stats.modified += 1,
            BlockDiff::Unchanged { .. } => stats.unchanged += 1,
        }
    }

    DocumentDiff { entries, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{BlockContent, BlockMetadata, Flow, PaginationRules, Section, WidthMode};

    fn document(blocks: Vec<Block>) -> Document {
        let mut doc = Document::new("doc-1", "Test");
        let mut section = Section::new("s-1", "Body", 1);
        let mut flow = Flow::new("f-1", "Main", 1);
        flow.blocks = blocks.into_iter().map(Arc::new).collect();
        section.flows.push(Arc::new(flow));
        doc.sections.push(Arc::new(section));
        doc
    }

    fn paragraph(id: &str, text: &str) -> Block {
        Block::new(
            id,
            BlockContent::Paragraph {
                text: text.to_string(),
            },
        )
    }

    #[test]
    fn test_identical_snapshots_have_no_changes() {
        let old = document(vec![paragraph("b-1", "same"), paragraph("b-2", "also")]);
        let new = old.clone();

        let diff = diff_documents(&old, &new);
        assert_eq!(diff.stats.added, 0);
        assert_eq!(diff.stats.removed, 0);
        assert_eq!(diff.stats.modified, 0);
        assert_eq!(diff.stats.unchanged, 2);
        assert_eq!(diff.changes().count(), 0);
    }

    #[test]
    fn test_classification_by_id() {
        let old = document(vec![paragraph("b-1", "keep"), paragraph("b-2", "drop")]);
        let new = document(vec![
            paragraph("b-1", "keep but edited"),
            paragraph("b-3", "fresh"),
        ]);

        let diff = diff_documents(&old, &new);
        assert_eq!(diff.stats.modified, 1);
        assert_eq!(diff.stats.removed, 1);
        assert_eq!(diff.stats.added, 1);

        let statuses: Vec<(&str, bool)> = diff
            .entries
            .iter()
            .map(|e| (e.block_id(), e.is_change()))
            .collect();
        assert_eq!(
            statuses,
            vec![("b-1", true), ("b-2", true), ("b-3", true)]
        );
    }

    #[test]
    fn test_modified_carries_both_versions() {
        let old = document(vec![paragraph("b-1", "before")]);
        let new = document(vec![paragraph("b-1", "after")]);

        let diff = diff_documents(&old, &new);
        match &diff.entries[0] {
            BlockDiff::Modified {
                old: old_block,
                new: new_block,
                ..
            } => {
                assert_eq!(
                    old_block.content,
                    BlockContent::Paragraph {
                        text: "before".to_string()
                    }
                );
                assert_eq!(
                    new_block.content,
                    BlockContent::Paragraph {
                        text: "after".to_string()
                    }
                );
            }
            other => panic!("expected Modified, got {:?}", other),
        }
    }

    #[test]
    fn test_metadata_change_is_a_modification() {
        let old = document(vec![paragraph("b-1", "same")]);
        let mut edited = paragraph("b-1", "same");
        edited.metadata = BlockMetadata {
            width: Some(WidthMode::Full),
            ..BlockMetadata::default()
        };
        let new = document(vec![edited]);

        let diff = diff_documents(&old, &new);
        assert_eq!(diff.stats.modified, 1);
    }

    #[test]
    fn test_pagination_rule_change_alone_is_unchanged() {
        // Classification compares content and metadata; a rules-only
        // edit diffs as unchanged.
        let old = document(vec![paragraph("b-1", "same")]);
        let mut edited = paragraph("b-1", "same");
        edited.pagination_rules = PaginationRules {
            break_before: true,
            ..PaginationRules::default()
        };
        let new = document(vec![edited]);

        let diff = diff_documents(&old, &new);
        assert_eq!(diff.stats.unchanged, 1);
        assert_eq!(diff.stats.modified, 0);
    }

    #[test]
    fn test_delete_and_recreate_elsewhere_is_not_a_move() {
        let old = document(vec![paragraph("b-1", "wandering")]);
        // Same content, different id, different flow.
        let mut doc = Document::new("doc-1", "Test");
        let mut section = Section::new("s-1", "Body", 1);
        section.flows.push(Arc::new(Flow::new("f-1", "Main", 1)));
        let mut other = Flow::new("f-2", "Sidebar", 2);
        other
            .blocks
            .push(Arc::new(paragraph("b-9", "wandering")));
        section.flows.push(Arc::new(other));
        doc.sections.push(Arc::new(section));

        let diff = diff_documents(&old, &doc);
        assert_eq!(diff.stats.removed, 1);
        assert_eq!(diff.stats.added, 1);
        assert_eq!(diff.stats.modified, 0);
    }

    #[test]
    fn test_diff_classification_symmetry() {
        let a = document(vec![
            paragraph("b-1", "stays"),
            paragraph("b-2", "edited in b"),
            paragraph("b-3", "only in a"),
        ]);
        let b = document(vec![
            paragraph("b-1", "stays"),
            paragraph("b-2", "edited"),
            paragraph("b-4", "only in b"),
        ]);

        let forward = diff_documents(&a, &b);
        let backward = diff_documents(&b, &a);

        assert_eq!(forward.stats.added, backward.stats.removed);
        assert_eq!(forward.stats.removed, backward.stats.added);
        assert_eq!(forward.stats.modified, backward.stats.modified);

        // An added id in A→B is removed in B→A.
        let added_forward: Vec<&str> = forward
            .entries
            .iter()
            .filter_map(|e| match e {
                BlockDiff::Added { block, .. } => Some(block.id.as_str()),
                _ => None,
            })
            .collect();
        let removed_backward: Vec<&str> = backward
            .entries
            .iter()
            .filter_map(|e| match e {
                BlockDiff::Removed { block, .. } => Some(block.id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(added_forward, removed_backward);

        // Modified entries mirror old/new between directions.
        let forward_modified = forward.entries.iter().find_map(|e| match e {
            BlockDiff::Modified { old, new, .. } => Some((Arc::clone(old), Arc::clone(new))),
            _ => None,
        });
        let backward_modified = backward.entries.iter().find_map(|e| match e {
            BlockDiff::Modified { old, new, .. } => Some((Arc::clone(old), Arc::clone(new))),
            _ => None,
        });
        let (fo, fnew) = forward_modified.unwrap();
        let (bo, bnew) = backward_modified.unwrap();
        assert_eq!(fo, bnew);
        assert_eq!(fnew, bo);
    }

    #[test]
    fn test_diff_between_session_snapshots() {
        use folio_editor::{BlockUpdate, EditSession};

        let mut session = EditSession::create_document("client-1", "report", "Report");
        let section = session.add_section("Body").unwrap();
        let flow = session.add_flow(&section, "Main").unwrap();
        let kept = session
            .add_block(
                &section,
                &flow,
                BlockContent::Paragraph {
                    text: "draft".to_string(),
                },
            )
            .unwrap();
        let before = session.document().clone();

        let added = session
            .add_block(&section, &flow, BlockContent::Divider)
            .unwrap();
        session
            .update_block(
                &kept,
                BlockUpdate {
                    content: Some(BlockContent::Paragraph {
                        text: "final".to_string(),
                    }),
                    ..BlockUpdate::default()
                },
            )
            .unwrap();

        let diff = diff_documents(&before, session.document());
        assert_eq!(diff.stats.modified, 1);
        assert_eq!(diff.stats.added, 1);
        assert_eq!(diff.stats.removed, 0);

        let changed_ids: Vec<&str> = diff.changes().map(|e| e.block_id()).collect();
        assert!(changed_ids.contains(&kept.as_str()));
        assert!(changed_ids.contains(&added.as_str()));
    }

    #[test]
    fn test_snapshots_shared_by_reference() {
        // Diffing does not copy block payloads; entries share the
        // snapshot allocations.
        let old = document(vec![paragraph("b-1", "same")]);
        let new = old.clone();

        let diff = diff_documents(&old, &new);
        match &diff.entries[0] {
            BlockDiff::Unchanged { block, .. } => {
                assert!(Arc::ptr_eq(block, &new.sections[0].flows[0].blocks[0]));
            }
            other => panic!("expected Unchanged, got {:?}", other),
        }
    }
}
