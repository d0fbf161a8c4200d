//! # Document Mutations
//!
//! High-level semantic operations on Folio documents.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each mutation represents a semantic operation
//! 2. **Validated**: All mutations validate structural constraints first
//! 3. **Pure**: `apply` never touches the input; it returns a new
//!    `Document` that shares untouched subtrees with the old one
//! 4. **Invertible**: every mutation can compute its inverse against the
//!    pre-state, which is what the undo stack records
//!
//! ## Mutation Semantics
//!
//! ### Insert*
//! - Node ids must be fresh; `order` values must not collide
//! - Blocks insert at the end of a flow, or after a named sibling
//!
//! ### UpdateBlock / UpdateSection
//! - Shallow merge per field group: a provided group replaces that group
//!   wholesale, absent groups are untouched
//! - Applying a non-custom layout intent overwrites the section's
//!   PageMaster with the intent's canonical one
//!
//! ### MoveBlock
//! - Atomic relocation to a target flow at an index (clamped to length)
//!
//! ### Remove*
//! - Removes the node and all descendants; blocks are destroyed only by
//!   explicit removal, never implicitly

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_model::{
    Block, BlockContent, BlockMetadata, Document, Flow, LayoutIntent, PageMaster, PaginationRules,
    Section,
};

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Append a section, keeping sections sorted by `order`
    InsertSection { section: Section },

    /// Remove a section and everything in it
    RemoveSection { section_id: String },

    /// Merge a partial update into a section
    UpdateSection {
        section_id: String,
        update: SectionUpdate,
    },

    /// Add a flow to a section, keeping flows sorted by `order`
    InsertFlow { section_id: String, flow: Flow },

    /// Remove a flow and its blocks
    RemoveFlow { flow_id: String },

    /// Add a block to a flow, at the end or after a named sibling
    InsertBlock {
        section_id: String,
        flow_id: String,
        block: Block,
        insert_after: Option<String>,
    },

    /// Remove a block from its owning flow
    RemoveBlock { block_id: String },

    /// Merge a partial update into a block
    UpdateBlock {
        block_id: String,
        update: BlockUpdate,
    },

    /// Move a block to a target flow at an index
    MoveBlock {
        block_id: String,
        flow_id: String,
        index: usize,
    },
}

/// Partial update for a section. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub page_master: Option<PageMaster>,
    pub layout_intent: Option<LayoutIntent>,
}

/// Partial update for a block. Each provided field group replaces that
/// group wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockUpdate {
    pub content: Option<BlockContent>,
    pub metadata: Option<BlockMetadata>,
    pub pagination_rules: Option<PaginationRules>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Flow not found: {0}")]
    FlowNotFound(String),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Insertion point not found: {0}")]
    InsertionPointNotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Order value {order} already used by another {scope}")]
    OrderConflict { scope: &'static str, order: u32 },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

impl Mutation {
    /// Short operation name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::InsertSection { .. } => "insert-section",
            Mutation::RemoveSection { .. } => "remove-section",
            Mutation::UpdateSection { .. } => "update-section",
            Mutation::InsertFlow { .. } => "insert-flow",
            Mutation::RemoveFlow { .. } => "remove-flow",
            Mutation::InsertBlock { .. } => "insert-block",
            Mutation::RemoveBlock { .. } => "remove-block",
            Mutation::UpdateBlock { .. } => "update-block",
            Mutation::MoveBlock { .. } => "move-block",
        }
    }

    /// Apply the mutation, returning the updated document.
    ///
    /// Only the path from the root to the mutated node is rebuilt;
    /// untouched siblings remain shared with the input document.
    pub fn apply(&self, doc: &Document) -> Result<Document, MutationError> {
        // Validate first
        self.validate(doc)?;

        match self {
            Mutation::InsertSection { section } => Self::apply_insert_section(doc, section),
            Mutation::RemoveSection { section_id } => Self::apply_remove_section(doc, section_id),
            Mutation::UpdateSection { section_id, update } => {
                Self::apply_update_section(doc, section_id, update)
            }
            Mutation::InsertFlow { section_id, flow } => {
                Self::apply_insert_flow(doc, section_id, flow)
            }
            Mutation::RemoveFlow { flow_id } => Self::apply_remove_flow(doc, flow_id),
            Mutation::InsertBlock {
                section_id,
                flow_id,
                block,
                insert_after,
            } => Self::apply_insert_block(doc, section_id, flow_id, block, insert_after.as_deref()),
            Mutation::RemoveBlock { block_id } => Self::apply_remove_block(doc, block_id),
            Mutation::UpdateBlock { block_id, update } => {
                Self::apply_update_block(doc, block_id, update)
            }
            Mutation::MoveBlock {
                block_id,
                flow_id,
                index,
            } => Self::apply_move_block(doc, block_id, flow_id, *index),
        }
    }

    /// Validate without applying.
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertSection { section } => {
                if doc.find_section(&section.id).is_some() {
                    return Err(MutationError::DuplicateId(section.id.clone()));
                }
                if doc.has_section_order(section.order) {
                    return Err(MutationError::OrderConflict {
                        scope: "section",
                        order: section.order,
                    });
                }
                Ok(())
            }

            Mutation::RemoveSection { section_id } | Mutation::UpdateSection { section_id, .. } => {
                doc.find_section(section_id)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))
            }

            Mutation::InsertFlow { section_id, flow } => {
                let section = doc
                    .find_section(section_id)
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;
                if doc.flow_path(&flow.id).is_some() {
                    return Err(MutationError::DuplicateId(flow.id.clone()));
                }
                if section.has_flow_order(flow.order) {
                    return Err(MutationError::OrderConflict {
                        scope: "flow",
                        order: flow.order,
                    });
                }
                Ok(())
            }

            Mutation::RemoveFlow { flow_id } => doc
                .flow_path(flow_id)
                .map(|_| ())
                .ok_or_else(|| MutationError::FlowNotFound(flow_id.clone())),

            Mutation::InsertBlock {
                section_id,
                flow_id,
                block,
                insert_after,
            } => {
                let section = doc
                    .find_section(section_id)
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;
                let flow = section
                    .find_flow(flow_id)
                    .ok_or_else(|| MutationError::FlowNotFound(flow_id.clone()))?;
                if doc.block_path(&block.id).is_some() {
                    return Err(MutationError::DuplicateId(block.id.clone()));
                }
                if let Some(after) = insert_after {
                    if flow.block_index(after).is_none() {
                        return Err(MutationError::InsertionPointNotFound(after.clone()));
                    }
                }
                Ok(())
            }

            Mutation::RemoveBlock { block_id } | Mutation::UpdateBlock { block_id, .. } => doc
                .block_path(block_id)
                .map(|_| ())
                .ok_or_else(|| MutationError::BlockNotFound(block_id.clone())),

            Mutation::MoveBlock {
                block_id, flow_id, ..
            } => {
                doc.block_path(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                doc.flow_path(flow_id)
                    .ok_or_else(|| MutationError::FlowNotFound(flow_id.clone()))?;
                Ok(())
            }
        }
    }

    /// Compute the inverse mutation against the pre-state.
    ///
    /// Applying the inverse to the post-state restores the pre-state.
    pub fn invert(&self, doc: &Document) -> Result<Mutation, MutationError> {
        match self {
            Mutation::InsertSection { section } => Ok(Mutation::RemoveSection {
                section_id: section.id.clone(),
            }),

            Mutation::RemoveSection { section_id } => {
                let section = doc
                    .find_section(section_id)
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;
                Ok(Mutation::InsertSection {
                    section: (**section).clone(),
                })
            }

            Mutation::UpdateSection { section_id, update } => {
                let prev = doc
                    .find_section(section_id)
                    .ok_or_else(|| MutationError::SectionNotFound(section_id.clone()))?;
                let mut inverse = SectionUpdate::default();
                if update.name.is_some() {
                    inverse.name = Some(prev.name.clone());
                }
                if update.description.is_some() {
                    inverse.description = Some(prev.description.clone());
                }
                // A non-custom intent overwrites the page master, so the
                // inverse must restore it too.
                let overwrites_master = update.page_master.is_some()
                    || update
                        .layout_intent
                        .is_some_and(|intent| intent.canonical_page_master().is_some());
                if overwrites_master {
                    inverse.page_master = Some(prev.page_master.clone());
                }
                if update.layout_intent.is_some() {
                    inverse.layout_intent = Some(prev.layout_intent);
                }
                Ok(Mutation::UpdateSection {
                    section_id: section_id.clone(),
                    update: inverse,
                })
            }

            Mutation::InsertFlow { flow, .. } => Ok(Mutation::RemoveFlow {
                flow_id: flow.id.clone(),
            }),

            Mutation::RemoveFlow { flow_id } => {
                let (si, fi) = doc
                    .flow_path(flow_id)
                    .ok_or_else(|| MutationError::FlowNotFound(flow_id.clone()))?;
                Ok(Mutation::InsertFlow {
                    section_id: doc.sections[si].id.clone(),
                    flow: (*doc.sections[si].flows[fi]).clone(),
                })
            }

            Mutation::InsertBlock { block, .. } => Ok(Mutation::RemoveBlock {
                block_id: block.id.clone(),
            }),

            Mutation::RemoveBlock { block_id } => {
                let (si, fi, bi) = doc
                    .block_path(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                let flow = &doc.sections[si].flows[fi];
                Ok(Mutation::InsertBlock {
                    section_id: doc.sections[si].id.clone(),
                    flow_id: flow.id.clone(),
                    block: (*flow.blocks[bi]).clone(),
                    insert_after: (bi > 0).then(|| flow.blocks[bi - 1].id.clone()),
                })
            }

            Mutation::UpdateBlock { block_id, update } => {
                let prev = doc
                    .find_block(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                let mut inverse = BlockUpdate::default();
                if update.content.is_some() {
                    inverse.content = Some(prev.content.clone());
                }
                if update.metadata.is_some() {
                    inverse.metadata = Some(prev.metadata.clone());
                }
                if update.pagination_rules.is_some() {
                    inverse.pagination_rules = Some(prev.pagination_rules);
                }
                Ok(Mutation::UpdateBlock {
                    block_id: block_id.clone(),
                    update: inverse,
                })
            }

            Mutation::MoveBlock { block_id, .. } => {
                let (si, fi, bi) = doc
                    .block_path(block_id)
                    .ok_or_else(|| MutationError::BlockNotFound(block_id.clone()))?;
                Ok(Mutation::MoveBlock {
                    block_id: block_id.clone(),
                    flow_id: doc.sections[si].flows[fi].id.clone(),
                    index: bi,
                })
            }
        }
    }

    fn apply_insert_section(doc: &Document, section: &Section) -> Result<Document, MutationError> {
        let mut next = doc.clone();
        let index = next.section_insertion_index(section.order);
        next.sections.insert(index, Arc::new(section.clone()));
        Ok(next)
    }

    fn apply_remove_section(doc: &Document, section_id: &str) -> Result<Document, MutationError> {
        let mut next = doc.clone();
        let index = next
            .section_index(section_id)
            .ok_or_else(|| MutationError::SectionNotFound(section_id.to_string()))?;
        next.sections.remove(index);
        Ok(next)
    }

    fn apply_update_section(
        doc: &Document,
        section_id: &str,
        update: &SectionUpdate,
    ) -> Result<Document, MutationError> {
        with_section(doc, section_id, |section| {
            if let Some(name) = &update.name {
                section.name = name.clone();
            }
            if let Some(description) = &update.description {
                section.description = description.clone();
            }
            if let Some(intent) = update.layout_intent {
                section.layout_intent = intent;
                // Presets overwrite the page master wholesale; `custom`
                // leaves the current one untouched.
                if let Some(master) = intent.canonical_page_master() {
                    section.page_master = master;
                }
            }
            if let Some(master) = &update.page_master {
                section.page_master = master.clone();
            }
            Ok(())
        })
    }

    fn apply_insert_flow(
        doc: &Document,
        section_id: &str,
        flow: &Flow,
    ) -> Result<Document, MutationError> {
        with_section(doc, section_id, |section| {
            let index = section.flow_insertion_index(flow.order);
            section.flows.insert(index, Arc::new(flow.clone()));
            Ok(())
        })
    }

    fn apply_remove_flow(doc: &Document, flow_id: &str) -> Result<Document, MutationError> {
        let mut next = doc.clone();
        let (si, fi) = next
            .flow_path(flow_id)
            .ok_or_else(|| MutationError::FlowNotFound(flow_id.to_string()))?;
        Arc::make_mut(&mut next.sections[si]).flows.remove(fi);
        Ok(next)
    }

    fn apply_insert_block(
        doc: &Document,
        section_id: &str,
        flow_id: &str,
        block: &Block,
        insert_after: Option<&str>,
    ) -> Result<Document, MutationError> {
        with_flow_in_section(doc, section_id, flow_id, |flow| {
            let index = match insert_after {
                Some(after) => {
                    flow.block_index(after)
                        .ok_or_else(|| MutationError::InsertionPointNotFound(after.to_string()))?
                        + 1
                }
                None => flow.blocks.len(),
            };
            flow.blocks.insert(index, Arc::new(block.clone()));
            Ok(())
        })
    }

    fn apply_remove_block(doc: &Document, block_id: &str) -> Result<Document, MutationError> {
        let mut next = doc.clone();
        let (si, fi, bi) = next
            .block_path(block_id)
            .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))?;
        let section = Arc::make_mut(&mut next.sections[si]);
        Arc::make_mut(&mut section.flows[fi]).blocks.remove(bi);
        Ok(next)
    }

    fn apply_update_block(
        doc: &Document,
        block_id: &str,
        update: &BlockUpdate,
    ) -> Result<Document, MutationError> {
        let mut next = doc.clone();
        let (si, fi, bi) = next
            .block_path(block_id)
            .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))?;
        let section = Arc::make_mut(&mut next.sections[si]);
        let flow = Arc::make_mut(&mut section.flows[fi]);
        let block = Arc::make_mut(&mut flow.blocks[bi]);

        if let Some(content) = &update.content {
            block.content = content.clone();
        }
        if let Some(metadata) = &update.metadata {
            block.metadata = metadata.clone();
        }
        if let Some(rules) = update.pagination_rules {
            block.pagination_rules = rules;
        }
        Ok(next)
    }

    fn apply_move_block(
        doc: &Document,
        block_id: &str,
        flow_id: &str,
        index: usize,
    ) -> Result<Document, MutationError> {
        let mut next = doc.clone();

        // Detach from the current owner.
        let (si, fi, bi) = next
            .block_path(block_id)
            .ok_or_else(|| MutationError::BlockNotFound(block_id.to_string()))?;
        let section = Arc::make_mut(&mut next.sections[si]);
        let block = Arc::make_mut(&mut section.flows[fi]).blocks.remove(bi);

        // Attach to the target flow at the clamped index.
        let (ti, tf) = next
            .flow_path(flow_id)
            .ok_or_else(|| MutationError::FlowNotFound(flow_id.to_string()))?;
        let target_section = Arc::make_mut(&mut next.sections[ti]);
        let target = Arc::make_mut(&mut target_section.flows[tf]);
        let insert_index = index.min(target.blocks.len());
        target.blocks.insert(insert_index, block);
        Ok(next)
    }
}

/// Rebuild the path to one section and hand its copy to `f`; sibling
/// sections stay shared with the input document.
fn with_section<F>(doc: &Document, section_id: &str, f: F) -> Result<Document, MutationError>
where
    F: FnOnce(&mut Section) -> Result<(), MutationError>,
{
    let mut next = doc.clone();
    let index = next
        .section_index(section_id)
        .ok_or_else(|| MutationError::SectionNotFound(section_id.to_string()))?;
    f(Arc::make_mut(&mut next.sections[index]))?;
    Ok(next)
}

/// Rebuild the path to one flow, addressed through its owning section.
fn with_flow_in_section<F>(
    doc: &Document,
    section_id: &str,
    flow_id: &str,
    f: F,
) -> Result<Document, MutationError>
where
    F: FnOnce(&mut Flow) -> Result<(), MutationError>,
{
    let mut next = doc.clone();
    let si = next
        .section_index(section_id)
        .ok_or_else(|| MutationError::SectionNotFound(section_id.to_string()))?;
    let section = Arc::make_mut(&mut next.sections[si]);
    let fi = section
        .flow_index(flow_id)
        .ok_or_else(|| MutationError::FlowNotFound(flow_id.to_string()))?;
    f(Arc::make_mut(&mut section.flows[fi]))?;
    Ok(next)
}
