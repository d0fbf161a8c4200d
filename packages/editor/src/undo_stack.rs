//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each mutation's inverse is computed against the pre-state before the
//!   mutation is applied
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original mutations
//! - New mutations clear the redo stack
//! - Supports batched operations (group multiple mutations as one undo step)
//!
//! Because mutations are pure, `apply`/`undo`/`redo` hand back the next
//! `Document` value instead of editing in place; the session owns the
//! swap.

use folio_model::Document;

use crate::mutations::{Mutation, MutationError};

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// The inverse mutations (in reverse order for undo)
    pub inverses: Vec<Mutation>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation, record it for undo, and return the next document
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        doc: &Document,
    ) -> Result<Document, MutationError> {
        // Generate inverse before applying
        let inverse = mutation.invert(doc)?;

        let next = mutation.apply(doc)?;

        // Record for undo
        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.inverses.insert(0, inverse); // Inverses go in reverse order
        } else {
            self.push_batch(MutationBatch::single(mutation.clone(), inverse));
        }

        Ok(next)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(MutationBatch {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        });
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// Undo the most recent batch, returning the restored document
    pub fn undo(&mut self, doc: &Document) -> Result<Option<Document>, MutationError> {
        if let Some(batch) = self.undo_stack.pop() {
            let mut next = doc.clone();
            for inverse in &batch.inverses {
                next = inverse.apply(&next)?;
            }

            self.redo_stack.push(batch);
            Ok(Some(next))
        } else {
            Ok(None) // Nothing to undo
        }
    }

    /// Redo the most recently undone batch
    pub fn redo(&mut self, doc: &Document) -> Result<Option<Document>, MutationError> {
        if let Some(batch) = self.redo_stack.pop() {
            let mut next = doc.clone();
            for mutation in &batch.mutations {
                next = mutation.apply(&next)?;
            }

            self.undo_stack.push(batch);
            Ok(Some(next))
        } else {
            Ok(None) // Nothing to redo
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::BlockUpdate;
    use folio_model::{Block, BlockContent, Flow, Section};
    use std::sync::Arc;

    fn fixture() -> Document {
        let mut doc = Document::new("doc-1", "Test");
        let mut section = Section::new("s-1", "Body", 1);
        let mut flow = Flow::new("f-1", "Main", 1);
        flow.blocks.push(Arc::new(Block::new(
            "b-1",
            BlockContent::Paragraph {
                text: "Hello".to_string(),
            },
        )));
        section.flows.push(Arc::new(flow));
        doc.sections.push(Arc::new(section));
        doc
    }

    fn set_text(block_id: &str, text: &str) -> Mutation {
        Mutation::UpdateBlock {
            block_id: block_id.to_string(),
            update: BlockUpdate {
                content: Some(BlockContent::Paragraph {
                    text: text.to_string(),
                }),
                ..BlockUpdate::default()
            },
        }
    }

    fn text_of(doc: &Document, block_id: &str) -> String {
        match &doc.find_block(block_id).unwrap().content {
            BlockContent::Paragraph { text } => text.clone(),
            other => panic!("expected paragraph, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_and_undo_text_mutation() {
        let doc = fixture();
        let mut stack = UndoStack::new();

        let doc = stack.apply(&set_text("b-1", "World"), &doc).unwrap();
        assert_eq!(text_of(&doc, "b-1"), "World");
        assert_eq!(stack.undo_levels(), 1);
        assert!(stack.can_undo());

        let doc = stack.undo(&doc).unwrap().expect("undo available");
        assert_eq!(text_of(&doc, "b-1"), "Hello");
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 1);

        let doc = stack.redo(&doc).unwrap().expect("redo available");
        assert_eq!(text_of(&doc, "b-1"), "World");
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_batched_mutations() {
        let doc = fixture();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        stack.set_batch_description("Update greeting");

        let doc = stack.apply(&set_text("b-1", "World"), &doc).unwrap();
        let doc = stack.apply(&set_text("b-1", "Everyone!"), &doc).unwrap();

        stack.end_batch();

        // One batch with 2 mutations.
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Update greeting"));

        // Undo reverts both.
        let doc = stack.undo(&doc).unwrap().unwrap();
        assert_eq!(text_of(&doc, "b-1"), "Hello");
        assert_eq!(stack.undo_levels(), 0);
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let doc = fixture();
        let mut stack = UndoStack::new();

        let doc = stack.apply(&set_text("b-1", "World"), &doc).unwrap();
        let doc = stack.undo(&doc).unwrap().unwrap();
        assert_eq!(stack.redo_levels(), 1);

        let _doc = stack.apply(&set_text("b-1", "Everyone"), &doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = fixture();
        let mut stack = UndoStack::with_max_levels(2);

        for i in 0..3 {
            doc = stack
                .apply(&set_text("b-1", &format!("Text {}", i)), &doc)
                .unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_undo_structural_batch_restores_tree() {
        let doc = fixture();
        let mut stack = UndoStack::new();

        stack.begin_batch();
        let next = stack
            .apply(
                &Mutation::InsertBlock {
                    section_id: "s-1".to_string(),
                    flow_id: "f-1".to_string(),
                    block: Block::new("b-2", BlockContent::Divider),
                    insert_after: None,
                },
                &doc,
            )
            .unwrap();
        let next = stack
            .apply(
                &Mutation::RemoveBlock {
                    block_id: "b-1".to_string(),
                },
                &next,
            )
            .unwrap();
        stack.end_batch();

        let restored = stack.undo(&next).unwrap().unwrap();
        assert_eq!(restored.sections, doc.sections);
    }
}
