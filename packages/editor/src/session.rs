//! # Edit Session Management
//!
//! An `EditSession` is one editor's view of a single live document: the
//! explicit context object every core operation goes through. There is no
//! ambient "current document" — independent sessions (and tests) coexist
//! without cross-talk.
//!
//! The session owns the effectful edges the pure core must not touch:
//! fresh node IDs, `updated_at` stamping, undo bookkeeping, and the
//! snapshot/revert protocol against a persistence collaborator.

use chrono::Utc;
use tracing::{debug, info};

use folio_common::{sanitize_document, Warning};
use folio_model::{Block, BlockContent, Document, Flow, IdGenerator, Section};

use crate::errors::EditorError;
use crate::mutations::{BlockUpdate, Mutation, MutationError, SectionUpdate};
use crate::undo_stack::UndoStack;
use crate::versioning::{DocumentVersion, PersistenceProvider, SafetyPolicy, VersionType};

/// Single edit session: one editor, one live document.
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited
    document: Document,

    /// Edit counter (increments on each applied mutation, undo, redo and
    /// revert)
    version: u64,

    /// Stable node ID generator, seeded from the document identity
    ids: IdGenerator,

    /// Mutation history
    undo_stack: UndoStack,
}

impl EditSession {
    /// Create a session around a brand-new empty document.
    pub fn create_document(
        session_id: impl Into<String>,
        document_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self::open(session_id, Document::new(document_id, title))
    }

    /// Open a session on an existing document.
    ///
    /// The ID generator resumes past every node ID already present, so
    /// fresh IDs never collide with persisted ones.
    pub fn open(session_id: impl Into<String>, document: Document) -> Self {
        let ids = IdGenerator::resuming(&document.id, all_node_ids(&document).into_iter());
        Self {
            id: session_id.into(),
            document,
            version: 0,
            ids,
            undo_stack: UndoStack::new(),
        }
    }

    /// Load a document through the persistence collaborator and open a
    /// session on it, sanitizing legacy payload data on the way in.
    pub fn load(
        session_id: impl Into<String>,
        document_id: &str,
        store: &dyn PersistenceProvider,
    ) -> Result<(Self, Vec<Warning>), EditorError> {
        let mut document = store.load(document_id)?;
        let warnings = sanitize_document(&mut document);
        Ok((Self::open(session_id, document), warnings))
    }

    /// The live document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Edit counter; increments on every state change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply a raw mutation with undo support.
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EditorError> {
        let next = self.undo_stack.apply(&mutation, &self.document)?;
        self.document = next;
        self.document.updated_at = Utc::now();
        self.version += 1;
        debug!(session = %self.id, op = mutation.kind(), version = self.version, "applied mutation");
        Ok(())
    }

    // ---- Structural operations ------------------------------------------

    /// Append a new section with the default page master; returns its id.
    pub fn add_section(&mut self, name: &str) -> Result<String, EditorError> {
        let id = self.ids.new_id();
        let section = Section::new(id.clone(), name, self.document.next_section_order());
        self.apply(Mutation::InsertSection { section })?;
        Ok(id)
    }

    /// Append a new linear flow to a section; returns its id.
    pub fn add_flow(&mut self, section_id: &str, name: &str) -> Result<String, EditorError> {
        let order = self
            .document
            .find_section(section_id)
            .ok_or_else(|| MutationError::SectionNotFound(section_id.to_string()))?
            .next_flow_order();
        let id = self.ids.new_id();
        self.apply(Mutation::InsertFlow {
            section_id: section_id.to_string(),
            flow: Flow::new(id.clone(), name, order),
        })?;
        Ok(id)
    }

    /// Append a new block to a flow; returns its id.
    pub fn add_block(
        &mut self,
        section_id: &str,
        flow_id: &str,
        content: BlockContent,
    ) -> Result<String, EditorError> {
        self.insert_block(section_id, flow_id, content, None)
    }

    /// Insert a new block after an existing sibling; returns its id.
    pub fn add_block_after(
        &mut self,
        section_id: &str,
        flow_id: &str,
        content: BlockContent,
        after_block_id: &str,
    ) -> Result<String, EditorError> {
        self.insert_block(section_id, flow_id, content, Some(after_block_id))
    }

    fn insert_block(
        &mut self,
        section_id: &str,
        flow_id: &str,
        content: BlockContent,
        insert_after: Option<&str>,
    ) -> Result<String, EditorError> {
        let id = self.ids.new_id();
        self.apply(Mutation::InsertBlock {
            section_id: section_id.to_string(),
            flow_id: flow_id.to_string(),
            block: Block::new(id.clone(), content),
            insert_after: insert_after.map(str::to_string),
        })?;
        Ok(id)
    }

    /// Merge a partial update into a block.
    pub fn update_block(&mut self, block_id: &str, update: BlockUpdate) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateBlock {
            block_id: block_id.to_string(),
            update,
        })
    }

    /// Remove a block from its owning flow.
    pub fn delete_block(&mut self, block_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveBlock {
            block_id: block_id.to_string(),
        })
    }

    /// Merge a partial update into a section.
    pub fn update_section(
        &mut self,
        section_id: &str,
        update: SectionUpdate,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateSection {
            section_id: section_id.to_string(),
            update,
        })
    }

    /// Remove a section and everything in it.
    pub fn delete_section(&mut self, section_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveSection {
            section_id: section_id.to_string(),
        })
    }

    /// Remove a flow and its blocks.
    pub fn delete_flow(&mut self, flow_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveFlow {
            flow_id: flow_id.to_string(),
        })
    }

    /// Move a block to a target flow at an index (clamped to length).
    pub fn move_block(
        &mut self,
        block_id: &str,
        flow_id: &str,
        index: usize,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::MoveBlock {
            block_id: block_id.to_string(),
            flow_id: flow_id.to_string(),
            index,
        })
    }

    // ---- History --------------------------------------------------------

    /// Group subsequent mutations into one undo step.
    pub fn begin_batch(&mut self, description: &str) {
        self.undo_stack.begin_batch();
        self.undo_stack.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.undo_stack.end_batch();
    }

    /// Undo the most recent mutation/batch. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        match self.undo_stack.undo(&self.document)? {
            Some(next) => {
                self.document = next;
                self.document.updated_at = Utc::now();
                self.version += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Redo the most recently undone mutation/batch.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        match self.undo_stack.redo(&self.document)? {
            Some(next) => {
                self.document = next;
                self.document.updated_at = Utc::now();
                self.version += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    // ---- Snapshots ------------------------------------------------------

    /// Take a manual snapshot of the live document.
    pub fn snapshot(
        &self,
        store: &mut dyn PersistenceProvider,
        label: &str,
    ) -> Result<DocumentVersion, EditorError> {
        Ok(store.create_version(&self.document, label, VersionType::Manual)?)
    }

    /// Replace the live document with a snapshot's content.
    ///
    /// Two-step protocol: a `safety` snapshot of the current state is
    /// created first (unless the caller explicitly skips it), so the
    /// pre-revert state is always recoverable. Undo history does not
    /// survive a revert.
    pub fn revert_to(
        &mut self,
        version: &DocumentVersion,
        store: &mut dyn PersistenceProvider,
        policy: SafetyPolicy,
    ) -> Result<Option<DocumentVersion>, EditorError> {
        let safety = match policy {
            SafetyPolicy::CreateSnapshot => {
                Some(store.create_version(&self.document, "Before revert", VersionType::Safety)?)
            }
            SafetyPolicy::Skip => None,
        };

        self.document = Document::clone(&version.content);
        self.undo_stack.clear();
        self.version += 1;
        info!(
            session = %self.id,
            version_number = version.version_number,
            "reverted document to snapshot"
        );
        Ok(safety)
    }
}

fn all_node_ids(doc: &Document) -> Vec<&str> {
    let mut ids = Vec::new();
    for section in &doc.sections {
        ids.push(section.id.as_str());
        for flow in &section.flows {
            ids.push(flow.id.as_str());
            for block in &flow.blocks {
                ids.push(block.id.as_str());
            }
        }
    }
    ids
}
