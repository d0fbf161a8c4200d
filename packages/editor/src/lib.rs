//! # Folio Editor
//!
//! Core document editing engine for Folio.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: canonical Document tree              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: sessions + mutations                │
//! │  - Apply mutations with validation          │
//! │  - Undo/redo with inverse mutations         │
//! │  - Version snapshots + safety revert        │
//! │  - Persistence as a collaborator trait      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ layout / outline / diff: derived views      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is source of truth**: layouts, outlines and diffs are
//!    derived views, recomputed from it.
//! 2. **Mutations are pure**: `Mutation::apply` takes `&Document` and
//!    returns a new `Document`, rebuilding only the path from the root to
//!    the mutated node; untouched siblings stay shared behind `Arc`.
//! 3. **No ambient state**: the live document lives in an `EditSession`
//!    passed explicitly; independent sessions never interact.
//! 4. **Snapshots are immutable**: a `DocumentVersion` is never edited;
//!    revert replaces the live document wholesale, after a safety
//!    snapshot secures the prior state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{BlockUpdate, EditSession};
//! use folio_model::BlockContent;
//!
//! let mut session = EditSession::create_document("client-1", "report", "Annual Report");
//! let section = session.add_section("Introduction")?;
//! let flow = session.add_flow(&section, "Main")?;
//! let block = session.add_block(&section, &flow, BlockContent::Paragraph {
//!     text: "It was a dark and stormy quarter.".to_string(),
//! })?;
//!
//! session.update_block(&block, BlockUpdate {
//!     content: Some(BlockContent::Paragraph { text: "Revised.".to_string() }),
//!     ..BlockUpdate::default()
//! })?;
//!
//! session.undo()?;
//! ```

mod errors;
mod mutations;
mod session;
mod undo_stack;
mod versioning;

pub use errors::EditorError;
pub use mutations::{BlockUpdate, Mutation, MutationError, SectionUpdate};
pub use session::EditSession;
pub use undo_stack::{MutationBatch, UndoStack};
pub use versioning::{
    DocumentVersion, InMemoryPersistence, PersistenceError, PersistenceProvider, SafetyPolicy,
    VersionType,
};

// Re-export the tree types for convenience
pub use folio_model::{Block, BlockContent, Document, Flow, Section};
