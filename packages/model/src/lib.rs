//! # Folio Document Model
//!
//! Canonical tree types for Folio documents.
//!
//! The model is the persisted-state contract: every type here serializes
//! to the wire shape storage collaborators must round-trip without loss.
//!
//! ## Structure
//!
//! ```text
//! Document
//!   └── Section (ordered)        page geometry via PageMaster
//!         └── Flow (ordered)     independently paginated block stream
//!               └── Block        typed content + presentation hints
//! ```
//!
//! Content blocks exist only inside a Flow's list — a Section never holds
//! blocks directly (Flow Ownership). Legacy payloads that violate this are
//! quarantined at deserialize time and reported by the sanitize pass in
//! `folio-common`, never rendered.

pub mod block;
pub mod document;
pub mod id_generator;
pub mod page_master;
pub mod toc_config;

pub use block::{
    Block, BlockContent, BlockMargins, BlockMetadata, ChartKind, ChartSeries, PaginationRules,
    WidthMode,
};
pub use document::{Document, Flow, FlowKind, Section};
pub use id_generator::{document_seed, IdGenerator};
pub use page_master::{LayoutIntent, Margins, Orientation, PageMaster, PageSize};
pub use toc_config::{LeaderStyle, LinkStyle, PageNumberAlignment, TocConfig};
