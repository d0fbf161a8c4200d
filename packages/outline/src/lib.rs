//! # Folio Outline Generator
//!
//! Derives a navigable table of contents from heading blocks.
//!
//! The generator scans sections in order, filters headings by level and
//! section exclusions, and resolves each entry's page number from the
//! layout engine's output for that heading's own section. Entries come
//! back as a flat ordered list annotated with level — nesting is a
//! presentation concern derived from consecutive level deltas, never
//! stored structure.
//!
//! Generation degrades, it does not fail: a heading whose section has no
//! computed layout is emitted without a page number and flagged with a
//! stale-reference warning.

mod generator;

pub use generator::{generate_for_block, generate_outline, Outline, OutlineEntry, OutlineError};
