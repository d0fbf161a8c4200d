use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use folio_common::Warning;
use folio_layout::SectionLayout;
use folio_model::{BlockContent, Document, TocConfig};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutlineError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Block {0} is not a table-of-contents block")]
    NotATocBlock(String),
}

/// A generated table of contents: a flat ordered entry list plus the
/// degradations encountered while resolving page numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub entries: Vec<OutlineEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub block_id: String,
    pub section_id: String,
    pub text: String,
    /// Heading level 1-6; indentation is derived from it.
    pub level: u8,
    /// One-based page number within the heading's own section layout;
    /// absent when that section has not been paginated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
}

/// Generate an outline for the TOC block with the given id.
///
/// Convenience over [`generate_outline`]: looks up the block, takes its
/// embedded configuration, and force-excludes its host section.
pub fn generate_for_block(
    document: &Document,
    toc_block_id: &str,
    layouts: &HashMap<String, SectionLayout>,
) -> Result<Outline, OutlineError> {
    let (si, fi, bi) = document
        .block_path(toc_block_id)
        .ok_or_else(|| OutlineError::BlockNotFound(toc_block_id.to_string()))?;
    let host_section = &document.sections[si];

    let block = &host_section.flows[fi].blocks[bi];
    let config = match &block.content {
        BlockContent::TableOfContents(config) => config,
        _ => return Err(OutlineError::NotATocBlock(toc_block_id.to_string())),
    };

    Ok(generate_outline(
        document,
        Some(&host_section.id),
        config,
        layouts,
    ))
}

/// Generate an outline from heading blocks across a document.
///
/// Sections are visited in `order`; excluded sections and the host
/// section (the one containing the TOC block itself) are skipped.
/// Page numbers resolve against each heading's own section layout in
/// `layouts`, keyed by section id.
#[instrument(skip(document, config, layouts), fields(document_id = %document.id))]
pub fn generate_outline(
    document: &Document,
    host_section_id: Option<&str>,
    config: &TocConfig,
    layouts: &HashMap<String, SectionLayout>,
) -> Outline {
    let mut entries = Vec::new();
    let mut warnings = Vec::new();

    for section in &document.sections {
        if host_section_id == Some(section.id.as_str()) {
            continue;
        }
        if config.exclude_sections.iter().any(|id| *id == section.id) {
            continue;
        }

        let layout = layouts.get(&section.id);

        for flow in &section.flows {
            for block in &flow.blocks {
                let (text, level) = match &block.content {
                    BlockContent::Heading { text, level } => (text, *level),
                    _ => continue,
                };
                if !config.includes_level(level) {
                    continue;
                }

                let page_number = layout.and_then(|l| l.page_number_of(&block.id));
                if page_number.is_none() {
                    warn!(
                        block_id = %block.id,
                        section_id = %section.id,
                        "heading has no paginated position; emitting without page number"
                    );
                    warnings.push(Warning::StaleReference {
                        block_id: block.id.clone(),
                        section_id: section.id.clone(),
                    });
                }

                entries.push(OutlineEntry {
                    block_id: block.id.clone(),
                    section_id: section.id.clone(),
                    text: text.clone(),
                    level,
                    page_number,
                });
            }
        }
    }

    debug!(entries = entries.len(), "outline generated");
    Outline {
        title: config.title.clone(),
        entries,
        warnings,
    }
}
