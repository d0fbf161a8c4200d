use std::sync::Arc;

use folio_model::Document;
use tracing::warn;

use crate::warning::Warning;

/// Enforce Flow Ownership on a freshly loaded document.
///
/// Legacy payloads sometimes attach blocks directly to a section; those
/// were quarantined at deserialize time. This pass drains them, logging a
/// schema warning per affected section. The document stays usable — the
/// stray data was never reachable by the renderer in the first place.
pub fn sanitize_document(doc: &mut Document) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for section in &mut doc.sections {
        if !section.has_legacy_blocks() {
            continue;
        }
        let section = Arc::make_mut(section);
        let discarded = section.take_legacy_blocks();
        warn!(
            section_id = %section.id,
            discarded, "ignoring blocks attached directly to section"
        );
        warnings.push(Warning::Schema {
            section_id: section.id.clone(),
            discarded_blocks: discarded,
        });
    }

    warnings
}
