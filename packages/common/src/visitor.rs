use std::sync::Arc;

use folio_model::{Block, Document, Flow, Section};

/// Visitor pattern for traversing the document tree immutably
///
/// This trait provides default implementations that walk the entire tree
/// in render order (sections, then flows, then blocks, each by `order`).
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_section(&mut self, section: &Section) {
        walk_section(self, section);
    }

    fn visit_flow(&mut self, section: &Section, flow: &Flow) {
        walk_flow(self, section, flow);
    }

    fn visit_block(&mut self, _section: &Section, _flow: &Flow, _block: &Block) {
        // Leaf node, no children to walk
    }
}

// Default walk implementations

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for section in &doc.sections {
        visitor.visit_section(section);
    }
}

pub fn walk_section<V: Visitor>(visitor: &mut V, section: &Section) {
    for flow in &section.flows {
        visitor.visit_flow(section, flow);
    }
}

pub fn walk_flow<V: Visitor>(visitor: &mut V, section: &Section, flow: &Flow) {
    for block in &flow.blocks {
        visitor.visit_block(section, flow, block);
    }
}

/// A block together with its owning section and flow.
#[derive(Debug, Clone)]
pub struct FlatBlock<'a> {
    pub section_id: &'a str,
    pub flow_id: &'a str,
    pub block: &'a Arc<Block>,
}

/// Flatten a document into `(block, section, flow)` tuples in
/// Section → Flow → Block traversal order.
pub fn flatten_blocks(doc: &Document) -> Vec<FlatBlock<'_>> {
    let mut out = Vec::new();
    for section in &doc.sections {
        for flow in &section.flows {
            for block in &flow.blocks {
                out.push(FlatBlock {
                    section_id: &section.id,
                    flow_id: &flow.id,
                    block,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::BlockContent;

    fn sample_document() -> Document {
        let mut doc = Document::new("doc-1", "Test");
        let mut section = Section::new("s-1", "Body", 1);
        let mut main = Flow::new("f-1", "Main", 1);
        main.blocks.push(Arc::new(Block::new(
            "b-1",
            BlockContent::Heading {
                text: "Intro".to_string(),
                level: 1,
            },
        )));
        main.blocks.push(Arc::new(Block::new(
            "b-2",
            BlockContent::Paragraph {
                text: "Body text".to_string(),
            },
        )));
        let mut sidebar = Flow::new("f-2", "Sidebar", 2);
        sidebar
            .blocks
            .push(Arc::new(Block::new("b-3", BlockContent::Divider)));
        section.flows.push(Arc::new(main));
        section.flows.push(Arc::new(sidebar));
        doc.sections.push(Arc::new(section));
        doc
    }

    #[test]
    fn test_flatten_preserves_traversal_order() {
        let doc = sample_document();
        let flat = flatten_blocks(&doc);

        let ids: Vec<&str> = flat.iter().map(|f| f.block.id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "b-2", "b-3"]);
        assert_eq!(flat[2].flow_id, "f-2");
        assert_eq!(flat[0].section_id, "s-1");
    }

    #[test]
    fn test_visitor_counts_blocks() {
        struct Counter {
            blocks: usize,
            flows: usize,
        }
        impl Visitor for Counter {
            fn visit_flow(&mut self, section: &Section, flow: &Flow) {
                self.flows += 1;
                walk_flow(self, section, flow);
            }
            fn visit_block(&mut self, _section: &Section, _flow: &Flow, _block: &Block) {
                self.blocks += 1;
            }
        }

        let doc = sample_document();
        let mut counter = Counter { blocks: 0, flows: 0 };
        counter.visit_document(&doc);
        assert_eq!(counter.flows, 2);
        assert_eq!(counter.blocks, 3);
    }
}
