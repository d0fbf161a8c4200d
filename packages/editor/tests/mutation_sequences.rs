//! Sequences of mutations: ordering, history, and structural invariants

use folio_common::flatten_blocks;
use folio_editor::{BlockUpdate, EditSession};
use folio_model::BlockContent;

#[test]
fn test_order_stability_across_additions() {
    let mut session = EditSession::create_document("client-1", "report", "Report");

    let mut section_ids = Vec::new();
    for name in ["Intro", "Methods", "Results", "Appendix"] {
        section_ids.push(session.add_section(name).unwrap());
    }

    // Iterating by order yields the same sequence as the call order.
    let observed: Vec<String> = session
        .document()
        .sections
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(observed, section_ids);

    // Orders are strictly increasing, not required to be contiguous.
    let orders: Vec<u32> = session.document().sections.iter().map(|s| s.order).collect();
    assert!(orders.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_order_stability_survives_removal() {
    let mut session = EditSession::create_document("client-1", "report", "Report");
    let a = session.add_section("A").unwrap();
    let b = session.add_section("B").unwrap();
    let c = session.add_section("C").unwrap();

    session.delete_section(&b).unwrap();
    let d = session.add_section("D").unwrap();

    let observed: Vec<String> = session
        .document()
        .sections
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(observed, vec![a, c, d]);
}

#[test]
fn test_flow_ownership_invariant() {
    let mut session = EditSession::create_document("client-1", "report", "Report");
    let section = session.add_section("Body").unwrap();
    let main = session.add_flow(&section, "Main").unwrap();
    let sidebar = session.add_flow(&section, "Sidebar").unwrap();

    let mut created = Vec::new();
    for i in 0..4 {
        let flow = if i % 2 == 0 { &main } else { &sidebar };
        created.push(
            session
                .add_block(
                    &section,
                    flow,
                    BlockContent::Paragraph {
                        text: format!("block {}", i),
                    },
                )
                .unwrap(),
        );
    }
    let survivor = created.pop().unwrap();
    session.delete_block(&created.pop().unwrap()).unwrap();

    // Every block the mutators produced is reachable through a
    // section.flows[i].blocks[j] path.
    let doc = session.document();
    let flat = flatten_blocks(doc);
    for entry in &flat {
        let section = doc.find_section(entry.section_id).unwrap();
        let flow = section.find_flow(entry.flow_id).unwrap();
        assert!(flow.block_index(&entry.block.id).is_some());
    }
    assert!(flat.iter().any(|e| e.block.id == survivor));
}

#[test]
fn test_undo_redo_sequence() {
    let mut session = EditSession::create_document("client-1", "report", "Report");
    let section = session.add_section("Body").unwrap();
    let flow = session.add_flow(&section, "Main").unwrap();
    let block = session
        .add_block(
            &section,
            &flow,
            BlockContent::Paragraph {
                text: "v1".to_string(),
            },
        )
        .unwrap();

    session
        .update_block(
            &block,
            BlockUpdate {
                content: Some(BlockContent::Paragraph {
                    text: "v2".to_string(),
                }),
                ..BlockUpdate::default()
            },
        )
        .unwrap();

    assert!(session.undo().unwrap());
    match &session.document().find_block(&block).unwrap().content {
        BlockContent::Paragraph { text } => assert_eq!(text, "v1"),
        other => panic!("unexpected content: {:?}", other),
    }

    assert!(session.redo().unwrap());
    match &session.document().find_block(&block).unwrap().content {
        BlockContent::Paragraph { text } => assert_eq!(text, "v2"),
        other => panic!("unexpected content: {:?}", other),
    }

    // Undo all the way back to the empty document.
    while session.undo().unwrap() {}
    assert!(session.document().sections.is_empty());
    assert!(!session.can_undo());
}

#[test]
fn test_batch_undoes_as_one_step() {
    let mut session = EditSession::create_document("client-1", "report", "Report");
    let section = session.add_section("Body").unwrap();
    let flow = session.add_flow(&section, "Main").unwrap();

    session.begin_batch("Insert boilerplate");
    for i in 0..3 {
        session
            .add_block(
                &section,
                &flow,
                BlockContent::Paragraph {
                    text: format!("para {}", i),
                },
            )
            .unwrap();
    }
    session.end_batch();

    assert_eq!(
        session.document().find_section(&section).unwrap().flows[0]
            .blocks
            .len(),
        3
    );

    assert!(session.undo().unwrap());
    assert!(session.document().find_section(&section).unwrap().flows[0]
        .blocks
        .is_empty());
}
