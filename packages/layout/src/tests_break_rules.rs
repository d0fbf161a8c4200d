//! Break-rule semantics: breakBefore, breakAfter, breakAvoid, keepWithNext

use std::sync::Arc;

use folio_common::Warning;
use folio_model::{Block, BlockContent, Flow, PaginationRules, Section};

use crate::engine::LayoutEngine;
use crate::measure::{BlockExtent, FixedMeasure};
use crate::output::SectionLayout;

fn block_with_rules(id: &str, rules: PaginationRules) -> Arc<Block> {
    let mut block = Block::new(
        id,
        BlockContent::Paragraph {
            text: format!("text for {}", id),
        },
    );
    block.pagination_rules = rules;
    Arc::new(block)
}

fn plain(id: &str) -> Arc<Block> {
    block_with_rules(id, PaginationRules::default())
}

/// Single-column Letter section (648pt usable height) over given blocks.
fn section_of(blocks: Vec<Arc<Block>>) -> Section {
    let mut section = Section::new("s-1", "Body", 1);
    let mut flow = Flow::new("f-1", "Main", 1);
    flow.blocks = blocks;
    section.flows.push(Arc::new(flow));
    section
}

fn occurrences(layout: &SectionLayout, block_id: &str) -> usize {
    layout
        .placements()
        .filter(|p| p.block_id == block_id)
        .count()
}

#[test]
fn test_break_before_forces_a_new_page() {
    let section = section_of(vec![
        plain("b-1"),
        block_with_rules(
            "b-2",
            PaginationRules {
                break_before: true,
                ..PaginationRules::default()
            },
        ),
    ]);

    // Both would fit one page; breakBefore overrides the room left.
    let measure = FixedMeasure::new(100.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_of("b-1"), Some(0));
    assert_eq!(layout.page_of("b-2"), Some(1));
}

#[test]
fn test_break_before_is_a_noop_at_the_top_of_a_column() {
    let section = section_of(vec![block_with_rules(
        "b-1",
        PaginationRules {
            break_before: true,
            ..PaginationRules::default()
        },
    )]);

    let measure = FixedMeasure::new(100.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    // No empty leading page.
    assert_eq!(layout.page_count(), 1);
    assert_eq!(layout.page_of("b-1"), Some(0));
}

#[test]
fn test_break_after_pushes_the_following_block() {
    let section = section_of(vec![
        block_with_rules(
            "b-1",
            PaginationRules {
                break_after: true,
                ..PaginationRules::default()
            },
        ),
        plain("b-2"),
    ]);

    let measure = FixedMeasure::new(100.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_of("b-1"), Some(0));
    assert_eq!(layout.page_of("b-2"), Some(1));
}

#[test]
fn test_trailing_break_after_leaves_no_empty_page() {
    let section = section_of(vec![block_with_rules(
        "b-1",
        PaginationRules {
            break_after: true,
            ..PaginationRules::default()
        },
    )]);

    let measure = FixedMeasure::new(100.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_count(), 1);
}

#[test]
fn test_break_avoid_moves_whole_block_to_next_column() {
    let section = section_of(vec![
        plain("b-1"),
        block_with_rules(
            "b-2",
            PaginationRules {
                break_avoid: true,
                ..PaginationRules::default()
            },
        ),
    ]);

    // 400 + 400 exceeds 648: the second block moves whole and starts at
    // the top of the next column, never split across the boundary.
    let measure = FixedMeasure::new(400.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(occurrences(&layout, "b-2"), 1);
    assert_eq!(layout.page_of("b-2"), Some(1));
    assert_eq!(layout.pages[1].columns[0].placements[0].top, 0.0);
    assert!(layout.warnings.is_empty());
}

#[test]
fn test_oversized_block_overflows_with_warning() {
    let section = section_of(vec![
        plain("b-1"),
        block_with_rules(
            "b-2",
            PaginationRules {
                break_avoid: true,
                ..PaginationRules::default()
            },
        ),
        plain("b-3"),
    ]);

    // 700pt exceeds a full 648pt column: placed at the top of its own
    // column, allowed to overflow, flagged but not fatal.
    let measure = FixedMeasure::new(100.0).with("b-2", BlockExtent::of(700.0));
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(occurrences(&layout, "b-2"), 1);
    assert_eq!(layout.page_of("b-2"), Some(1));
    assert_eq!(layout.pages[1].columns[0].placements[0].top, 0.0);
    assert_eq!(
        layout.warnings,
        vec![Warning::Overflow {
            block_id: "b-2".to_string(),
            height: 700.0,
            column_height: 648.0,
        }]
    );

    // The next block still lands after the overflowing one.
    assert_eq!(layout.page_of("b-3"), Some(2));
}

#[test]
fn test_keep_with_next_moves_the_pair_together() {
    let section = section_of(vec![
        plain("b-1"),
        block_with_rules(
            "b-2",
            PaginationRules {
                keep_with_next: true,
                ..PaginationRules::default()
            },
        ),
        plain("b-3"),
    ]);

    // b-2 alone would fit after b-1 (500 + 100 <= 648), but the b-2+b-3
    // pair would not (500 + 100 + 100 > 648): both move together.
    let measure = FixedMeasure::new(100.0).with("b-1", BlockExtent::of(500.0));
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_of("b-1"), Some(0));
    assert_eq!(layout.page_of("b-2"), Some(1));
    assert_eq!(layout.page_of("b-3"), Some(1));
}

#[test]
fn test_keep_with_next_stays_when_pair_fits() {
    let section = section_of(vec![
        block_with_rules(
            "b-1",
            PaginationRules {
                keep_with_next: true,
                ..PaginationRules::default()
            },
        ),
        plain("b-2"),
    ]);

    let measure = FixedMeasure::new(200.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_count(), 1);
}

#[test]
fn test_wide_table_is_marked_for_rotation() {
    let mut section = section_of(vec![
        Arc::new(Block::new(
            "t-1",
            BlockContent::Table {
                columns: vec!["a".to_string(); 12],
                rows: vec![],
            },
        )),
        plain("b-1"),
    ]);
    section.page_master.allow_table_rotation = true;

    // Natural width 600pt exceeds the 468pt column.
    let measure = FixedMeasure::new(100.0).with("t-1", BlockExtent::with_width(200.0, 600.0));
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    let table = layout.placements().find(|p| p.block_id == "t-1").unwrap();
    let para = layout.placements().find(|p| p.block_id == "b-1").unwrap();
    assert!(table.rotated);
    assert!(!para.rotated);
}

#[test]
fn test_rotation_requires_page_master_permission() {
    let section = section_of(vec![Arc::new(Block::new(
        "t-1",
        BlockContent::Table {
            columns: vec!["a".to_string(); 12],
            rows: vec![],
        },
    ))]);

    let measure = FixedMeasure::new(100.0).with("t-1", BlockExtent::with_width(200.0, 600.0));
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert!(!layout.placements().next().unwrap().rotated);
}
