//! Pagination geometry and fill behavior

use std::sync::Arc;

use folio_model::{Block, BlockContent, Flow, Margins, PageMaster, Section};

use crate::engine::{LayoutEngine, LayoutError};
use crate::measure::{BlockExtent, FixedMeasure};

fn paragraph(id: &str) -> Arc<Block> {
    Arc::new(Block::new(
        id,
        BlockContent::Paragraph {
            text: format!("text for {}", id),
        },
    ))
}

/// Letter with 1" margins: 648pt of usable column height.
fn section_with_blocks(count: usize) -> Section {
    let mut section = Section::new("s-1", "Body", 1);
    let mut flow = Flow::new("f-1", "Main", 1);
    for i in 0..count {
        flow.blocks.push(paragraph(&format!("b-{}", i + 1)));
    }
    section.flows.push(Arc::new(flow));
    section
}

fn ids_of(column: &crate::output::Column) -> Vec<&str> {
    column
        .placements
        .iter()
        .map(|p| p.block_id.as_str())
        .collect()
}

#[test]
fn test_three_blocks_fill_two_pages() {
    // Three 300pt blocks against 648pt of usable height: two fit the
    // first page, the third starts the second.
    let section = section_with_blocks(3);
    let measure = FixedMeasure::new(300.0);

    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_count(), 2);
    assert_eq!(ids_of(&layout.pages[0].columns[0]), vec!["b-1", "b-2"]);
    assert_eq!(ids_of(&layout.pages[1].columns[0]), vec!["b-3"]);
    assert!(layout.warnings.is_empty());
}

#[test]
fn test_pagination_is_deterministic() {
    let section = section_with_blocks(12);
    let measure = FixedMeasure::new(137.0)
        .with("b-3", BlockExtent::of(410.0))
        .with("b-7", BlockExtent::of(620.0));
    let engine = LayoutEngine::new(&measure);

    let first = engine.paginate_section(&section).unwrap();
    let second = engine.paginate_section(&section).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_columns_fill_before_next_page() {
    let mut section = section_with_blocks(3);
    section.page_master = PageMaster {
        columns: 2,
        ..PageMaster::default()
    };

    // 400pt blocks: one per column, third rolls to the next page.
    let measure = FixedMeasure::new(400.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_count(), 2);
    assert_eq!(layout.pages[0].columns.len(), 2);
    assert_eq!(ids_of(&layout.pages[0].columns[0]), vec!["b-1"]);
    assert_eq!(ids_of(&layout.pages[0].columns[1]), vec!["b-2"]);
    assert_eq!(ids_of(&layout.pages[1].columns[0]), vec!["b-3"]);
}

#[test]
fn test_baseline_grid_snaps_every_top_offset() {
    let mut section = section_with_blocks(5);
    section.page_master.baseline_grid = true;
    section.page_master.grid_spacing = 18.0;

    // 100pt blocks land on un-snapped bottoms; tops must still snap.
    let measure = FixedMeasure::new(100.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    for placement in layout.placements() {
        let multiple = placement.top / 18.0;
        assert!(
            (multiple - multiple.round()).abs() < 1e-9,
            "top {} is not a grid multiple",
            placement.top
        );
    }

    // Snapping is upward: the second block sits at 108, not 100.
    assert_eq!(layout.pages[0].columns[0].placements[1].top, 108.0);
}

#[test]
fn test_margins_larger_than_page_are_a_configuration_error() {
    let mut section = section_with_blocks(1);
    section.page_master.margins = Margins::uniform(6.0);

    let measure = FixedMeasure::new(100.0);
    let result = LayoutEngine::new(&measure).paginate_section(&section);

    assert!(matches!(result, Err(LayoutError::InvalidConfiguration(_))));
}

#[test]
fn test_zero_columns_is_a_configuration_error() {
    let mut section = section_with_blocks(1);
    section.page_master.columns = 0;

    let measure = FixedMeasure::new(100.0);
    let result = LayoutEngine::new(&measure).paginate_section(&section);

    assert!(matches!(result, Err(LayoutError::InvalidConfiguration(_))));
}

#[test]
fn test_header_footer_reservations_shrink_columns() {
    // 300pt blocks: without reservations two fit a page, with a header
    // and footer (576pt usable) only one does.
    let mut reserved = section_with_blocks(2);
    reserved.page_master.has_header = true;
    reserved.page_master.has_footer = true;

    let measure = FixedMeasure::new(300.0);
    let engine = LayoutEngine::new(&measure);

    let plain = engine.paginate_section(&section_with_blocks(2)).unwrap();
    let shrunk = engine.paginate_section(&reserved).unwrap();

    assert_eq!(plain.page_count(), 1);
    assert_eq!(shrunk.page_count(), 2);
}

#[test]
fn test_each_flow_starts_on_a_fresh_page() {
    let mut section = Section::new("s-1", "Body", 1);
    let mut main = Flow::new("f-1", "Main", 1);
    main.blocks.push(paragraph("b-1"));
    let mut sidebar = Flow::new("f-2", "Sidebar", 2);
    sidebar.blocks.push(paragraph("b-2"));
    section.flows.push(Arc::new(main));
    section.flows.push(Arc::new(sidebar));

    let measure = FixedMeasure::new(100.0);
    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_count(), 2);
    assert_eq!(layout.page_of("b-1"), Some(0));
    assert_eq!(layout.page_of("b-2"), Some(1));
}

#[test]
fn test_empty_section_yields_no_pages() {
    let section = Section::new("s-1", "Empty", 1);
    let measure = FixedMeasure::new(100.0);

    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_count(), 0);
    assert_eq!(layout.page_number_of("b-1"), None);
}

#[test]
fn test_page_number_lookup_is_one_based() {
    let section = section_with_blocks(3);
    let measure = FixedMeasure::new(300.0);

    let layout = LayoutEngine::new(&measure)
        .paginate_section(&section)
        .unwrap();

    assert_eq!(layout.page_number_of("b-1"), Some(1));
    assert_eq!(layout.page_number_of("b-3"), Some(2));
}
