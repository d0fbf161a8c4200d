use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_editor::EditSession;
use folio_layout::{FixedMeasure, LayoutEngine};
use folio_model::{BlockContent, PaginationRules};

fn build_section(blocks: usize) -> folio_model::Document {
    let mut session = EditSession::create_document("bench", "bench-doc", "Bench");
    let section = session.add_section("Body").unwrap();
    let flow = session.add_flow(&section, "Main").unwrap();
    for i in 0..blocks {
        session
            .add_block(
                &section,
                &flow,
                BlockContent::Paragraph {
                    text: format!("paragraph {}", i),
                },
            )
            .unwrap();
    }
    session.document().clone()
}

fn paginate_plain_section(c: &mut Criterion) {
    let doc = build_section(500);
    let section = &doc.sections[0];
    let measure = FixedMeasure::new(120.0);

    c.bench_function("paginate_plain_section_500", |b| {
        b.iter(|| {
            let engine = LayoutEngine::new(&measure);
            engine.paginate_section(black_box(section))
        })
    });
}

fn paginate_with_grid_and_rules(c: &mut Criterion) {
    let mut doc = build_section(500);
    {
        let section = std::sync::Arc::make_mut(&mut doc.sections[0]);
        section.page_master.baseline_grid = true;
        section.page_master.grid_spacing = 18.0;
        section.page_master.columns = 2;

        let flow = std::sync::Arc::make_mut(&mut section.flows[0]);
        for (i, block) in flow.blocks.iter_mut().enumerate() {
            if i % 7 == 0 {
                std::sync::Arc::make_mut(block).pagination_rules = PaginationRules {
                    keep_with_next: true,
                    ..PaginationRules::default()
                };
            }
        }
    }
    let section = &doc.sections[0];
    let measure = FixedMeasure::new(95.0);

    c.bench_function("paginate_gridded_section_500", |b| {
        b.iter(|| {
            let engine = LayoutEngine::new(&measure);
            engine.paginate_section(black_box(section))
        })
    });
}

criterion_group!(benches, paginate_plain_section, paginate_with_grid_and_rules);
criterion_main!(benches);
