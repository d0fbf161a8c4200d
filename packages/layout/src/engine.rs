use thiserror::Error;
use tracing::{debug, instrument, warn};

use folio_common::Warning;
use folio_model::{Flow, PageMaster, Section};

use crate::measure::{Measure, MeasureContext};
use crate::output::{Column, Page, Placement, SectionLayout};

pub const POINTS_PER_INCH: f64 = 72.0;

/// Vertical space reserved for a running header or footer, in inches.
const HEADER_RESERVATION_IN: f64 = 0.5;
const FOOTER_RESERVATION_IN: f64 = 0.5;

/// Slack for floating-point fit comparisons.
const FIT_EPSILON: f64 = 1e-6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid page configuration: {0}")]
    InvalidConfiguration(String),
}

/// Greedy pagination over a section's flows.
///
/// Walks blocks in flow order with a running height cursor per column.
/// Blocks place whole (the engine never splits one); break rules are
/// evaluated before each placement. Each flow is paginated independently
/// and starts on a fresh page.
pub struct LayoutEngine<'a> {
    measure: &'a dyn Measure,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(measure: &'a dyn Measure) -> Self {
        Self { measure }
    }

    /// Paginate one section against its PageMaster.
    ///
    /// Fails only on unusable geometry; a block taller than a column is a
    /// warning on the returned layout, never an error.
    #[instrument(skip(self, section), fields(section_id = %section.id))]
    pub fn paginate_section(&self, section: &Section) -> Result<SectionLayout, LayoutError> {
        let geometry = ColumnGeometry::from_master(&section.page_master)?;
        let mut builder = PageBuilder::new(section.page_master.columns as usize);
        let mut warnings = Vec::new();

        for (index, flow) in section.flows.iter().enumerate() {
            if index > 0 {
                // Flows are parallel content streams; each paginates
                // independently starting on a fresh page.
                builder.finish_page();
            }
            self.lay_out_flow(flow, &section.page_master, &geometry, &mut builder, &mut warnings);
        }

        let pages = builder.finish();
        debug!(pages = pages.len(), "section paginated");
        Ok(SectionLayout {
            section_id: section.id.clone(),
            pages,
            warnings,
        })
    }

    fn lay_out_flow(
        &self,
        flow: &Flow,
        master: &PageMaster,
        geometry: &ColumnGeometry,
        builder: &mut PageBuilder,
        warnings: &mut Vec<Warning>,
    ) {
        let ctx = MeasureContext {
            page_master: master,
            column_width: geometry.column_width,
        };
        let mut pending_break = false;

        for (index, block) in flow.blocks.iter().enumerate() {
            let rules = block.pagination_rules;

            // A break forced by the previous block's `breakAfter` or this
            // block's `breakBefore`; a no-op at the top of an empty column.
            if (pending_break || rules.break_before) && !builder.column_is_empty() {
                builder.advance_column();
            }
            pending_break = false;

            let extent = self.measure.measure(block, &ctx);

            // keepWithNext: the current block and the next one are an
            // atomic unit for fit purposes; if they don't both fit here
            // but would in a fresh column, both move together.
            if rules.keep_with_next && index + 1 < flow.blocks.len() && !builder.column_is_empty()
            {
                let next = self.measure.measure(&flow.blocks[index + 1], &ctx);
                let top = snap(builder.cursor(), master);
                if !pair_fits(top, extent.height, next.height, master, geometry)
                    && pair_fits(0.0, extent.height, next.height, master, geometry)
                {
                    builder.advance_column();
                }
            }

            let mut top = snap(builder.cursor(), master);
            if top + extent.height > geometry.column_height + FIT_EPSILON {
                if !builder.column_is_empty() {
                    builder.advance_column();
                    top = 0.0;
                }
                if extent.height > geometry.column_height + FIT_EPSILON {
                    // Taller than one full column: place at the top and
                    // let it overflow rather than splitting it.
                    warn!(
                        block_id = %block.id,
                        height = extent.height,
                        column_height = geometry.column_height,
                        "block overflows column"
                    );
                    warnings.push(Warning::Overflow {
                        block_id: block.id.clone(),
                        height: extent.height,
                        column_height: geometry.column_height,
                    });
                }
            }

            let rotated = master.allow_table_rotation
                && block.content.is_rotatable()
                && extent
                    .natural_width
                    .is_some_and(|w| w > geometry.column_width + FIT_EPSILON);

            builder.place(Placement {
                block_id: block.id.clone(),
                top,
                height: extent.height,
                rotated,
            });

            if rules.break_after {
                pending_break = true;
            }
        }
    }
}

/// Usable column geometry in points, derived from a PageMaster.
#[derive(Debug, Clone, Copy)]
struct ColumnGeometry {
    column_width: f64,
    column_height: f64,
}

impl ColumnGeometry {
    fn from_master(master: &PageMaster) -> Result<Self, LayoutError> {
        if !(1..=3).contains(&master.columns) {
            return Err(LayoutError::InvalidConfiguration(format!(
                "column count must be 1-3, got {}",
                master.columns
            )));
        }

        let (page_width_in, page_height_in) = master.page_dimensions();

        let mut height_in = page_height_in - master.margins.top - master.margins.bottom;
        if master.has_header {
            height_in -= HEADER_RESERVATION_IN;
        }
        if master.has_footer {
            height_in -= FOOTER_RESERVATION_IN;
        }

        let columns = master.columns as f64;
        let width_in = (page_width_in
            - master.margins.left
            - master.margins.right
            - (columns - 1.0) * master.column_gap)
            / columns;

        if height_in <= 0.0 {
            return Err(LayoutError::InvalidConfiguration(format!(
                "margins and reservations leave no vertical space ({}in)",
                height_in
            )));
        }
        if width_in <= 0.0 {
            return Err(LayoutError::InvalidConfiguration(format!(
                "margins and column gaps leave no horizontal space ({}in)",
                width_in
            )));
        }

        Ok(Self {
            column_width: width_in * POINTS_PER_INCH,
            column_height: height_in * POINTS_PER_INCH,
        })
    }
}

/// Snap a top offset up to the next baseline-grid multiple.
fn snap(cursor: f64, master: &PageMaster) -> f64 {
    if master.baseline_grid && master.grid_spacing > 0.0 {
        (cursor / master.grid_spacing).ceil() * master.grid_spacing
    } else {
        cursor
    }
}

/// Whether two stacked blocks both fit a column when the first one's top
/// sits at `top`.
fn pair_fits(
    top: f64,
    first_height: f64,
    second_height: f64,
    master: &PageMaster,
    geometry: &ColumnGeometry,
) -> bool {
    let first_bottom = top + first_height;
    if first_bottom > geometry.column_height + FIT_EPSILON {
        return false;
    }
    let second_top = snap(first_bottom, master);
    second_top + second_height <= geometry.column_height + FIT_EPSILON
}

/// Accumulates placements into columns and pages.
struct PageBuilder {
    columns_per_page: usize,
    pages: Vec<Page>,
    current_columns: Vec<Column>,
    cursor: f64,
}

impl PageBuilder {
    fn new(columns_per_page: usize) -> Self {
        Self {
            columns_per_page,
            pages: Vec::new(),
            current_columns: vec![Column {
                placements: Vec::new(),
            }],
            cursor: 0.0,
        }
    }

    fn cursor(&self) -> f64 {
        self.cursor
    }

    fn column_is_empty(&self) -> bool {
        self.current_columns
            .last()
            .map(|c| c.placements.is_empty())
            .unwrap_or(true)
    }

    fn place(&mut self, placement: Placement) {
        self.cursor = placement.top + placement.height;
        self.current_columns
            .last_mut()
            .expect("builder always has a current column")
            .placements
            .push(placement);
    }

    /// Move to the next column, or to a new page past the last column.
    fn advance_column(&mut self) {
        if self.current_columns.len() < self.columns_per_page {
            self.current_columns.push(Column {
                placements: Vec::new(),
            });
        } else {
            self.flush_page();
        }
        self.cursor = 0.0;
    }

    /// Close the current page if it holds anything.
    fn finish_page(&mut self) {
        if self.has_content() {
            self.flush_page();
        }
        self.cursor = 0.0;
    }

    fn has_content(&self) -> bool {
        self.current_columns.iter().any(|c| !c.placements.is_empty())
    }

    fn flush_page(&mut self) {
        let columns = std::mem::replace(
            &mut self.current_columns,
            vec![Column {
                placements: Vec::new(),
            }],
        );
        self.pages.push(Page { columns });
    }

    fn finish(mut self) -> Vec<Page> {
        if self.has_content() {
            self.flush_page();
        }
        self.pages
    }
}
