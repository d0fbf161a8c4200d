use std::collections::HashMap;

use folio_model::{Block, PageMaster};

/// Context handed to the measurement provider alongside the block.
pub struct MeasureContext<'a> {
    pub page_master: &'a PageMaster,
    /// Usable column width in points.
    pub column_width: f64,
}

/// Measured extent of one block, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockExtent {
    pub height: f64,
    /// Natural (unwrapped) width, when the provider knows it. Used for
    /// table/chart rotation decisions; `None` means "fits the column".
    pub natural_width: Option<f64>,
}

impl BlockExtent {
    pub fn of(height: f64) -> Self {
        Self {
            height,
            natural_width: None,
        }
    }

    pub fn with_width(height: f64, natural_width: f64) -> Self {
        Self {
            height,
            natural_width: Some(natural_width),
        }
    }
}

/// Injected measurement capability.
///
/// The engine never computes a rendered height itself; how a block
/// measures depends on the rendering surface (fonts, DPI, widget set)
/// and is supplied by that collaborator.
pub trait Measure {
    fn measure(&self, block: &Block, ctx: &MeasureContext<'_>) -> BlockExtent;
}

/// Map-backed measurement provider with a fallback height, for tests and
/// benches running on synthetic measurements.
#[derive(Debug, Clone)]
pub struct FixedMeasure {
    extents: HashMap<String, BlockExtent>,
    default_height: f64,
}

impl FixedMeasure {
    pub fn new(default_height: f64) -> Self {
        Self {
            extents: HashMap::new(),
            default_height,
        }
    }

    pub fn set(&mut self, block_id: impl Into<String>, extent: BlockExtent) {
        self.extents.insert(block_id.into(), extent);
    }

    pub fn with(mut self, block_id: impl Into<String>, extent: BlockExtent) -> Self {
        self.set(block_id, extent);
        self
    }
}

impl Measure for FixedMeasure {
    fn measure(&self, block: &Block, _ctx: &MeasureContext<'_>) -> BlockExtent {
        self.extents
            .get(&block.id)
            .copied()
            .unwrap_or(BlockExtent::of(self.default_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::BlockContent;

    #[test]
    fn test_fixed_measure_falls_back_to_default() {
        let measure = FixedMeasure::new(100.0).with("b-1", BlockExtent::of(250.0));
        let master = PageMaster::default();
        let ctx = MeasureContext {
            page_master: &master,
            column_width: 468.0,
        };

        let known = Block::new("b-1", BlockContent::Divider);
        let unknown = Block::new("b-2", BlockContent::Divider);

        assert_eq!(measure.measure(&known, &ctx).height, 250.0);
        assert_eq!(measure.measure(&unknown, &ctx).height, 100.0);
    }
}
