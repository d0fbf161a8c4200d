use serde::{Deserialize, Serialize};

/// Named physical page size. Dimensions are portrait width x height in
/// inches; orientation is applied separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    Letter,
    Legal,
    Tabloid,
    A4,
    A3,
}

impl PageSize {
    /// Portrait (width, height) in inches.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::Letter => (8.5, 11.0),
            PageSize::Legal => (8.5, 14.0),
            PageSize::Tabloid => (11.0, 17.0),
            PageSize::A4 => (8.27, 11.69),
            PageSize::A3 => (11.69, 16.54),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            right: inches,
            bottom: inches,
            left: inches,
        }
    }
}

/// The physical/layout configuration of a Section: page size, margins,
/// columns, baseline grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMaster {
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: Margins,
    /// Column count, 1-3.
    pub columns: u8,
    /// Gap between columns in inches.
    pub column_gap: f64,
    pub has_header: bool,
    pub has_footer: bool,
    pub baseline_grid: bool,
    /// Baseline rhythm in device-independent pixels; meaningful when
    /// `baseline_grid` is on.
    pub grid_spacing: f64,
    pub allow_table_rotation: bool,
}

impl Default for PageMaster {
    /// Letter portrait, one column, 1" margins, no header/footer, grid off.
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            orientation: Orientation::Portrait,
            margins: Margins::uniform(1.0),
            columns: 1,
            column_gap: 0.25,
            has_header: false,
            has_footer: false,
            baseline_grid: false,
            grid_spacing: 18.0,
            allow_table_rotation: false,
        }
    }
}

impl PageMaster {
    /// Oriented page (width, height) in inches.
    pub fn page_dimensions(&self) -> (f64, f64) {
        let (w, h) = self.page_size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// A named layout preset. Selecting a non-custom intent overwrites the
/// section's PageMaster wholesale with the canonical one; `custom` leaves
/// the current PageMaster untouched and unlocks manual editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutIntent {
    Standard,
    Cover,
    DataAppendix,
    Custom,
}

impl LayoutIntent {
    /// The canonical PageMaster for this intent; `None` for `custom`.
    pub fn canonical_page_master(&self) -> Option<PageMaster> {
        match self {
            LayoutIntent::Standard => Some(PageMaster::default()),
            LayoutIntent::Cover => Some(PageMaster {
                margins: Margins::uniform(1.5),
                ..PageMaster::default()
            }),
            LayoutIntent::DataAppendix => Some(PageMaster {
                orientation: Orientation::Landscape,
                margins: Margins::uniform(0.75),
                has_header: true,
                has_footer: true,
                allow_table_rotation: true,
                ..PageMaster::default()
            }),
            LayoutIntent::Custom => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_master_is_letter() {
        let pm = PageMaster::default();
        assert_eq!(pm.page_size, PageSize::Letter);
        assert_eq!(pm.columns, 1);
        assert_eq!(pm.margins, Margins::uniform(1.0));
        assert!(!pm.has_header && !pm.has_footer && !pm.baseline_grid);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let pm = PageMaster {
            orientation: Orientation::Landscape,
            ..PageMaster::default()
        };
        assert_eq!(pm.page_dimensions(), (11.0, 8.5));
    }

    #[test]
    fn test_data_appendix_preset_permits_rotation() {
        let pm = LayoutIntent::DataAppendix.canonical_page_master().unwrap();
        assert_eq!(pm.orientation, Orientation::Landscape);
        assert!(pm.allow_table_rotation);
    }

    #[test]
    fn test_custom_has_no_canonical_master() {
        assert!(LayoutIntent::Custom.canonical_page_master().is_none());
    }

    #[test]
    fn test_intent_wire_names() {
        assert_eq!(
            serde_json::to_string(&LayoutIntent::DataAppendix).unwrap(),
            "\"data-appendix\""
        );
        assert_eq!(
            serde_json::to_string(&LayoutIntent::Standard).unwrap(),
            "\"standard\""
        );
    }
}
