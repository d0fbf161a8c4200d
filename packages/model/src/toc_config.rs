use serde::{Deserialize, Serialize};

/// Configuration carried by a `table-of-contents` block.
///
/// Every field is explicit; `TocConfig::default` is the documented
/// configuration a freshly inserted TOC block receives, not a hidden
/// fallback inside the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TocConfig {
    pub title: String,
    /// One flag per heading level 1-6.
    pub include_levels: [bool; 6],
    /// Section ids to skip. The section hosting the TOC block itself is
    /// always force-excluded regardless of this list.
    pub exclude_sections: Vec<String>,
    /// 1 or 2 columns.
    pub columns: u8,
    /// Gap between columns in device-independent pixels.
    pub column_gap: f64,
    /// Indentation per heading level in device-independent pixels.
    pub indent_per_level: f64,
    /// Vertical spacing between entries in device-independent pixels.
    pub item_spacing: f64,
    pub show_page_numbers: bool,
    pub page_number_alignment: PageNumberAlignment,
    /// Leader between entry text and a right-aligned page number.
    pub leader: LeaderStyle,
    pub link_style: LinkStyle,
    /// Recompute on every structural change, or only on explicit refresh.
    pub auto_update: bool,
    pub allow_page_breaks: bool,
    /// Label shown when the TOC continues on a following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_continued: Option<String>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            title: "Table of Contents".to_string(),
            include_levels: [true, true, true, false, false, false],
            exclude_sections: Vec::new(),
            columns: 1,
            column_gap: 24.0,
            indent_per_level: 16.0,
            item_spacing: 8.0,
            show_page_numbers: true,
            page_number_alignment: PageNumberAlignment::Right,
            leader: LeaderStyle::Dots,
            link_style: LinkStyle::Hover,
            auto_update: true,
            allow_page_breaks: true,
            show_continued: None,
        }
    }
}

impl TocConfig {
    /// Whether headings of `level` (1-6) are included.
    pub fn includes_level(&self, level: u8) -> bool {
        (1..=6).contains(&level) && self.include_levels[(level - 1) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageNumberAlignment {
    Right,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderStyle {
    Dots,
    Dashes,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    Hover,
    Always,
    None,
}
