//! Layout configuration – typography chosen by the user and the fixed page
//! geometry the paginator packs blocks into.
//!
//! Both are plain values passed explicitly through the pipeline, so several
//! what-if paginations (e.g. a compact preview) can run side by side without
//! touching the live configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error};

/// CSS pixels per typographic point (96 DPI reference resolution).
pub const PX_PER_PT: f32 = 96.0 / 72.0;

/// A4 (210 mm × 297 mm) at 96 DPI.
pub const A4_WIDTH_PX: f32 = 794.0;
pub const A4_HEIGHT_PX: f32 = 1123.0;

/// Symmetric page margin in pixels.
pub const PAGE_MARGIN_PX: f32 = 48.0;

/// Display theme. Changes heading sizes and paragraph spacing, and therefore
/// block heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Ruled section headings, roomy spacing.
    #[default]
    Classic,
    /// Black-and-grey headings, tighter spacing.
    Mono,
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" | "style1" => Ok(Theme::Classic),
            "mono" | "style2" => Ok(Theme::Mono),
            other => Err(ConfigError::UnknownName {
                kind: "theme",
                name: other.to_string(),
            }),
        }
    }
}

/// User-controlled typography. Every change invalidates earlier pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub font_family: String,
    /// Base font size in points.
    pub font_size_pt: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_family: "SimSun".to_string(),
            font_size_pt: 12.0,
            line_height: 1.5,
            theme: Theme::Classic,
        }
    }
}

impl LayoutConfig {
    /// Smaller type and tighter leading, for fitting onto fewer pages.
    pub fn compact() -> Self {
        Self {
            font_size_pt: 10.5,
            line_height: 1.3,
            ..Self::default()
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Reject values no rendering backend can honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.font_family.trim().is_empty() {
            return Err(ConfigError::EmptyFontFamily);
        }
        if !self.font_size_pt.is_finite() || self.font_size_pt <= 0.0 {
            return Err(ConfigError::InvalidFontSize(self.font_size_pt));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(ConfigError::InvalidLineHeight(self.line_height));
        }
        Ok(())
    }

    /// Base font size converted to pixels.
    pub fn font_size_px(&self) -> f32 {
        self.font_size_pt * 96.0 / 72.0
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// The two named typography presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreset {
    #[default]
    Default,
    Compact,
}

impl LayoutPreset {
    pub fn config(self) -> LayoutConfig {
        match self {
            LayoutPreset::Default => LayoutConfig::default(),
            LayoutPreset::Compact => LayoutConfig::compact(),
        }
    }

    /// Caller-side "smart layout": compact only pays off when the document
    /// spills past one page, so any other request falls back to default.
    pub fn smart(requested: LayoutPreset, page_count: usize) -> LayoutPreset {
        match requested {
            LayoutPreset::Compact if page_count > 1 => LayoutPreset::Compact,
            _ => LayoutPreset::Default,
        }
    }
}

impl FromStr for LayoutPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(LayoutPreset::Default),
            "compact" => Ok(LayoutPreset::Compact),
            other => Err(ConfigError::UnknownName {
                kind: "layout preset",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutPreset::Default => f.write_str("default"),
            LayoutPreset::Compact => f.write_str("compact"),
        }
    }
}

/// Fixed page size and margin in pixels at the reference resolution.
///
/// Construction guarantees a positive content box, so the paginator never
/// has to discover a bad geometry mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct PageGeometry {
    page_width_px: f32,
    page_height_px: f32,
    margin_px: f32,
}

#[derive(Deserialize)]
struct RawGeometry {
    page_width_px: f32,
    page_height_px: f32,
    margin_px: f32,
}

impl TryFrom<RawGeometry> for PageGeometry {
    type Error = ConfigError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        PageGeometry::new(raw.page_width_px, raw.page_height_px, raw.margin_px)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    pub fn new(page_width_px: f32, page_height_px: f32, margin_px: f32) -> Result<Self, ConfigError> {
        let size_ok = |v: f32| v.is_finite() && v > 0.0;
        if !size_ok(page_width_px) || !size_ok(page_height_px) {
            return Err(ConfigError::InvalidPageSize {
                width: page_width_px,
                height: page_height_px,
            });
        }
        if !margin_px.is_finite() || margin_px < 0.0 {
            return Err(ConfigError::InvalidMargin(margin_px));
        }
        if page_height_px - 2.0 * margin_px <= 0.0 {
            return Err(ConfigError::NoContentHeight {
                page_height: page_height_px,
                margin: margin_px,
            });
        }
        if page_width_px - 2.0 * margin_px <= 0.0 {
            return Err(ConfigError::NoContentWidth {
                page_width: page_width_px,
                margin: margin_px,
            });
        }
        Ok(Self {
            page_width_px,
            page_height_px,
            margin_px,
        })
    }

    /// A4 portrait with the standard margin: 794 × 1123 px, 48 px margin.
    pub fn a4() -> Self {
        Self {
            page_width_px: A4_WIDTH_PX,
            page_height_px: A4_HEIGHT_PX,
            margin_px: PAGE_MARGIN_PX,
        }
    }

    pub fn page_width_px(&self) -> f32 {
        self.page_width_px
    }

    pub fn page_height_px(&self) -> f32 {
        self.page_height_px
    }

    pub fn margin_px(&self) -> f32 {
        self.margin_px
    }

    /// Vertical room for blocks on one page.
    pub fn max_content_height(&self) -> f32 {
        self.page_height_px - 2.0 * self.margin_px
    }

    /// Width every block is laid out and measured at.
    pub fn content_width(&self) -> f32 {
        self.page_width_px - 2.0 * self.margin_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_geometry_constants() {
        let g = PageGeometry::a4();
        assert_eq!(g.max_content_height(), 1027.0);
        assert_eq!(g.content_width(), 698.0);
    }

    #[test]
    fn geometry_without_content_room_is_rejected() {
        assert_eq!(
            PageGeometry::new(794.0, 100.0, 50.0),
            Err(ConfigError::NoContentHeight {
                page_height: 100.0,
                margin: 50.0
            })
        );
        assert!(PageGeometry::new(0.0, 100.0, 0.0).is_err());
        assert!(PageGeometry::new(100.0, 100.0, -1.0).is_err());
        assert_eq!(
            PageGeometry::new(100.0, 400.0, 50.0),
            Err(ConfigError::NoContentWidth {
                page_width: 100.0,
                margin: 50.0
            })
        );
        let g = PageGeometry::new(200.0, 400.0, 50.0).unwrap();
        assert_eq!(g.content_width(), 100.0);
        assert_eq!(g.max_content_height(), 300.0);
    }

    #[test]
    fn geometry_json_is_validated() {
        let bad = r#"{"page_width_px":794,"page_height_px":90,"margin_px":48}"#;
        assert!(serde_json::from_str::<PageGeometry>(bad).is_err());
        let good = serde_json::to_string(&PageGeometry::a4()).unwrap();
        assert_eq!(
            serde_json::from_str::<PageGeometry>(&good).unwrap(),
            PageGeometry::a4()
        );
    }

    #[test]
    fn presets() {
        let d = LayoutPreset::Default.config();
        let c = LayoutPreset::Compact.config();
        assert_eq!((d.font_size_pt, d.line_height), (12.0, 1.5));
        assert_eq!((c.font_size_pt, c.line_height), (10.5, 1.3));
        assert_eq!("compact".parse::<LayoutPreset>().unwrap(), LayoutPreset::Compact);
        assert!("huge".parse::<LayoutPreset>().is_err());
    }

    #[test]
    fn smart_layout_only_compacts_multi_page_documents() {
        assert_eq!(LayoutPreset::smart(LayoutPreset::Compact, 2), LayoutPreset::Compact);
        assert_eq!(LayoutPreset::smart(LayoutPreset::Compact, 1), LayoutPreset::Default);
        assert_eq!(LayoutPreset::smart(LayoutPreset::Default, 5), LayoutPreset::Default);
    }

    #[test]
    fn invalid_typography_is_rejected() {
        let mut c = LayoutConfig::default();
        c.font_size_pt = 0.0;
        assert_eq!(c.validate(), Err(ConfigError::InvalidFontSize(0.0)));
        let mut c = LayoutConfig::default();
        c.line_height = f32::NAN;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidLineHeight(_))));
        let mut c = LayoutConfig::default();
        c.font_family = "  ".into();
        assert_eq!(c.validate(), Err(ConfigError::EmptyFontFamily));
    }

    #[test]
    fn config_json_round_trip_defaults_theme() {
        let json = r#"{"font_family":"Inter","font_size_pt":11,"line_height":1.4}"#;
        let c = LayoutConfig::from_json(json).unwrap();
        assert_eq!(c.theme, Theme::Classic);
        assert!((c.font_size_px() - 11.0 * PX_PER_PT).abs() < 1e-4);
        assert!(LayoutConfig::from_json(r#"{"font_family":"","font_size_pt":11,"line_height":1}"#).is_err());
    }
}
