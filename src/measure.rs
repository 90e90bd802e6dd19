//! Height measurement oracle.
//!
//! The paginator only needs one capability: the pixel height of a rendered
//! block at a fixed content width. [`Measure`] is that seam. The headless
//! [`TextMetricsMeasurer`] answers it with font metrics and the Taffy layout
//! in [`crate::layout`]; tests and hosts with their own rendering surface
//! pass any closure of the right shape.

use crate::error::MeasureError;
use crate::fonts::FontManager;
use crate::layout::{layout_block, BlockLayout};
use crate::layout_config::LayoutConfig;
use crate::render::RenderedBlock;

/// Reports the rendered height of one block.
///
/// Implementations must use exactly `config` (font family, size converted to
/// pixels, line height, theme) so the measured height matches the final
/// display. Any scratch state built for a call is released before it
/// returns.
pub trait Measure {
    fn measure(&mut self, unit: &RenderedBlock, config: &LayoutConfig, content_width_px: f32) -> Result<f32, MeasureError>;
}

impl<F> Measure for F
where
    F: FnMut(&RenderedBlock, &LayoutConfig, f32) -> Result<f32, MeasureError>,
{
    fn measure(&mut self, unit: &RenderedBlock, config: &LayoutConfig, content_width_px: f32) -> Result<f32, MeasureError> {
        self(unit, config, content_width_px)
    }
}

/// Headless oracle backed by font metrics.
pub struct TextMetricsMeasurer {
    fonts: FontManager,
}

impl TextMetricsMeasurer {
    pub fn new(fonts: FontManager) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    /// Full layout of a unit, for drawing.
    pub fn layout(&self, unit: &RenderedBlock, content_width_px: f32) -> Result<BlockLayout, MeasureError> {
        layout_block(unit, content_width_px, &self.fonts)
    }
}

impl Default for TextMetricsMeasurer {
    fn default() -> Self {
        Self::new(FontManager::default())
    }
}

impl Measure for TextMetricsMeasurer {
    fn measure(&mut self, unit: &RenderedBlock, config: &LayoutConfig, content_width_px: f32) -> Result<f32, MeasureError> {
        if unit.config != *config {
            return Err(MeasureError::StyleMismatch);
        }
        Ok(self.layout(unit, content_width_px)?.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Block;
    use crate::render::render_block;

    #[test]
    fn closures_are_oracles() {
        let mut calls = 0;
        let mut oracle = |_: &RenderedBlock, _: &LayoutConfig, w: f32| -> Result<f32, MeasureError> {
            calls += 1;
            Ok(w / 10.0)
        };
        let config = LayoutConfig::default();
        let unit = render_block(&Block::plain("x"), &config);
        assert_eq!(oracle.measure(&unit, &config, 100.0), Ok(10.0));
        assert_eq!(calls, 1);
    }

    #[test]
    fn mismatched_style_is_rejected() {
        let mut m = TextMetricsMeasurer::default();
        let unit = render_block(&Block::plain("x"), &LayoutConfig::default());
        assert_eq!(
            m.measure(&unit, &LayoutConfig::compact(), 698.0),
            Err(MeasureError::StyleMismatch)
        );
    }

    #[test]
    fn measurement_is_deterministic() {
        let mut m = TextMetricsMeasurer::default();
        let config = LayoutConfig::default();
        let unit = render_block(&Block::row("**Acme**, Engineer", "2021"), &config);
        let a = m.measure(&unit, &config, 698.0).unwrap();
        let b = m.measure(&unit, &config, 698.0).unwrap();
        assert_eq!(a, b);
        assert!(a > 0.0);
    }
}
