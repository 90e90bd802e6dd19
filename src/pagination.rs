//! Pagination – packs an ordered list of blocks into fixed-height pages.
//!
//! Greedy first-fit in document order: a block goes on the current page if it
//! fits, otherwise it starts the next one. Blocks are atomic, so:
//! - a block is never split across pages
//! - blocks are never reordered or dropped
//! - a block taller than a whole page still gets a page of its own and is
//!   reported as an [`Overflow`]

use serde::{Deserialize, Serialize};

use crate::blocks::Block;
use crate::error::{Error, MeasureError, Result};
use crate::layout_config::{LayoutConfig, PageGeometry};
use crate::measure::Measure;
use crate::render::render_block;

/// One page: the blocks placed on it and their measured heights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_index: usize,
    pub blocks: Vec<Block>,
    /// Measured height of each block, parallel to `blocks`.
    pub heights: Vec<f32>,
}

impl Page {
    fn new(page_index: usize) -> Self {
        Self {
            page_index,
            blocks: Vec::new(),
            heights: Vec::new(),
        }
    }

    /// Sum of the measured block heights.
    pub fn content_height(&self) -> f32 {
        self.heights.iter().sum()
    }

    /// Top offset of each block within the content box.
    pub fn offsets(&self) -> Vec<f32> {
        self.heights
            .iter()
            .scan(0.0f32, |y, h| {
                let top = *y;
                *y += h;
                Some(top)
            })
            .collect()
    }
}

/// A block that is taller than the page content box on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overflow {
    pub page_index: usize,
    /// Index of the block in the input sequence.
    pub block_index: usize,
    pub height: f32,
    pub max_content_height: f32,
}

/// Result of one pagination run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub pages: Vec<Page>,
    pub overflows: Vec<Overflow>,
    pub max_content_height: f32,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All blocks in page order. Equal to the input sequence.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Assign `blocks` to pages of `geometry` under `config`, measuring each
/// block once with `measurer`.
///
/// Zero blocks yield zero pages. Any measurement failure aborts the run;
/// no partial result is returned.
pub fn paginate<M>(blocks: &[Block], config: &LayoutConfig, geometry: &PageGeometry, measurer: &mut M) -> Result<Pagination>
where
    M: Measure + ?Sized,
{
    config.validate()?;

    let max_content_height = geometry.max_content_height();
    let content_width = geometry.content_width();

    let mut result = Pagination {
        pages: Vec::new(),
        overflows: Vec::new(),
        max_content_height,
    };
    let mut current = Page::new(0);
    let mut current_height = 0.0f32;

    for (block_index, block) in blocks.iter().enumerate() {
        let unit = render_block(block, config);
        let height = measurer
            .measure(&unit, config, content_width)
            .and_then(|h| {
                if h.is_finite() && h >= 0.0 {
                    Ok(h)
                } else {
                    Err(MeasureError::InvalidHeight(h))
                }
            })
            .map_err(|source| Error::Measure { block_index, source })?;

        if current_height + height > max_content_height && !current.blocks.is_empty() {
            let next = Page::new(current.page_index + 1);
            result.pages.push(std::mem::replace(&mut current, next));
            current_height = 0.0;
        }

        if height > max_content_height {
            log::warn!(
                "Block {block_index} ({}) is {height:.1} px tall, page holds {max_content_height:.1} px; placing it alone on page {}",
                block.kind(),
                current.page_index
            );
            result.overflows.push(Overflow {
                page_index: current.page_index,
                block_index,
                height,
                max_content_height,
            });
        }

        current.blocks.push(block.clone());
        current.heights.push(height);
        current_height += height;
    }

    if !current.blocks.is_empty() {
        result.pages.push(current);
    }

    log::debug!(
        "Paginated {} blocks into {} pages ({} overflowing)",
        blocks.len(),
        result.pages.len(),
        result.overflows.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::LayoutConfig;
    use crate::measure::TextMetricsMeasurer;
    use crate::render::RenderedBlock;

    /// Oracle returning the same height for every block.
    fn fixed(h: f32) -> impl FnMut(&RenderedBlock, &LayoutConfig, f32) -> std::result::Result<f32, MeasureError> {
        move |_, _, _| Ok(h)
    }

    fn geometry_with_content_height(h: f32) -> PageGeometry {
        PageGeometry::new(794.0, h, 0.0).unwrap()
    }

    fn plains(n: usize) -> Vec<Block> {
        (0..n).map(|i| Block::plain(format!("line {i}"))).collect()
    }

    #[test]
    fn empty_input_yields_no_pages() {
        let p = paginate(&[], &LayoutConfig::default(), &PageGeometry::a4(), &mut fixed(10.0)).unwrap();
        assert!(p.is_empty());
        assert!(p.overflows.is_empty());
    }

    #[test]
    fn packs_three_per_page() {
        let h = 100.0;
        let geometry = geometry_with_content_height(3.0 * h + 1.0);
        for n in [1, 3, 4, 7, 9] {
            let p = paginate(&plains(n), &LayoutConfig::default(), &geometry, &mut fixed(h)).unwrap();
            assert_eq!(p.page_count(), n.div_ceil(3), "n = {n}");
            assert!(p.pages.iter().all(|page| page.blocks.len() <= 3));
        }
    }

    #[test]
    fn exact_fit_stays_on_page() {
        let geometry = geometry_with_content_height(300.0);
        let p = paginate(&plains(3), &LayoutConfig::default(), &geometry, &mut fixed(100.0)).unwrap();
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn oversized_block_gets_own_page() {
        let geometry = PageGeometry::a4();
        let max = geometry.max_content_height();
        let p = paginate(&plains(1), &LayoutConfig::default(), &geometry, &mut fixed(2.0 * max)).unwrap();
        assert_eq!(p.page_count(), 1);
        assert_eq!(p.pages[0].blocks.len(), 1);
        assert_eq!(
            p.overflows,
            vec![Overflow {
                page_index: 0,
                block_index: 0,
                height: 2.0 * max,
                max_content_height: max,
            }]
        );
    }

    #[test]
    fn oversized_block_in_the_middle_is_isolated() {
        let geometry = geometry_with_content_height(300.0);
        let heights = [100.0, 500.0, 100.0];
        let mut i = 0;
        let mut oracle = |_: &RenderedBlock, _: &LayoutConfig, _: f32| -> std::result::Result<f32, MeasureError> {
            let h = heights[i];
            i += 1;
            Ok(h)
        };
        let p = paginate(&plains(3), &LayoutConfig::default(), &geometry, &mut oracle).unwrap();
        let sizes: Vec<usize> = p.pages.iter().map(|pg| pg.blocks.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1]);
        assert_eq!(p.overflows.len(), 1);
        assert_eq!(p.overflows[0].page_index, 1);
    }

    #[test]
    fn measurement_failure_aborts_with_block_index() {
        let mut calls = 0;
        let mut oracle = |_: &RenderedBlock, _: &LayoutConfig, _: f32| -> std::result::Result<f32, MeasureError> {
            calls += 1;
            if calls == 2 {
                Err(MeasureError::ScaffoldDetached)
            } else {
                Ok(10.0)
            }
        };
        let err = paginate(&plains(3), &LayoutConfig::default(), &PageGeometry::a4(), &mut oracle).unwrap_err();
        assert!(matches!(
            err,
            Error::Measure {
                block_index: 1,
                source: MeasureError::ScaffoldDetached
            }
        ));
    }

    #[test]
    fn invalid_heights_are_rejected() {
        for bad in [-1.0, f32::NAN, f32::INFINITY] {
            let err = paginate(&plains(1), &LayoutConfig::default(), &PageGeometry::a4(), &mut fixed(bad)).unwrap_err();
            assert!(err.is_measurement());
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_measuring() {
        let mut config = LayoutConfig::default();
        config.line_height = 0.0;
        let err = paginate(&plains(1), &config, &PageGeometry::a4(), &mut fixed(1.0)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn order_and_page_bound_hold_with_real_measurer() {
        let blocks: Vec<Block> = (0..120)
            .map(|i| match i % 3 {
                0 => Block::plain(format!("## Section {i}")),
                1 => Block::row(format!("**Item {i}**"), "2020 - 2024"),
                _ => Block::plain(format!("- detail {i} ").repeat(6)),
            })
            .collect();
        let config = LayoutConfig::default();
        let geometry = PageGeometry::a4();
        let mut m = TextMetricsMeasurer::default();
        let p = paginate(&blocks, &config, &geometry, &mut m).unwrap();

        assert!(p.page_count() > 1);
        assert_eq!(p.blocks().cloned().collect::<Vec<_>>(), blocks);
        for (i, page) in p.pages.iter().enumerate() {
            assert_eq!(page.page_index, i);
            assert!(page.content_height() <= geometry.max_content_height());
        }

        let again = paginate(&blocks, &config, &geometry, &mut m).unwrap();
        assert_eq!(p, again);
    }

    #[test]
    fn offsets_accumulate() {
        let page = Page {
            page_index: 0,
            blocks: plains(3),
            heights: vec![10.0, 20.0, 5.0],
        };
        assert_eq!(page.offsets(), vec![0.0, 10.0, 30.0]);
        assert_eq!(page.content_height(), 35.0);
    }
}
