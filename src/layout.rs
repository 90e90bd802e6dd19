//! Layout engine – uses Taffy to lay out one [`RenderedBlock`] at a fixed
//! content width, then converts the result into positioned text lines and
//! rules relative to the block's top-left corner.
//!
//! Text is word-wrapped before layout, so every text leaf enters the Taffy
//! tree with a definite border-box height. Margins never collapse: the block
//! height is the sum of its elements' margin boxes, which makes stacking
//! measured heights on a page reproduce the final layout exactly.

use std::collections::HashMap;
use taffy::prelude::*;

use crate::error::MeasureError;
use crate::fonts::{wrap_spans, FontManager, Fragment, RunStyle, WrappedLine};
use crate::markup::LineRole;
use crate::render::{Content, Element, RenderedBlock, TextElement};
use crate::style::{self, ComputedStyle};

/// Gap between a list marker and the item text, in em.
const MARKER_GAP_EM: f32 = 0.4;

/// One visual line of text at its final position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLine {
    /// Left edge of the first fragment.
    pub x: f32,
    /// Top of the line box.
    pub y: f32,
    pub baseline: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_family: String,
    /// Fragment offsets are relative to `x`. A list marker sits at a negative
    /// offset.
    pub fragments: Vec<Fragment>,
}

/// A horizontal rule (thematic break or heading underline).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedRule {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub thickness: f32,
}

/// Laid-out block in block-local coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockLayout {
    /// Margin-box height of the whole block.
    pub height: f32,
    pub lines: Vec<PositionedLine>,
    pub rules: Vec<PositionedRule>,
}

struct Leaf<'a> {
    content: &'a Content,
    lines: Vec<WrappedLine>,
}

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    leaves: HashMap<NodeId, Leaf<'a>>,
}

fn layout_err(e: taffy::TaffyError) -> MeasureError {
    MeasureError::Layout(e.to_string())
}

fn margins(s: &ComputedStyle) -> Rect<LengthPercentageAuto> {
    Rect {
        top: LengthPercentageAuto::Length(s.margin_top),
        right: LengthPercentageAuto::Length(s.margin_right),
        bottom: LengthPercentageAuto::Length(s.margin_bottom),
        left: LengthPercentageAuto::Length(s.margin_left),
    }
}

fn paddings(s: &ComputedStyle) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(s.padding_top),
        right: LengthPercentage::Length(s.padding_right),
        bottom: LengthPercentage::Length(s.padding_bottom),
        left: LengthPercentage::Length(s.padding_left),
    }
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        // Heights are summed per page, so keep fractional pixels.
        let mut taffy = TaffyTree::new();
        taffy.disable_rounding();
        Self {
            taffy,
            fonts,
            leaves: HashMap::new(),
        }
    }

    fn build_element(&mut self, element: &'a Element, width: f32) -> Result<NodeId, MeasureError> {
        match element {
            Element::Text(text) => self.build_text(text, width, false),
            Element::Columns { style, left, right } => {
                // Two flex-1 columns with a zero basis split the row evenly.
                let column = ((width - style.horizontal_insets()) / 2.0).max(1.0);
                let children = [
                    self.build_text(left, column, true)?,
                    self.build_text(right, column, true)?,
                ];
                let ts = Style {
                    display: taffy::Display::Flex,
                    flex_direction: match style.flex_direction {
                        style::FlexDirection::Row => taffy::FlexDirection::Row,
                        style::FlexDirection::Column => taffy::FlexDirection::Column,
                    },
                    justify_content: Some(match style.justify_content {
                        style::JustifyContent::Start => taffy::JustifyContent::Start,
                        style::JustifyContent::End => taffy::JustifyContent::End,
                        style::JustifyContent::Center => taffy::JustifyContent::Center,
                        style::JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
                    }),
                    margin: margins(style),
                    padding: paddings(style),
                    ..Default::default()
                };
                self.taffy.new_with_children(ts, &children).map_err(layout_err)
            }
        }
    }

    /// Wrapper box plus its content leaf. `width` is the wrapper's margin box.
    fn build_text(&mut self, text: &'a TextElement, width: f32, flex_item: bool) -> Result<NodeId, MeasureError> {
        let wrapper = &text.wrapper;
        let inner = (width - wrapper.horizontal_insets()).max(1.0);

        let mut children = Vec::new();
        if let Some(content) = &text.content {
            children.push(self.build_leaf(content, inner)?);
        }

        let mut ts = Style {
            display: taffy::Display::Flex,
            flex_direction: taffy::FlexDirection::Column,
            margin: margins(wrapper),
            padding: paddings(wrapper),
            ..Default::default()
        };
        if flex_item {
            ts.flex_grow = wrapper.flex_grow;
            ts.flex_shrink = wrapper.flex_shrink;
            ts.flex_basis = Dimension::Length(0.0);
            ts.min_size.width = Dimension::Length(0.0);
        }
        self.taffy.new_with_children(ts, &children).map_err(layout_err)
    }

    fn build_leaf(&mut self, content: &'a Content, width: f32) -> Result<NodeId, MeasureError> {
        let s = &content.style;
        let text_width = (width - s.horizontal_insets()).max(1.0);
        let run = RunStyle {
            family: &s.font_family,
            font_size: s.font_size,
            bold: s.is_bold(),
            italic: s.is_italic(),
        };

        let mut lines = Vec::new();
        for spans in &content.lines {
            let wrapped = wrap_spans(spans, run, text_width, self.fonts);
            if wrapped.is_empty() {
                // An empty visual line between `<br>`s still takes a line.
                lines.push(WrappedLine::default());
            } else {
                lines.extend(wrapped);
            }
        }

        let height = lines.len() as f32 * s.line_height_px()
            + s.padding_top
            + s.padding_bottom
            + s.border_top
            + s.border_bottom;

        let ts = Style {
            size: Size {
                width: Dimension::Auto,
                height: Dimension::Length(height),
            },
            margin: margins(s),
            ..Default::default()
        };
        let node = self.taffy.new_leaf(ts).map_err(layout_err)?;
        self.leaves.insert(node, Leaf { content, lines });
        Ok(node)
    }

    /// Walk the computed tree and emit positioned lines and rules.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32, out: &mut BlockLayout) -> Result<(), MeasureError> {
        let layout = self.taffy.layout(node).map_err(layout_err)?;
        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        if let Some(leaf) = self.leaves.get(&node) {
            self.emit_leaf(leaf, x, y, layout.size.width, layout.size.height, out);
        }

        for child in self.taffy.children(node).map_err(layout_err)? {
            self.extract(child, x, y, out)?;
        }
        Ok(())
    }

    fn emit_leaf(&self, leaf: &Leaf<'_>, x: f32, y: f32, width: f32, height: f32, out: &mut BlockLayout) {
        let s = &leaf.content.style;
        if s.border_top > 0.0 {
            out.rules.push(PositionedRule {
                x,
                y,
                width,
                thickness: s.border_top,
            });
        }
        if s.border_bottom > 0.0 {
            out.rules.push(PositionedRule {
                x,
                y: y + height - s.border_bottom,
                width,
                thickness: s.border_bottom,
            });
        }

        let line_height = s.line_height_px();
        let text_x = x + s.padding_left;
        let text_width = (width - s.padding_left - s.padding_right).max(0.0);
        let ascender = self
            .fonts
            .ascender_px(s.font_size, s.is_bold(), s.is_italic(), &s.font_family);
        // Half-leading above the glyph box, as in CSS line boxes.
        let half_leading = (line_height - s.font_size) / 2.0;

        for (i, line) in leaf.lines.iter().enumerate() {
            let top = y + s.border_top + s.padding_top + i as f32 * line_height;
            let free = (text_width - line.width).max(0.0);
            let align = match s.text_align {
                style::TextAlign::Left => 0.0,
                style::TextAlign::Center => free / 2.0,
                style::TextAlign::Right => free,
            };

            let mut fragments = line.fragments.clone();
            if i == 0 {
                if let LineRole::ListItem { marker } = &leaf.content.role {
                    let marker_width = self.fonts.measure_text_width(
                        marker,
                        s.font_size,
                        false,
                        false,
                        &s.font_family,
                    );
                    fragments.insert(
                        0,
                        Fragment {
                            text: marker.clone(),
                            x_offset: -(marker_width + MARKER_GAP_EM * s.font_size) - align,
                            width: marker_width,
                            bold: false,
                            italic: false,
                        },
                    );
                }
            }
            if fragments.is_empty() {
                continue;
            }

            out.lines.push(PositionedLine {
                x: text_x + align,
                y: top,
                baseline: top + half_leading + ascender,
                width: line.width,
                font_size: s.font_size,
                font_family: s.font_family.clone(),
                fragments,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lay out one rendered block at `content_width` px.
///
/// A fresh Taffy tree is built for every call and dropped before returning.
pub fn layout_block(unit: &RenderedBlock, content_width: f32, fonts: &FontManager) -> Result<BlockLayout, MeasureError> {
    if !content_width.is_finite() || content_width <= 0.0 {
        return Err(MeasureError::Layout(format!("invalid content width {content_width}")));
    }

    let mut builder = LayoutBuilder::new(fonts);
    let mut child_ids = Vec::with_capacity(unit.elements.len());
    for element in &unit.elements {
        child_ids.push(builder.build_element(element, content_width)?);
    }

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: Dimension::Length(content_width),
            height: Dimension::Auto,
        },
        ..Default::default()
    };
    let root = builder
        .taffy
        .new_with_children(root_style, &child_ids)
        .map_err(layout_err)?;

    builder
        .taffy
        .compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(content_width),
                height: AvailableSpace::MaxContent,
            },
        )
        .map_err(layout_err)?;

    let mut out = BlockLayout {
        height: builder.taffy.layout(root).map_err(layout_err)?.size.height,
        ..Default::default()
    };
    for child in builder.taffy.children(root).map_err(layout_err)? {
        builder.extract(child, 0.0, 0.0, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Block;
    use crate::layout_config::LayoutConfig;
    use crate::render::render_block;

    const WIDTH: f32 = 698.0;

    fn lay(block: &Block, config: &LayoutConfig) -> BlockLayout {
        let fonts = FontManager::default();
        layout_block(&render_block(block, config), WIDTH, &fonts).unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn left_line_height_is_line_plus_margins() {
        let config = LayoutConfig::default();
        let l = lay(&Block::Left { text: "Hello".into() }, &config);
        // wrapper my-1 (4 + 4) + paragraph margin-bottom 0.7rem + one 24 px line
        assert!(approx(l.height, 8.0 + 11.2 + 24.0), "got {}", l.height);
        assert_eq!(l.lines.len(), 1);
        assert!(approx(l.lines[0].y, 4.0));
    }

    #[test]
    fn center_block_stacks_lines() {
        let config = LayoutConfig::default();
        let one = lay(&Block::Center { lines: vec!["A".into()] }, &config);
        let two = lay(
            &Block::Center {
                lines: vec!["A".into(), "B".into()],
            },
            &config,
        );
        assert!(approx(two.height, 2.0 * one.height));
        assert!(two.lines[1].y > two.lines[0].y);
    }

    #[test]
    fn center_and_right_alignment() {
        let config = LayoutConfig::default();
        let c = lay(&Block::Center { lines: vec!["Hi".into()] }, &config);
        let line = &c.lines[0];
        assert!(approx(line.x + line.width / 2.0, WIDTH / 2.0));

        let r = lay(&Block::Right { text: "Hi".into() }, &config);
        let line = &r.lines[0];
        assert!(approx(line.x + line.width, WIDTH));
    }

    #[test]
    fn row_columns_split_width() {
        let config = LayoutConfig::default();
        let l = lay(&Block::row("MIT", "2019 - 2023"), &config);
        assert_eq!(l.lines.len(), 2);
        assert!(l.lines[0].x < WIDTH / 2.0);
        assert!(approx(l.lines[1].x + l.lines[1].width, WIDTH));
        // Same row: both lines share a top.
        assert!(approx(l.lines[0].y, l.lines[1].y));
    }

    #[test]
    fn long_text_wraps_and_grows() {
        let config = LayoutConfig::default();
        let short = lay(&Block::plain("word"), &config);
        let long = lay(&Block::plain(&"word ".repeat(200)), &config);
        assert!(long.lines.len() > 1);
        assert!(long.height > short.height);
    }

    #[test]
    fn fractional_line_heights_are_kept() {
        let config = LayoutConfig::compact();
        let line = config.font_size_px() * config.line_height;
        let one = lay(&Block::plain("word"), &config);
        let many = lay(&Block::plain(&"word ".repeat(50)), &config);
        let extra = (many.lines.len() - 1) as f32 * line;
        assert!(many.lines.len() > 1);
        assert!(approx(many.height - one.height, extra), "got {} vs {}", many.height - one.height, extra);
    }

    #[test]
    fn cjk_paragraph_wraps_inside_the_column() {
        let config = LayoutConfig::default();
        let one = lay(&Block::plain("负责"), &config);
        let l = lay(&Block::plain(&"负责简历生成系统的前端开发与分页排版引擎设计".repeat(10)), &config);
        assert_eq!(l.lines.len(), 6);
        assert!(l.lines.iter().all(|line| line.x + line.width <= WIDTH + 0.01));
        assert!(approx(l.height - one.height, 5.0 * 24.0));
    }

    #[test]
    fn compact_config_is_shorter() {
        let text = Block::plain(&"experience ".repeat(80));
        let d = lay(&text, &LayoutConfig::default());
        let c = lay(&text, &LayoutConfig::compact());
        assert!(c.height < d.height);
    }

    #[test]
    fn rule_and_list_marker() {
        let config = LayoutConfig::default();
        let rule = lay(&Block::plain("---"), &config);
        assert_eq!(rule.rules.len(), 1);
        assert!(rule.lines.is_empty());

        let item = lay(&Block::plain("- Built a pager"), &config);
        assert_eq!(item.lines[0].fragments[0].text, "\u{2022}");
        assert!(item.lines[0].fragments[0].x_offset < 0.0);
    }

    #[test]
    fn invalid_width_is_a_layout_error() {
        let fonts = FontManager::default();
        let unit = render_block(&Block::plain("x"), &LayoutConfig::default());
        assert!(matches!(
            layout_block(&unit, 0.0, &fonts),
            Err(MeasureError::Layout(_))
        ));
    }
}
