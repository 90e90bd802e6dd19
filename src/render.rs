//! Block renderer – maps a parsed [`Block`] to the element tree it is
//! displayed as, for one [`LayoutConfig`].
//!
//! The output is backend independent: a few styled boxes holding interpreted
//! markup. Both the height oracle and the PDF exporter consume the same
//! [`RenderedBlock`], so what is measured is what is drawn.
//!
//! | block    | element tree                                                       |
//! |----------|--------------------------------------------------------------------|
//! | `Center` | one `text-center my-1` box per line, stacked                       |
//! | `Row`    | `flex flex-row justify-between my-1` with two `flex-1` columns     |
//! | `Left`   | one `text-left my-1` box                                           |
//! | `Right`  | one `text-right my-1` box                                          |
//! | `Plain`  | one full-width box                                                 |

use crate::blocks::Block;
use crate::layout_config::LayoutConfig;
use crate::markup::{parse_markup, LineRole, Span};
use crate::style::{resolve_classes, resolve_style, ComputedStyle};

pub const CENTER_CLASSES: &str = "text-center my-1";
pub const ROW_CLASSES: &str = "flex flex-row justify-between my-1 w-full";
pub const ROW_LEFT_CLASSES: &str = "text-left flex-1";
pub const ROW_RIGHT_CLASSES: &str = "text-right flex-1";
pub const LEFT_CLASSES: &str = "text-left my-1";
pub const RIGHT_CLASSES: &str = "text-right my-1";
pub const PLAIN_CLASSES: &str = "w-full pl-0";

/// A block ready to be measured or drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    /// Style parameters the block was rendered with.
    pub config: LayoutConfig,
    /// Top-level elements, stacked vertically.
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextElement),
    /// Two equal columns side by side.
    Columns {
        style: ComputedStyle,
        left: TextElement,
        right: TextElement,
    },
}

/// A wrapper box holding the interpreted markup of one source line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub wrapper: ComputedStyle,
    /// `None` when the line has nothing to display.
    pub content: Option<Content>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub style: ComputedStyle,
    pub role: LineRole,
    /// Visual lines of spans. Empty for rules.
    pub lines: Vec<Vec<Span>>,
}

impl TextElement {
    fn new(config: &LayoutConfig, classes: &str, source: &str) -> Self {
        let wrapper = resolve_classes(config, classes);
        let markup = parse_markup(source);

        let content = if markup.role != LineRole::Rule && markup.is_blank() {
            None
        } else {
            let mut style = resolve_style(config, &markup.role, "");
            style.text_align = wrapper.text_align;
            let mut lines = markup.lines;
            while lines.last().is_some_and(|l| l.iter().all(|s| s.text.trim().is_empty())) {
                lines.pop();
            }
            Some(Content {
                style,
                role: markup.role,
                lines,
            })
        };

        Self { wrapper, content }
    }

    /// Visible text, visual lines joined by `\n`.
    pub fn plain_text(&self) -> String {
        self.content
            .as_ref()
            .map(|c| {
                c.lines
                    .iter()
                    .map(|spans| spans.iter().map(|s| s.text.as_str()).collect::<String>())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

/// Render one block. Pure mapping: no state, no failure modes.
pub fn render_block(block: &Block, config: &LayoutConfig) -> RenderedBlock {
    let elements = match block {
        Block::Center { lines } => lines
            .iter()
            .map(|line| Element::Text(TextElement::new(config, CENTER_CLASSES, line)))
            .collect(),
        Block::Row { left, right } => vec![Element::Columns {
            style: resolve_classes(config, ROW_CLASSES),
            left: TextElement::new(config, ROW_LEFT_CLASSES, left),
            right: TextElement::new(config, ROW_RIGHT_CLASSES, right),
        }],
        Block::Left { text } => vec![Element::Text(TextElement::new(config, LEFT_CLASSES, text))],
        Block::Right { text } => vec![Element::Text(TextElement::new(config, RIGHT_CLASSES, text))],
        Block::Plain { text } => vec![Element::Text(TextElement::new(config, PLAIN_CLASSES, text))],
    };

    RenderedBlock {
        config: config.clone(),
        elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Display, TextAlign};

    fn text(el: &Element) -> &TextElement {
        match el {
            Element::Text(t) => t,
            other => panic!("expected text element, got {other:?}"),
        }
    }

    #[test]
    fn center_lines_become_separate_elements() {
        let block = Block::Center {
            lines: vec!["Jane Doe".into(), "jane@example.com".into()],
        };
        let r = render_block(&block, &LayoutConfig::default());
        assert_eq!(r.elements.len(), 2);
        for el in &r.elements {
            let t = text(el);
            assert_eq!(t.wrapper.text_align, TextAlign::Center);
            assert_eq!(t.content.as_ref().map(|c| c.style.text_align), Some(TextAlign::Center));
        }
        assert_eq!(text(&r.elements[1]).plain_text(), "jane@example.com");
    }

    #[test]
    fn row_is_one_flex_unit() {
        let r = render_block(&Block::row("**MIT**", "2019"), &LayoutConfig::default());
        assert_eq!(r.elements.len(), 1);
        match &r.elements[0] {
            Element::Columns { style, left, right } => {
                assert_eq!(style.display, Display::Flex);
                assert_eq!(left.wrapper.flex_grow, 1.0);
                assert_eq!(right.wrapper.text_align, TextAlign::Right);
                assert_eq!(left.plain_text(), "MIT");
            }
            other => panic!("expected columns, got {other:?}"),
        }
    }

    #[test]
    fn padded_row_side_has_no_content() {
        let r = render_block(&Block::row("Only left", ""), &LayoutConfig::default());
        let Element::Columns { right, .. } = &r.elements[0] else {
            panic!("expected columns");
        };
        assert!(right.content.is_none());
    }

    #[test]
    fn plain_heading_keeps_role() {
        let r = render_block(&Block::plain("# Jane Doe"), &LayoutConfig::default());
        let content = text(&r.elements[0]).content.clone().unwrap();
        assert_eq!(content.role, LineRole::Heading(1));
        assert!(content.style.is_bold());
    }

    #[test]
    fn rendered_block_remembers_config() {
        let compact = LayoutConfig::compact();
        let r = render_block(&Block::plain("text"), &compact);
        assert_eq!(r.config, compact);
        let content = text(&r.elements[0]).content.clone().unwrap();
        assert_eq!(content.style.font_size, compact.font_size_px());
    }

    #[test]
    fn rule_renders_without_text() {
        let r = render_block(&Block::plain("---"), &LayoutConfig::default());
        let content = text(&r.elements[0]).content.clone().unwrap();
        assert_eq!(content.role, LineRole::Rule);
        assert!(content.lines.is_empty());
    }
}
