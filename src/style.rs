//! Style resolver – maps a line's markup role and the Tailwind-like utility
//! classes the block renderer attaches (`text-center my-1`,
//! `flex flex-row justify-between`, `flex-1`, ...) to a flat
//! [`ComputedStyle`] consumed by the layout engine.
//!
//! Theme sizes are in `rem` (16 px) like the browser preview, so headings do
//! not scale with the body font size.

use crate::layout_config::{LayoutConfig, Theme};
use crate::markup::LineRole;

/// Root em size in pixels.
pub const REM_PX: f32 = 16.0;

/// Fully resolved style for a single rendered element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Display / layout
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub justify_content: JustifyContent,

    // Spacing (px)
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,

    // Rules (px)
    pub border_top: f32,
    pub border_bottom: f32,

    // Typography
    pub font_family: String,
    /// Font size in px.
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    /// Multiple of `font_size`.
    pub line_height: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            justify_content: JustifyContent::Start,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            padding_top: 0.0,
            padding_right: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            border_top: 0.0,
            border_bottom: 0.0,
            font_family: "Helvetica".to_string(),
            font_size: 16.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_align: TextAlign::Left,
            line_height: 1.5,
        }
    }
}

impl ComputedStyle {
    /// Body text style for a layout configuration.
    pub fn base(config: &LayoutConfig) -> Self {
        Self {
            font_family: config.font_family.clone(),
            font_size: config.font_size_px(),
            line_height: config.line_height,
            ..Self::default()
        }
    }

    /// Height of one line of text in px.
    pub fn line_height_px(&self) -> f32 {
        self.font_size * self.line_height
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.font_style == FontStyle::Italic
    }

    pub fn horizontal_insets(&self) -> f32 {
        self.margin_left + self.margin_right + self.padding_left + self.padding_right
    }
}

// ---------------------------------------------------------------------------
// Supporting enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    End,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the style of one element: role defaults from the theme, then the
/// utility classes in order.
pub fn resolve_style(config: &LayoutConfig, role: &LineRole, classes: &str) -> ComputedStyle {
    let mut style = base_style_for_role(config, role);
    for class in classes.split_whitespace() {
        apply_tailwind_class(&mut style, class);
    }
    style
}

/// Resolve a plain wrapper box: body typography plus the utility classes,
/// without any role defaults.
pub fn resolve_classes(config: &LayoutConfig, classes: &str) -> ComputedStyle {
    let mut style = ComputedStyle::base(config);
    for class in classes.split_whitespace() {
        apply_tailwind_class(&mut style, class);
    }
    style
}

/// Default styles based on markup role and theme.
fn base_style_for_role(config: &LayoutConfig, role: &LineRole) -> ComputedStyle {
    let mut s = ComputedStyle::base(config);
    let rem = |v: f32| v * REM_PX;
    match (config.theme, role) {
        (Theme::Classic, LineRole::Heading(1)) => {
            s.font_size = rem(2.2);
            s.font_weight = FontWeight::Bold;
            s.margin_bottom = rem(1.2);
            s.padding_bottom = rem(0.5);
        }
        (Theme::Classic, LineRole::Heading(2)) => {
            s.font_size = rem(1.5);
            s.font_weight = FontWeight::Bold;
            s.margin_top = rem(1.5);
            s.margin_bottom = rem(1.0);
            s.padding_left = rem(0.6);
            s.border_bottom = 1.0;
        }
        (Theme::Classic, LineRole::Heading(_)) => {
            s.font_size = rem(1.15);
            s.font_weight = FontWeight::Bold;
            s.margin_top = rem(1.0);
            s.margin_bottom = rem(0.5);
        }
        (Theme::Classic, LineRole::Paragraph) => {
            s.margin_bottom = rem(0.7);
        }
        (Theme::Classic, LineRole::ListItem { .. }) => {
            s.margin_left = rem(1.5);
            s.margin_bottom = rem(0.5);
        }
        (Theme::Classic, LineRole::Rule) => {
            s.margin_top = rem(1.5);
            s.margin_bottom = rem(1.5);
            s.border_top = 1.5;
        }
        (Theme::Mono, LineRole::Heading(1)) => {
            s.font_size = rem(2.1);
            s.font_weight = FontWeight::Bold;
            s.margin_bottom = rem(1.1);
            s.padding_bottom = rem(0.4);
            s.border_bottom = 2.0;
        }
        (Theme::Mono, LineRole::Heading(2)) => {
            s.font_size = rem(1.25);
            s.font_weight = FontWeight::Bold;
            s.margin_top = rem(1.3);
            s.margin_bottom = rem(0.8);
            // 4 px left rule drawn as inset
            s.padding_left = rem(0.5) + 4.0;
        }
        (Theme::Mono, LineRole::Heading(_)) => {
            s.font_size = rem(1.05);
            s.font_weight = FontWeight::Bold;
            s.margin_top = rem(0.8);
            s.margin_bottom = rem(0.4);
        }
        (Theme::Mono, LineRole::Paragraph) => {
            s.margin_bottom = rem(0.5);
        }
        (Theme::Mono, LineRole::ListItem { .. }) => {
            s.margin_left = rem(1.2);
            s.margin_bottom = rem(0.3);
        }
        (Theme::Mono, LineRole::Rule) => {
            s.margin_top = rem(1.1);
            s.margin_bottom = rem(1.1);
            s.border_top = 1.0;
        }
    }
    s
}

/// Apply a single Tailwind utility class.
fn apply_tailwind_class(s: &mut ComputedStyle, class: &str) {
    match class {
        // Display
        "flex" => s.display = Display::Flex,
        "block" => s.display = Display::Block,

        // Flex direction
        "flex-row" => s.flex_direction = FlexDirection::Row,
        "flex-col" => s.flex_direction = FlexDirection::Column,

        // Flex grow/shrink
        "flex-grow" | "grow" => s.flex_grow = 1.0,
        "flex-1" => {
            s.flex_grow = 1.0;
            s.flex_shrink = 1.0;
        }

        // Justify content
        "justify-start" => s.justify_content = JustifyContent::Start,
        "justify-end" => s.justify_content = JustifyContent::End,
        "justify-center" => s.justify_content = JustifyContent::Center,
        "justify-between" => s.justify_content = JustifyContent::SpaceBetween,

        // Font weight / style
        "font-bold" => s.font_weight = FontWeight::Bold,
        "font-normal" => s.font_weight = FontWeight::Normal,
        "italic" => s.font_style = FontStyle::Italic,
        "not-italic" => s.font_style = FontStyle::Normal,

        // Text alignment
        "text-left" => s.text_align = TextAlign::Left,
        "text-center" => s.text_align = TextAlign::Center,
        "text-right" => s.text_align = TextAlign::Right,

        // Full width is the default for block elements.
        "w-full" => {}

        _ => try_parse_spacing_class(s, class),
    }
}

fn try_parse_spacing_class(s: &mut ComputedStyle, class: &str) {
    // p-{n}, px-{n}, py-{n}, pt-{n}, ... and m-{n}, mx-{n}, my-{n}, ...
    // 1 unit = 4 px.
    let Some((prefix, value_str)) = class.rsplit_once('-') else {
        return;
    };
    let value = match value_str.parse::<f32>() {
        Ok(v) => v * 4.0,
        Err(_) => return,
    };

    match prefix {
        "p" => {
            s.padding_top = value;
            s.padding_right = value;
            s.padding_bottom = value;
            s.padding_left = value;
        }
        "px" => {
            s.padding_left = value;
            s.padding_right = value;
        }
        "py" => {
            s.padding_top = value;
            s.padding_bottom = value;
        }
        "pt" => s.padding_top = value,
        "pr" => s.padding_right = value,
        "pb" => s.padding_bottom = value,
        "pl" => s.padding_left = value,
        "m" => {
            s.margin_top = value;
            s.margin_right = value;
            s.margin_bottom = value;
            s.margin_left = value;
        }
        "mx" => {
            s.margin_left = value;
            s.margin_right = value;
        }
        "my" => {
            s.margin_top = value;
            s.margin_bottom = value;
        }
        "mt" => s.margin_top = value,
        "mr" => s.margin_right = value,
        "mb" => s.margin_bottom = value,
        "ml" => s.margin_left = value,
        _ => {}
    }
}
