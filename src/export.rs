//! PDF export – draws a [`Pagination`] with `printpdf` (v0.8 ops-based API).
//!
//! Every block is re-rendered with the same [`LayoutConfig`] it was paginated
//! with and laid out by the same measurer, so lines land exactly where the
//! measured heights said they would. Faces loaded into the measurer's
//! [`FontManager`] are embedded and drawn with, so glyph advances match the
//! line breaks. Synthetic metrics map to the built-in Helvetica faces.

use std::collections::HashMap;

use printpdf::*;

use crate::error::{Error, Result};
use crate::fonts::{FontKey, FontManager};
use crate::layout::{BlockLayout, PositionedLine, PositionedRule};
use crate::layout_config::{LayoutConfig, PageGeometry};
use crate::measure::TextMetricsMeasurer;
use crate::pagination::Pagination;
use crate::render::render_block;

/// Points per CSS pixel.
const PT_PER_PX: f32 = 0.75;
/// Millimetres per CSS pixel (96 DPI).
const MM_PER_PX: f32 = 25.4 / 96.0;
/// Footer label size in points.
const FOOTER_SIZE_PT: f32 = 8.0;

/// Document-level export settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Title embedded in the PDF metadata.
    pub title: String,
    /// Draw "Page n / N" at the bottom of each page.
    pub footer: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Resume".to_string(),
            footer: false,
        }
    }
}

/// Render a pagination into PDF bytes. An empty pagination still produces a
/// one-page document.
pub fn render_pdf(
    pagination: &Pagination,
    config: &LayoutConfig,
    geometry: &PageGeometry,
    measurer: &TextMetricsMeasurer,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    let page_w = Mm(geometry.page_width_px() * MM_PER_PX);
    let page_h = Mm(geometry.page_height_px() * MM_PER_PX);
    let page_height_pt = geometry.page_height_px() * PT_PER_PX;
    let margin = geometry.margin_px();

    let mut doc = PdfDocument::new(&options.title);
    let embedded = embed_fonts(&mut doc, measurer.fonts())?;
    let faces = Faces {
        fonts: measurer.fonts(),
        embedded: &embedded,
    };
    let mut pages = Vec::with_capacity(pagination.page_count().max(1));
    let total = pagination.page_count();

    for page in &pagination.pages {
        let mut ops = Vec::new();
        for (block, top) in page.blocks.iter().zip(page.offsets()) {
            let unit = render_block(block, config);
            let layout = measurer
                .layout(&unit, geometry.content_width())
                .map_err(|e| Error::Export(format!("page {}: {e}", page.page_index + 1)))?;
            draw_block(&mut ops, &faces, &layout, margin, margin + top, page_height_pt);
        }
        if options.footer {
            draw_footer(&mut ops, page.page_index + 1, total, geometry);
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    log::debug!("Writing PDF with {} pages", pages.len());
    doc.with_pages(pages);
    Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
}

/// Add every loaded face to the document.
fn embed_fonts(doc: &mut PdfDocument, fonts: &FontManager) -> Result<HashMap<FontKey, FontId>> {
    let mut embedded = HashMap::new();
    for (key, data) in fonts.loaded_faces() {
        let mut warnings = Vec::new();
        let parsed = ParsedFont::from_bytes(&data.bytes, 0, &mut warnings)
            .ok_or_else(|| Error::Font(format!("Cannot embed font {:?}", key.family)))?;
        log::debug!("Embedding font {key:?}");
        embedded.insert(key.clone(), doc.add_font(&parsed));
    }
    Ok(embedded)
}

/// The face a fragment is drawn with.
#[derive(Debug, Clone, PartialEq)]
enum Face {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

struct Faces<'f> {
    fonts: &'f FontManager,
    embedded: &'f HashMap<FontKey, FontId>,
}

impl Faces<'_> {
    /// Same fallback chain as measurement.
    fn pick(&self, family: &str, bold: bool, italic: bool) -> Face {
        self.fonts
            .resolve(&FontKey::new(family, bold, italic))
            .and_then(|key| self.embedded.get(key))
            .map(|id| Face::Embedded(id.clone()))
            .unwrap_or_else(|| Face::Builtin(builtin(bold, italic)))
    }
}

fn draw_block(ops: &mut Vec<Op>, faces: &Faces<'_>, layout: &BlockLayout, left_px: f32, top_px: f32, page_height_pt: f32) {
    for rule in &layout.rules {
        draw_rule(ops, rule, left_px, top_px, page_height_pt);
    }
    for line in &layout.lines {
        draw_line(ops, faces, line, left_px, top_px, page_height_pt);
    }
}

fn builtin(bold: bool, italic: bool) -> BuiltinFont {
    match (bold, italic) {
        (true, true) => BuiltinFont::HelveticaBoldOblique,
        (true, false) => BuiltinFont::HelveticaBold,
        (false, true) => BuiltinFont::HelveticaOblique,
        (false, false) => BuiltinFont::Helvetica,
    }
}

fn black() -> Color {
    Color::Rgb(Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        icc_profile: None,
    })
}

fn draw_text(ops: &mut Vec<Op>, text: &str, x_pt: f32, y_pt: f32, size_pt: f32, face: Face) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(x_pt),
            y: Pt(y_pt),
        },
    });
    ops.push(Op::SetFillColor { col: black() });
    match face {
        Face::Builtin(font) => {
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(size_pt),
                font,
            });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(text))],
                font,
            });
        }
        Face::Embedded(font) => {
            ops.push(Op::SetFontSize {
                size: Pt(size_pt),
                font: font.clone(),
            });
            ops.push(Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font,
            });
        }
    }
    ops.push(Op::EndTextSection);
}

fn draw_line(ops: &mut Vec<Op>, faces: &Faces<'_>, line: &PositionedLine, left_px: f32, top_px: f32, page_height_pt: f32) {
    // PDF origin is bottom-left, layout origin is top-left.
    let baseline_pt = page_height_pt - (top_px + line.baseline) * PT_PER_PX;
    let size_pt = line.font_size * PT_PER_PX;
    for frag in &line.fragments {
        let x_pt = (left_px + line.x + frag.x_offset) * PT_PER_PX;
        let face = faces.pick(&line.font_family, frag.bold, frag.italic);
        draw_text(ops, &frag.text, x_pt, baseline_pt, size_pt, face);
    }
}

fn draw_rule(ops: &mut Vec<Op>, rule: &PositionedRule, left_px: f32, top_px: f32, page_height_pt: f32) {
    let y = page_height_pt - (top_px + rule.y + rule.thickness / 2.0) * PT_PER_PX;
    let x1 = (left_px + rule.x) * PT_PER_PX;
    let x2 = x1 + rule.width * PT_PER_PX;

    ops.push(Op::SetOutlineColor { col: black() });
    ops.push(Op::SetOutlineThickness {
        pt: Pt(rule.thickness * PT_PER_PX),
    });
    ops.push(Op::DrawLine {
        line: Line {
            points: vec![
                LinePoint {
                    p: Point { x: Pt(x1), y: Pt(y) },
                    bezier: false,
                },
                LinePoint {
                    p: Point { x: Pt(x2), y: Pt(y) },
                    bezier: false,
                },
            ],
            is_closed: false,
        },
    });
}

fn draw_footer(ops: &mut Vec<Op>, number: usize, total: usize, geometry: &PageGeometry) {
    let label = format!("Page {number} / {total}");
    // Rough centring with the 0.5 em average advance.
    let width_pt = label.chars().count() as f32 * FOOTER_SIZE_PT * 0.5;
    let x = geometry.page_width_px() * PT_PER_PX / 2.0 - width_pt / 2.0;
    let y = geometry.margin_px() * PT_PER_PX / 2.0;
    draw_text(ops, &label, x, y, FOOTER_SIZE_PT, Face::Builtin(BuiltinFont::Helvetica));
}

/// Built-in fonts cover WinAnsi only. Typographic punctuation is folded to
/// ASCII and anything else outside ASCII becomes `?`.
fn to_winlatin(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2022}' => '-',
            '\u{00A0}' => ' ',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}
