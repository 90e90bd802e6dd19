//! Font loading and text measurement using `ttf-parser`.
//!
//! Without a loaded TTF the manager falls back to synthetic metrics (average
//! advance of half an em), which keeps headless pagination deterministic.

use std::collections::HashMap;

use crate::error::Error;
use crate::markup::Span;

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API). Empty for
    /// synthetic metrics.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
    pub line_gap: f32,
}

impl FontData {
    fn synthetic() -> Self {
        Self {
            bytes: Vec::new(),
            units_per_em: 1000.0,
            ascender: 750.0,
            descender: -250.0,
            line_gap: 0.0,
        }
    }
}

/// Manages loaded fonts.
pub struct FontManager {
    fonts: HashMap<FontKey, FontData>,
    /// Key used when a requested face is not loaded.
    default_key: FontKey,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FontKey {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            bold,
            italic,
        }
    }
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            default_key: FontKey::new("Helvetica", false, false),
        }
    }

    /// Load a TTF/OTF font from bytes. The first font loaded becomes the
    /// fallback for unknown families.
    pub fn load_font(&mut self, family: &str, bold: bool, italic: bool, bytes: Vec<u8>) -> Result<(), Error> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| Error::Font(format!("Failed to parse font for {family:?}: {e}")))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            line_gap: face.line_gap() as f32,
            bytes,
        };

        let key = FontKey::new(family, bold, italic);
        if !self.has_real_fonts() {
            self.default_key = key.clone();
        }
        log::debug!("Loaded font {key:?} ({} units/em)", data.units_per_em);
        self.fonts.insert(key, data);
        Ok(())
    }

    /// Register synthetic Helvetica-like metrics when nothing is loaded.
    pub fn ensure_default(&mut self) {
        if self.fonts.is_empty() {
            let key = FontKey::new("Helvetica", false, false);
            self.fonts.insert(key.clone(), FontData::synthetic());
            self.fonts
                .insert(FontKey::new("Helvetica", true, false), FontData::synthetic());
            self.default_key = key;
        }
    }

    /// Get font data for a key: exact face, then the regular face of the
    /// same family, then the default.
    pub fn get(&self, key: &FontKey) -> Option<&FontData> {
        self.resolve(key).and_then(|k| self.fonts.get(k))
    }

    /// Key of the face that serves `key`, with the same fallback as [`get`](Self::get).
    pub fn resolve(&self, key: &FontKey) -> Option<&FontKey> {
        self.fonts
            .get_key_value(key)
            .or_else(|| self.fonts.get_key_value(&FontKey::new(&key.family, false, false)))
            .or_else(|| self.fonts.get_key_value(&self.default_key))
            .map(|(k, _)| k)
    }

    /// Faces backed by real font bytes.
    pub fn loaded_faces(&self) -> impl Iterator<Item = (&FontKey, &FontData)> {
        self.fonts.iter().filter(|(_, d)| !d.bytes.is_empty())
    }

    /// Measure the width of a string at a given font size (in px).
    ///
    /// With real font bytes the glyph advances are summed. Otherwise an
    /// average width of 0.5 × font_size per char is used (bold ~10 % wider),
    /// and a full em for CJK and other full-width characters.
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool, italic: bool, family: &str) -> f32 {
        let heuristic = |text: &str| {
            let avg = if bold { 0.55 } else { 0.5 };
            text.chars()
                .map(|c| if is_wide(c) { font_size } else { font_size * avg })
                .sum::<f32>()
        };

        let Some(data) = self.get(&FontKey::new(family, bold, italic)) else {
            return heuristic(text);
        };
        if data.bytes.is_empty() {
            return heuristic(text);
        }

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None if is_wide(ch) => font_size,
                        None => font_size * 0.5,
                    })
                    .sum()
            }
            Err(_) => heuristic(text),
        }
    }

    /// Line height in px.
    pub fn line_height_px(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }

    /// Ascender in px for the given font.
    pub fn ascender_px(&self, font_size: f32, bold: bool, italic: bool, family: &str) -> f32 {
        match self.get(&FontKey::new(family, bold, italic)) {
            Some(data) => data.ascender * font_size / data.units_per_em,
            None => font_size * 0.75,
        }
    }

    /// Check if real font bytes are loaded for the default font.
    pub fn has_real_fonts(&self) -> bool {
        self.fonts
            .get(&self.default_key)
            .map(|d| !d.bytes.is_empty())
            .unwrap_or(false)
    }
}

impl Default for FontManager {
    fn default() -> Self {
        let mut mgr = Self::new();
        mgr.ensure_default();
        mgr
    }
}

// ---------------------------------------------------------------------------
// Word wrapping
// ---------------------------------------------------------------------------

/// A piece of one wrapped line, positioned relative to the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub x_offset: f32,
    pub width: f32,
    pub bold: bool,
    pub italic: bool,
}

/// One wrapped visual line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedLine {
    pub fragments: Vec<Fragment>,
    pub width: f32,
}

impl WrappedLine {
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut end = 0.0f32;
        for frag in &self.fragments {
            if !out.is_empty() && frag.x_offset > end + 0.01 {
                out.push(' ');
            }
            out.push_str(&frag.text);
            end = frag.x_offset + frag.width;
        }
        out
    }
}

/// Text run settings shared by all spans of one element.
#[derive(Debug, Clone, Copy)]
pub struct RunStyle<'a> {
    pub family: &'a str,
    pub font_size: f32,
    /// Element-level emphasis, combined with each span's own.
    pub bold: bool,
    pub italic: bool,
}

/// Full-width scripts: CJK ideographs, kana, Hangul and full-width forms.
pub fn is_wide(c: char) -> bool {
    matches!(
        c,
        '\u{1100}'..='\u{115F}'
            | '\u{2E80}'..='\u{303F}'
            | '\u{3040}'..='\u{30FF}'
            | '\u{3100}'..='\u{31FF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{AC00}'..='\u{D7AF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{FE30}'..='\u{FE4F}'
            | '\u{FF00}'..='\u{FF60}'
            | '\u{FFE0}'..='\u{FFE6}'
            | '\u{20000}'..='\u{3FFFF}'
    )
}

struct Word<'a> {
    text: &'a str,
    bold: bool,
    italic: bool,
    space_before: bool,
}

/// Split spans into break units: whitespace-separated words, with every
/// full-width character a unit of its own so unspaced CJK text can wrap.
fn split_words(spans: &[Span]) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut pending_space = false;
    for span in spans {
        let mut rest = span.text.as_str();
        loop {
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                pending_space = true;
            }
            if trimmed.is_empty() {
                break;
            }
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            for unit in break_units(&trimmed[..end]) {
                words.push(Word {
                    text: unit,
                    bold: span.bold,
                    italic: span.italic,
                    space_before: pending_space && !words.is_empty(),
                });
                pending_space = false;
            }
            rest = &trimmed[end..];
        }
    }
    words
}

/// Cut a whitespace-free word before and after each full-width character.
fn break_units(word: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    for (i, c) in word.char_indices() {
        if is_wide(c) {
            if start < i {
                units.push(&word[start..i]);
            }
            let next = i + c.len_utf8();
            units.push(&word[i..next]);
            start = next;
        }
    }
    if start < word.len() {
        units.push(&word[start..]);
    }
    units
}

/// Cut `text` into pieces no wider than `max_width`, at character
/// boundaries. Each piece holds at least one character.
fn split_to_width<'t>(text: &'t str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<(&'t str, f32)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut width = 0.0f32;
    for (i, c) in text.char_indices() {
        let next = i + c.len_utf8();
        let w = measure(&text[i..next]);
        if i > start && width + w > max_width {
            pieces.push((&text[start..i], width));
            start = i;
            width = 0.0;
        }
        width += w;
    }
    if start < text.len() {
        pieces.push((&text[start..], width));
    }
    pieces
}

/// Greedy word-wrap of styled spans to `max_width` px. Lines break at
/// whitespace and around full-width characters. A word wider than the line
/// is broken at character boundaries. Returns no lines for blank input.
pub fn wrap_spans(spans: &[Span], run: RunStyle<'_>, max_width: f32, fonts: &FontManager) -> Vec<WrappedLine> {
    let words = split_words(spans);
    let space = fonts.measure_text_width(" ", run.font_size, run.bold, run.italic, run.family);

    let mut lines: Vec<WrappedLine> = Vec::new();
    let mut current = WrappedLine::default();

    for word in words {
        let bold = run.bold || word.bold;
        let italic = run.italic || word.italic;
        let measure = |t: &str| fonts.measure_text_width(t, run.font_size, bold, italic, run.family);
        let w = measure(word.text);
        let pieces = if w > max_width {
            split_to_width(word.text, max_width, measure)
        } else {
            vec![(word.text, w)]
        };

        for (n, (text, w)) in pieces.into_iter().enumerate() {
            let gap = if n == 0 && word.space_before { space } else { 0.0 };
            if !current.fragments.is_empty() && current.width + gap + w > max_width {
                lines.push(std::mem::take(&mut current));
            }
            let x_offset = if current.fragments.is_empty() {
                0.0
            } else {
                current.width + gap
            };
            current.fragments.push(Fragment {
                text: text.to_string(),
                x_offset,
                width: w,
                bold,
                italic,
            });
            current.width = x_offset + w;
        }
    }
    if !current.fragments.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const TUFFY: &[u8] = include_bytes!("../tests/fonts/Tuffy.ttf");

    fn run(font_size: f32) -> RunStyle<'static> {
        RunStyle {
            family: "Helvetica",
            font_size,
            bold: false,
            italic: false,
        }
    }

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::default();
        let w = mgr.measure_text_width("Hello", 16.0, false, false, "Helvetica");
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
    }

    #[test]
    fn unknown_family_falls_back_to_default() {
        let mgr = FontManager::default();
        let a = mgr.measure_text_width("abc", 10.0, false, false, "SimSun");
        let b = mgr.measure_text_width("abc", 10.0, false, false, "Helvetica");
        assert_eq!(a, b);
        assert!(!mgr.has_real_fonts());
    }

    #[test]
    fn loaded_font_drives_measurement() {
        let mut mgr = FontManager::new();
        mgr.load_font("Tuffy", false, false, TUFFY.to_vec()).unwrap();
        assert!(mgr.has_real_fonts());
        let w = mgr.measure_text_width("Hello", 16.0, false, false, "Tuffy");
        assert!(w > 0.0 && (w - 40.0).abs() > 0.5, "got {w}");
        // Bold falls back to the regular face, as does an unknown family.
        let key = FontKey::new("SimSun", true, false);
        assert_eq!(mgr.resolve(&key), Some(&FontKey::new("Tuffy", false, false)));
        assert_eq!(mgr.measure_text_width("Hello", 16.0, true, false, "Tuffy"), w);
        assert_eq!(mgr.loaded_faces().count(), 1);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut mgr = FontManager::default();
        let err = mgr.load_font("Broken", false, false, vec![0, 1, 2, 3]);
        assert!(matches!(err, Err(Error::Font(_))));
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let spans = vec![Span::new("Hello world foo bar")];
        let lines = wrap_spans(&spans, run(16.0), 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
        assert_eq!(lines[0].text(), "Hello");
    }

    #[test]
    fn spans_keep_spacing_and_emphasis() {
        let mgr = FontManager::default();
        let spans = vec![
            Span {
                text: "Phone:".into(),
                bold: true,
                italic: false,
            },
            Span::new(" 555"),
        ];
        let lines = wrap_spans(&spans, run(10.0), 1000.0, &mgr);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Phone: 555");
        assert!(lines[0].fragments[0].bold);
        assert!(!lines[0].fragments[1].bold);
    }

    #[test]
    fn blank_input_has_no_lines() {
        let mgr = FontManager::default();
        assert!(wrap_spans(&[Span::new("   ")], run(10.0), 100.0, &mgr).is_empty());
    }

    #[test]
    fn long_word_breaks_at_characters() {
        let mgr = FontManager::default();
        let lines = wrap_spans(&[Span::new("Supercalifragilistic")], run(16.0), 20.0, &mgr);
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.width <= 20.0));
        let joined: String = lines.iter().map(WrappedLine::text).collect();
        assert_eq!(joined, "Supercalifragilistic");
    }

    #[test]
    fn cjk_text_wraps_without_spaces() {
        let mgr = FontManager::default();
        let text = "负责简历生成系统的前端开发与分页排版引擎设计".repeat(10);
        let lines = wrap_spans(&[Span::new(text.as_str())], run(16.0), 698.0, &mgr);
        // 220 full-width chars at 16 px, 43 per line
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|l| l.width <= 698.0));
        let joined: String = lines.iter().map(WrappedLine::text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn mixed_scripts_keep_latin_words_whole() {
        let mgr = FontManager::default();
        let lines = wrap_spans(&[Span::new("使用Rust开发")], run(10.0), 1000.0, &mgr);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "使用Rust开发");
        let texts: Vec<&str> = lines[0].fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["使", "用", "Rust", "开", "发"]);
        // 4 full-width chars + 4 × 0.5 em
        assert!((lines[0].width - 60.0).abs() < 0.1);
    }
}
