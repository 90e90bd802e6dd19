//! Inline markup – interprets the markdown-like text inside a block for
//! display.
//!
//! Only what changes the visual result is recognised:
//! - line roles: `#`..`######` headings, `-`/`*`/`+`/`1.` list items,
//!   `---` rules
//! - emphasis: `**bold**`, `__bold__`, `*italic*`, `` `code` ``
//! - links and images: `[text](url)`, `![alt](src)` → their text
//! - inline HTML: `<br>` breaks the line, `<b>`/`<strong>` and `<i>`/`<em>`
//!   toggle emphasis, every other tag is dropped
//! - character entities
//!
//! Markup never changes block boundaries; it is consulted by the renderer
//! and the layout engine only.

/// Structural role of a line, taken from its leading markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRole {
    Paragraph,
    /// Heading level 1–6.
    Heading(u8),
    /// Bullet or numbered item with its display marker (`•`, `3.`).
    ListItem { marker: String },
    /// Horizontal rule (`---`, `***`, `___`).
    Rule,
}

/// A run of text sharing one emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }
}

/// One interpreted source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    pub role: LineRole,
    /// Visual lines (split at `<br>`), each a list of spans.
    pub lines: Vec<Vec<Span>>,
}

impl Markup {
    /// Visible text with markup removed, visual lines joined by `\n`.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|spans| spans.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when nothing visible remains after interpretation.
    pub fn is_blank(&self) -> bool {
        self.lines
            .iter()
            .all(|spans| spans.iter().all(|s| s.text.trim().is_empty()))
    }
}

/// Interpret one source line.
pub fn parse_markup(line: &str) -> Markup {
    let (role, body) = line_role(line);
    let lines = if role == LineRole::Rule {
        Vec::new()
    } else {
        InlineParser::new(body).parse()
    };
    Markup { role, lines }
}

fn line_role(line: &str) -> (LineRole, &str) {
    let trimmed = line.trim();

    if is_rule(trimmed) {
        return (LineRole::Rule, "");
    }

    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        let rest = &trimmed[hashes..];
        if rest.is_empty() || rest.starts_with(' ') {
            return (LineRole::Heading(hashes as u8), rest.trim_start());
        }
    }

    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(bullet) {
            return (
                LineRole::ListItem {
                    marker: "\u{2022}".to_string(),
                },
                rest.trim_start(),
            );
        }
    }

    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = trimmed[digits..].strip_prefix(". ") {
            return (
                LineRole::ListItem {
                    marker: format!("{}.", &trimmed[..digits]),
                },
                rest.trim_start(),
            );
        }
    }

    (LineRole::Paragraph, trimmed)
}

fn is_rule(s: &str) -> bool {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&m| compact.chars().all(|c| c == m))
}

// ---------------------------------------------------------------------------
// Inline parser
// ---------------------------------------------------------------------------

struct InlineParser<'a> {
    input: &'a str,
    pos: usize,
    bold: bool,
    italic: bool,
    buf: String,
    lines: Vec<Vec<Span>>,
}

impl<'a> InlineParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            bold: false,
            italic: false,
            buf: String::new(),
            lines: vec![Vec::new()],
        }
    }

    fn parse(mut self) -> Vec<Vec<Span>> {
        while !self.eof() {
            if self.starts_with("**") || self.starts_with("__") {
                let delim = &self.input[self.pos..self.pos + 2];
                if self.bold || self.rest_after(2).contains(delim) {
                    self.flush();
                    self.bold = !self.bold;
                    self.advance(2);
                    continue;
                }
            } else if self.starts_with("*") {
                if self.italic || self.rest_after(1).contains('*') {
                    self.flush();
                    self.italic = !self.italic;
                    self.advance(1);
                    continue;
                }
            } else if self.starts_with("`") {
                if let Some(end) = self.rest_after(1).find('`') {
                    let code = &self.input[self.pos + 1..self.pos + 1 + end];
                    self.buf.push_str(code);
                    self.pos += end + 2;
                    continue;
                }
            } else if self.starts_with("![") || self.starts_with("[") {
                if self.try_link() {
                    continue;
                }
            } else if self.starts_with("<") && self.try_tag() {
                continue;
            }
            let c = self.current_char();
            self.buf.push(c);
            self.pos += c.len_utf8();
        }
        self.flush();
        self.finish()
    }

    /// `[text](url)` / `![alt](src)` → text. Returns false when the bracket
    /// is not a link, leaving the position untouched.
    fn try_link(&mut self) -> bool {
        let open = if self.starts_with("!") { 2 } else { 1 };
        let rest = self.rest_after(open);
        let Some(close) = rest.find("](") else {
            return false;
        };
        let Some(end) = rest[close + 2..].find(')') else {
            return false;
        };
        let text = &rest[..close];
        self.buf.push_str(text);
        self.pos += open + close + 2 + end + 1;
        true
    }

    /// Interpret an inline HTML tag. Returns false for a lone `<`.
    fn try_tag(&mut self) -> bool {
        let Some(end) = self.rest_after(1).find('>') else {
            return false;
        };
        let inner = &self.input[self.pos + 1..self.pos + 1 + end];
        let closing = inner.starts_with('/');
        let name: String = inner
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            return false;
        }
        self.flush();
        match name.as_str() {
            "br" => self.lines.push(Vec::new()),
            "b" | "strong" => self.bold = !closing,
            "i" | "em" => self.italic = !closing,
            _ => {}
        }
        self.pos += end + 2;
        true
    }

    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = decode_entities(&std::mem::take(&mut self.buf));
        if let Some(line) = self.lines.last_mut() {
            line.push(Span {
                text,
                bold: self.bold,
                italic: self.italic,
            });
        }
    }

    /// Trim trailing whitespace (markdown hard-break spaces) per line and
    /// drop emptied spans.
    fn finish(mut self) -> Vec<Vec<Span>> {
        for line in &mut self.lines {
            while let Some(last) = line.last_mut() {
                let trimmed = last.text.trim_end().len();
                last.text.truncate(trimmed);
                if last.text.is_empty() {
                    line.pop();
                } else {
                    break;
                }
            }
        }
        self.lines
    }

    fn rest_after(&self, n: usize) -> &'a str {
        self.input.get(self.pos + n..).unwrap_or("")
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or(' ')
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_levels() {
        let m = parse_markup("## Education");
        assert_eq!(m.role, LineRole::Heading(2));
        assert_eq!(m.plain_text(), "Education");
        assert_eq!(parse_markup("#hashtag").role, LineRole::Paragraph);
    }

    #[test]
    fn list_items_and_rules() {
        assert_eq!(
            parse_markup("- Built things").role,
            LineRole::ListItem {
                marker: "\u{2022}".into()
            }
        );
        assert_eq!(
            parse_markup("12. Twelfth").role,
            LineRole::ListItem {
                marker: "12.".into()
            }
        );
        let rule = parse_markup("---");
        assert_eq!(rule.role, LineRole::Rule);
        assert!(rule.is_blank());
    }

    #[test]
    fn emphasis_spans() {
        let m = parse_markup("**Phone:** 555-0100  ");
        assert_eq!(
            m.lines,
            vec![vec![
                Span {
                    text: "Phone:".into(),
                    bold: true,
                    italic: false
                },
                Span::new(" 555-0100"),
            ]]
        );
    }

    #[test]
    fn unmatched_star_is_literal() {
        assert_eq!(parse_markup("5 * 3").plain_text(), "5 * 3");
    }

    #[test]
    fn links_code_and_entities() {
        let m = parse_markup("See [site](https://x.y) and `cargo` &amp; more");
        assert_eq!(m.plain_text(), "See site and cargo & more");
    }

    #[test]
    fn inline_html_tags() {
        let m = parse_markup("<strong>MIT</strong><br/>Cambridge <span>MA</span>");
        assert_eq!(m.lines.len(), 2);
        assert!(m.lines[0][0].bold);
        assert_eq!(m.plain_text(), "MIT\nCambridge MA");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        assert_eq!(parse_markup("a < b").plain_text(), "a < b");
    }
}
