//! Directive block parser – turns line-oriented résumé text into a flat list
//! of atomic [`Block`]s.
//!
//! Besides ordinary lines the input may contain layout directives:
//!
//! ```text
//! ::: center          ::: left            ::: left **MIT**
//! Jane Doe            **MIT**             ::: right 2019 - 2023
//! jane@example.com    *Research Intern*
//! :::                 :::
//!                     ::: right
//!                     2019 - 2023
//!                     Cambridge, MA
//!                     :::
//! ```
//!
//! A `left` region immediately followed by a `right` region is paired line by
//! line into [`Block::Row`]s. Blank lines never produce blocks and directive
//! markers are never emitted as content. Malformed input is never an error:
//! unterminated regions run to the end of the input and uneven left/right
//! regions are padded with empty text.

use serde::{Deserialize, Serialize};

/// An atomic, never-split unit of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Ordinary line, kept verbatim (inline markup included).
    Plain { text: String },
    /// Group of centered lines, stacked.
    Center { lines: Vec<String> },
    /// Single left-aligned line.
    Left { text: String },
    /// Single right-aligned line.
    Right { text: String },
    /// One visual row: left-aligned text and right-aligned text side by side.
    Row { left: String, right: String },
}

/// The parsed form of one raw input.
pub type Document = Vec<Block>;

impl Block {
    pub fn plain(text: impl Into<String>) -> Self {
        Block::Plain { text: text.into() }
    }

    pub fn row(left: impl Into<String>, right: impl Into<String>) -> Self {
        Block::Row {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Short variant tag, as used in the serialised form.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Plain { .. } => "plain",
            Block::Center { .. } => "center",
            Block::Left { .. } => "left",
            Block::Right { .. } => "right",
            Block::Row { .. } => "row",
        }
    }

    /// Every text fragment carried by the block, in display order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Block::Plain { text } | Block::Left { text } | Block::Right { text } => {
                vec![text.as_str()]
            }
            Block::Center { lines } => lines.iter().map(String::as_str).collect(),
            Block::Row { left, right } => vec![left.as_str(), right.as_str()],
        }
    }
}

/// The three region kinds a directive can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Center,
    Left,
    Right,
}

impl Region {
    const ALL: [Region; 3] = [Region::Center, Region::Left, Region::Right];

    fn keyword(self) -> &'static str {
        match self {
            Region::Center => "center",
            Region::Left => "left",
            Region::Right => "right",
        }
    }
}

/// Classification of a single raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    /// The region terminator `:::`.
    Close,
    /// `::: <region> [inline text] [:::]`
    Open {
        region: Region,
        inline: Option<&'a str>,
        /// The opener line carries its own terminator.
        closed: bool,
    },
    Text,
}

const FENCE: &str = ":::";

fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if line.trim_end() == FENCE {
        return LineKind::Close;
    }
    let Some(rest) = line.strip_prefix(FENCE) else {
        return LineKind::Text;
    };
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    for region in Region::ALL {
        let Some(after) = rest.strip_prefix(region.keyword()) else {
            continue;
        };
        // `::: centered` is not a directive.
        if !after.is_empty() && !after.starts_with(|c: char| c.is_whitespace() || c == ':') {
            continue;
        }
        let mut inline = after.trim();
        let mut closed = false;
        if let Some(body) = inline.strip_suffix(FENCE) {
            inline = body.trim();
            closed = true;
        }
        return LineKind::Open {
            region,
            inline: (!inline.is_empty()).then_some(inline),
            closed,
        };
    }
    LineKind::Text
}

/// Parse raw text into an ordered list of blocks.
///
/// Lines are split on `\n` or `\r\n`. The output preserves source order.
pub fn parse_blocks(raw: &str) -> Document {
    let parser = Parser {
        lines: raw.lines().collect(),
        pos: 0,
    };
    parser.parse()
}

struct Parser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse(mut self) -> Vec<Block> {
        let mut blocks = Vec::new();
        while let Some(line) = self.peek() {
            match classify(line) {
                // Stray terminators are markup, not content.
                LineKind::Blank | LineKind::Close => self.pos += 1,
                LineKind::Text => {
                    blocks.push(Block::plain(line));
                    self.pos += 1;
                }
                LineKind::Open {
                    region,
                    inline,
                    closed,
                } => self.parse_region(region, inline, closed, &mut blocks),
            }
        }
        blocks
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    fn peek_kind_at(&self, index: usize) -> Option<LineKind<'a>> {
        self.lines.get(index).copied().map(classify)
    }

    /// Handle a region whose opener sits at `self.pos`.
    fn parse_region(
        &mut self,
        region: Region,
        inline: Option<&'a str>,
        closed: bool,
        blocks: &mut Vec<Block>,
    ) {
        // Shorthand: `::: left A` directly followed by `::: right B`.
        if let (Region::Left, Some(left)) = (region, inline) {
            if let Some(LineKind::Open {
                region: Region::Right,
                inline: Some(right),
                ..
            }) = self.peek_kind_at(self.pos + 1)
            {
                blocks.push(Block::row(left, right));
                self.pos += 2;
                return;
            }
        }

        let lines = self.consume_region(inline, closed);
        match region {
            Region::Center => {
                if !lines.is_empty() {
                    blocks.push(Block::Center { lines });
                }
            }
            Region::Right => {
                blocks.extend(lines.into_iter().map(|text| Block::Right { text }));
            }
            Region::Left => {
                if let Some(LineKind::Open {
                    region: Region::Right,
                    inline,
                    closed,
                }) = self.peek_kind_at(self.pos)
                {
                    let right = self.consume_region(inline, closed);
                    pair_rows(lines, right, blocks);
                } else {
                    blocks.extend(lines.into_iter().map(|text| Block::Left { text }));
                }
            }
        }
    }

    /// Consume the opener at `self.pos` and the region body up to and
    /// including its terminator. Blank body lines are dropped.
    fn consume_region(&mut self, inline: Option<&'a str>, closed: bool) -> Vec<String> {
        self.pos += 1;
        let mut lines: Vec<String> = inline.map(str::to_string).into_iter().collect();
        if closed {
            return lines;
        }
        while let Some(line) = self.peek() {
            self.pos += 1;
            match classify(line) {
                LineKind::Close => break,
                LineKind::Blank => {}
                _ => lines.push(line.to_string()),
            }
        }
        lines
    }
}

/// Pair left/right lines index by index, padding the shorter side with "".
fn pair_rows(left: Vec<String>, right: Vec<String>, blocks: &mut Vec<Block>) {
    let rows = left.len().max(right.len());
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    for _ in 0..rows {
        blocks.push(Block::Row {
            left: left.next().unwrap_or_default(),
            right: right.next().unwrap_or_default(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_and_blank_skipping() {
        let blocks = parse_blocks("# Name\n\nPlain line");
        assert_eq!(
            blocks,
            vec![Block::plain("# Name"), Block::plain("Plain line")]
        );
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("\n\n   \r\n").is_empty());
    }

    #[test]
    fn crlf_line_endings() {
        let blocks = parse_blocks("one\r\ntwo\r\n");
        assert_eq!(blocks, vec![Block::plain("one"), Block::plain("two")]);
    }

    #[test]
    fn center_region_drops_blank_lines() {
        let blocks = parse_blocks("::: center\nJane Doe\n\njane@example.com\n:::\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::Center {
                    lines: vec!["Jane Doe".into(), "jane@example.com".into()]
                },
                Block::plain("after"),
            ]
        );
    }

    #[test]
    fn adjacent_center_regions_stay_separate() {
        let blocks = parse_blocks(":::center\nA\n:::\n:::center\nB\n:::");
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.kind() == "center"));
    }

    #[test]
    fn left_region_followed_by_right_region_pairs_rows() {
        let input = "::: left\n**MIT**\n*Intern*\n:::\n::: right\n2019\nBoston\n:::";
        let blocks = parse_blocks(input);
        assert_eq!(
            blocks,
            vec![Block::row("**MIT**", "2019"), Block::row("*Intern*", "Boston")]
        );
    }

    #[test]
    fn uneven_regions_pad_with_empty_text() {
        let input = "::: left\nA\nB\nC\n:::\n::: right\n1\n:::";
        let blocks = parse_blocks(input);
        assert_eq!(
            blocks,
            vec![Block::row("A", "1"), Block::row("B", ""), Block::row("C", "")]
        );
    }

    #[test]
    fn left_region_alone_yields_left_blocks() {
        let blocks = parse_blocks("::: left\nA\nB\nC\n:::\nnext");
        assert_eq!(
            blocks,
            vec![
                Block::Left { text: "A".into() },
                Block::Left { text: "B".into() },
                Block::Left { text: "C".into() },
                Block::plain("next"),
            ]
        );
    }

    #[test]
    fn right_region_requires_immediate_adjacency() {
        // A blank line between the regions breaks the pairing.
        let blocks = parse_blocks("::: left\nA\n:::\n\n::: right\n1\n:::");
        assert_eq!(
            blocks,
            vec![Block::Left { text: "A".into() }, Block::Right { text: "1".into() }]
        );
    }

    #[test]
    fn single_line_shorthand_row() {
        let blocks = parse_blocks("::: left **MIT** :::\n::: right 2019 - 2023 :::\nrest");
        assert_eq!(
            blocks,
            vec![Block::row("**MIT**", "2019 - 2023"), Block::plain("rest")]
        );
    }

    #[test]
    fn shorthand_without_terminators() {
        let blocks = parse_blocks(":::left Company\n:::right 2021");
        assert_eq!(blocks, vec![Block::row("Company", "2021")]);
    }

    #[test]
    fn unterminated_region_reads_to_end() {
        let blocks = parse_blocks("intro\n::: center\nA\nB");
        assert_eq!(
            blocks,
            vec![
                Block::plain("intro"),
                Block::Center {
                    lines: vec!["A".into(), "B".into()]
                },
            ]
        );
    }

    #[test]
    fn empty_region_yields_nothing() {
        assert!(parse_blocks("::: center\n\n:::").is_empty());
        assert!(parse_blocks("::: left\n:::\n::: right\n:::").is_empty());
        assert!(parse_blocks("::: right :::").is_empty());
    }

    #[test]
    fn stray_terminator_is_not_content() {
        let blocks = parse_blocks("a\n:::\nb");
        assert_eq!(blocks, vec![Block::plain("a"), Block::plain("b")]);
    }

    #[test]
    fn keyword_prefix_is_not_a_directive() {
        let blocks = parse_blocks("::: centered text");
        assert_eq!(blocks, vec![Block::plain("::: centered text")]);
    }

    #[test]
    fn inline_opener_content_starts_the_region() {
        let blocks = parse_blocks("::: center Jane Doe\nEngineer\n:::");
        assert_eq!(
            blocks,
            vec![Block::Center {
                lines: vec!["Jane Doe".into(), "Engineer".into()]
            }]
        );
    }

    #[test]
    fn block_serialises_with_type_tag() {
        let json = serde_json::to_string(&Block::row("a", "b")).unwrap();
        assert_eq!(json, r#"{"type":"row","left":"a","right":"b"}"#);
    }
}
