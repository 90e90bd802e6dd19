//! Sample directive documents for testing and demonstration.
//!
//! Each template exercises a different mix of region kinds and markup.

/// One-page résumé using every directive form.
pub fn resume_template() -> &'static str {
    r##"::: center
# Jane Doe
**Phone:** 555-0100 | **Email:** jane@example.com
Cambridge, MA
:::

## Education

::: left
**Massachusetts Institute of Technology**
*B.S. Computer Science*
:::
::: right
2019 - 2023
Cambridge, MA
:::
- GPA: 3.9 / 4.0
- Coursework: Compilers, Operating Systems, Distributed Systems

---

## Experience

::: left **Acme Corp**, Software Engineer Intern
::: right Summer 2022
- Built a block-based pagination engine for document previews
- Cut preview latency by debouncing layout on every keystroke

::: left **Globex**, Research Assistant
::: right 2021 - 2022
- Studied greedy bin-packing heuristics for print layout

## Skills

::: left
Rust, TypeScript, Python
:::
"##
}

/// Résumé long enough to need several A4 pages.
pub fn multi_page_template() -> String {
    let mut doc = String::from("::: center\n# John Smith\njohn@example.com\n:::\n\n## Experience\n\n");
    for i in 1..=12 {
        doc.push_str(&format!(
            "::: left **Company {i}**, Engineer\n::: right 20{:02} - 20{:02}\n",
            i + 5,
            i + 6
        ));
        for j in 1..=4 {
            doc.push_str(&format!(
                "- Delivered project {i}.{j}, coordinating design, implementation and rollout across several teams\n"
            ));
        }
        doc.push_str("\n---\n\n");
    }
    doc
}

/// Two-column header with uneven left/right regions.
pub fn uneven_rows_template() -> &'static str {
    r##"::: left
**Stanford University**
*M.S. Computer Science*
Thesis: Reactive layout
:::
::: right
2023 - 2025
:::
"##
}

/// Minimal template for unit testing.
pub fn minimal_template() -> &'static str {
    "# Title\n\nBody text"
}

/// Malformed input: unterminated and empty regions, stray terminator.
pub fn malformed_template() -> &'static str {
    r##"::: center
:::
:::
Stray closer above
::: right
Unterminated right region
runs to the end
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{parse_blocks, Block};

    #[test]
    fn templates_parse_to_blocks() {
        let multi = multi_page_template();
        let templates: Vec<(&str, &str)> = vec![
            ("resume", resume_template()),
            ("multipage", &multi),
            ("uneven", uneven_rows_template()),
            ("minimal", minimal_template()),
            ("malformed", malformed_template()),
        ];

        for (name, text) in templates {
            let blocks = parse_blocks(text);
            assert!(!blocks.is_empty(), "Template '{}' should parse to blocks", name);
            assert!(
                blocks
                    .iter()
                    .flat_map(|b| b.texts())
                    .all(|t| !t.starts_with(":::")),
                "Template '{}' leaked a directive marker",
                name
            );
        }
    }

    #[test]
    fn uneven_rows_are_padded() {
        let blocks = parse_blocks(uneven_rows_template());
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2], Block::row("Thesis: Reactive layout", ""));
    }

    #[test]
    fn malformed_template_policy() {
        let blocks = parse_blocks(malformed_template());
        assert_eq!(
            blocks,
            vec![
                Block::plain("Stray closer above"),
                Block::Right {
                    text: "Unterminated right region".into()
                },
                Block::Right {
                    text: "runs to the end".into()
                },
            ]
        );
    }
}
