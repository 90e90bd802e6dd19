//! pager – command-line résumé paginator.
//!
//! Usage:
//!   pager <input.md|input.json> [output.pdf] [--compact] [--font NAME]
//!         [--font-size PT] [--line-height X] [--font-file PATH]
//!         [--theme classic|mono] [--title T] [--layout-json PATH] [--footer]
//!
//! `.json` inputs are treated as structured résumé records and converted to
//! directive text first. If `output.pdf` is omitted the PDF is written next to
//! the input file with the same stem.

use std::{env, fs, path::PathBuf, process};

use resume_pager::fonts::FontManager;
use resume_pager::layout_config::{LayoutConfig, Theme};
use resume_pager::pipeline::{generate_pdf_with_fonts, PipelineConfig};
use resume_pager::resume::json_to_markdown;

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    process::exit(1);
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> &'a str {
    match iter.next() {
        Some(v) => v,
        None => fail(format!("{flag} needs a value")),
    }
}

fn number(raw: &str, flag: &str) -> f32 {
    raw.parse()
        .unwrap_or_else(|_| fail(format!("{flag} expects a number, got {raw:?}")))
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut layout = LayoutConfig::default();
    let mut font_file: Option<PathBuf> = None;
    let mut title: Option<String> = None;
    let mut layout_json: Option<PathBuf> = None;
    let mut footer = false;
    let mut positional = 0usize;

    // Explicit typography flags win over --compact regardless of order.
    let mut compact = false;
    let mut font: Option<String> = None;
    let mut font_size: Option<f32> = None;
    let mut line_height: Option<f32> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--compact" | "-c" => compact = true,
            "--font" => font = Some(value(&mut iter, arg).to_string()),
            "--font-size" => font_size = Some(number(value(&mut iter, arg), arg)),
            "--line-height" => line_height = Some(number(value(&mut iter, arg), arg)),
            "--font-file" => font_file = Some(PathBuf::from(value(&mut iter, arg))),
            "--theme" => {
                layout.theme = value(&mut iter, arg)
                    .parse::<Theme>()
                    .unwrap_or_else(|e| fail(e))
            }
            "--title" | "-t" => title = Some(value(&mut iter, arg).to_string()),
            "--layout-json" => layout_json = Some(PathBuf::from(value(&mut iter, arg))),
            "--footer" => footer = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    if compact {
        layout = LayoutConfig {
            theme: layout.theme,
            ..LayoutConfig::compact()
        };
    }
    if let Some(f) = font {
        layout.font_family = f;
    }
    if let Some(s) = font_size {
        layout.font_size_pt = s;
    }
    if let Some(l) = line_height {
        layout.line_height = l;
    }
    if let Err(e) = layout.validate() {
        fail(e);
    }

    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("pdf");
        o
    });

    let raw = fs::read_to_string(&input)
        .unwrap_or_else(|e| fail(format!("reading '{}': {e}", input.display())));
    let is_json = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let text = if is_json {
        json_to_markdown(&raw).unwrap_or_else(|e| fail(e))
    } else {
        raw
    };

    let mut fonts = FontManager::new();
    if let Some(path) = &font_file {
        let bytes = fs::read(path).unwrap_or_else(|e| fail(format!("reading '{}': {e}", path.display())));
        if let Err(e) = fonts.load_font(&layout.font_family, false, false, bytes) {
            fail(e);
        }
    }
    fonts.ensure_default();

    let default_title = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Resume")
        .to_string();

    let config = PipelineConfig {
        title: title.unwrap_or(default_title),
        layout,
        footer,
        ..PipelineConfig::default()
    };

    match generate_pdf_with_fonts(&text, &config, fonts) {
        Ok((bytes, pagination)) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        fail(format!("creating output directory: {e}"));
                    }
                }
            }
            if let Err(e) = fs::write(&output, &bytes) {
                fail(format!("writing '{}': {e}", output.display()));
            }
            if let Some(path) = &layout_json {
                if let Err(e) = fs::write(path, pagination.to_json()) {
                    fail(format!("writing '{}': {e}", path.display()));
                }
            }
            let pages = pagination.page_count();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
            for overflow in &pagination.overflows {
                eprintln!(
                    "Warning: block {} on page {} is taller than the page ({:.0} > {:.0} px)",
                    overflow.block_index,
                    overflow.page_index + 1,
                    overflow.height,
                    overflow.max_content_height
                );
            }
        }
        Err(e) => fail(format!("generating PDF: {e}")),
    }
}

fn print_usage(prog: &str) {
    eprintln!("pager – résumé paginator (resume-pager)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.md|input.json> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input>              Directive text, or a JSON résumé record (.json)");
    eprintln!("  [output.pdf]         Output path (default: same stem as input with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --compact, -c        Use the compact preset (10.5 pt, line height 1.3)");
    eprintln!("  --font NAME          Font family (default: SimSun)");
    eprintln!("  --font-size PT       Base font size in points (default: 12)");
    eprintln!("  --line-height X      Line height multiple (default: 1.5)");
    eprintln!("  --font-file PATH     TTF/OTF for --font, used for measurement and embedded in the PDF");
    eprintln!("  --theme NAME         classic | mono (default: classic)");
    eprintln!("  --title, -t          Document title in PDF metadata (default: input filename stem)");
    eprintln!("  --layout-json PATH   Also write the pagination as JSON");
    eprintln!("  --footer             Print page numbers");
    eprintln!("  --help               Print this message");
}
