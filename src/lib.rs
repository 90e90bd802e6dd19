//! # resume-pager – block pagination for résumé previews
//!
//! This crate splits a line-oriented résumé document into A4 pages the way a
//! live preview does it. The pipeline stages are:
//!
//! 1. **Parse** – directive text → atomic blocks ([`blocks`], [`markup`])
//! 2. **Render** – block → styled element tree ([`render`], [`style`])
//! 3. **Measure** – element tree → height in px through an injected oracle
//!    ([`measure`]), by default a Taffy layout over font metrics ([`layout`])
//! 4. **Paginate** – greedy first-fit of blocks onto pages ([`pagination`])
//! 5. **Export** – emit PDF bytes via printpdf ([`export`])
//!
//! [`relayout`] re-runs the pipeline when content or typography changes,
//! debounced and with stale results dropped. A C-compatible FFI surface is
//! exposed via the [`ffi`] module.

pub mod blocks;
pub mod error;
pub mod export;
pub mod ffi;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod markup;
pub mod measure;
pub mod pagination;
pub mod pipeline;
pub mod relayout;
pub mod render;
pub mod resume;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use blocks::{parse_blocks, Block, Document};
pub use error::{ConfigError, Error, MeasureError, Result};
pub use layout_config::{LayoutConfig, LayoutPreset, PageGeometry, Theme};
pub use measure::{Measure, TextMetricsMeasurer};
pub use pagination::{paginate, Overflow, Page, Pagination};
pub use pipeline::{generate_pdf, generate_pdf_from_text, paginate_text, smart_layout, PipelineConfig};
pub use relayout::{Generation, Outcome, Relayout};
pub use render::{render_block, RenderedBlock};
