//! Pipeline – ties together block parsing, rendering, measurement,
//! pagination and PDF export into single function calls.

use crate::blocks::parse_blocks;
use crate::error::Result;
use crate::export::{render_pdf, ExportOptions};
use crate::fonts::FontManager;
use crate::layout_config::{LayoutConfig, LayoutPreset, PageGeometry};
use crate::measure::{Measure, TextMetricsMeasurer};
use crate::pagination::{paginate, Pagination};

/// Configuration for the PDF generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Document title embedded in the PDF metadata (default: "Resume").
    pub title: String,
    /// Typography and theme.
    pub layout: LayoutConfig,
    /// Page size and margin (default: A4, 48 px margin).
    pub geometry: PageGeometry,
    /// Draw a page-number footer.
    pub footer: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: "Resume".to_string(),
            layout: LayoutConfig::default(),
            geometry: PageGeometry::a4(),
            footer: false,
        }
    }
}

impl PipelineConfig {
    /// Default settings with the compact typography preset.
    pub fn compact() -> Self {
        Self {
            layout: LayoutConfig::compact(),
            ..Self::default()
        }
    }

    fn export_options(&self) -> ExportOptions {
        ExportOptions {
            title: self.title.clone(),
            footer: self.footer,
        }
    }
}

/// Raw text → pages, with any measurement oracle.
pub fn paginate_text<M>(raw: &str, layout: &LayoutConfig, geometry: &PageGeometry, measurer: &mut M) -> Result<Pagination>
where
    M: Measure + ?Sized,
{
    let blocks = parse_blocks(raw);
    paginate(&blocks, layout, geometry, measurer)
}

/// Generate only the pagination (no PDF rendering) with headless metrics.
pub fn compute_pagination(raw: &str, config: &PipelineConfig) -> Result<Pagination> {
    let mut measurer = TextMetricsMeasurer::default();
    paginate_text(raw, &config.layout, &config.geometry, &mut measurer)
}

/// Full pipeline: directive text → PDF bytes, with synthetic font metrics.
///
/// Returns `(pdf_bytes, pagination)`.
pub fn generate_pdf(raw: &str, config: &PipelineConfig) -> Result<(Vec<u8>, Pagination)> {
    generate_pdf_with_fonts(raw, config, FontManager::default())
}

/// Full pipeline measuring with the given fonts.
pub fn generate_pdf_with_fonts(raw: &str, config: &PipelineConfig, fonts: FontManager) -> Result<(Vec<u8>, Pagination)> {
    config.layout.validate()?;
    let mut measurer = TextMetricsMeasurer::new(fonts);
    let pagination = paginate_text(raw, &config.layout, &config.geometry, &mut measurer)?;
    let bytes = render_pdf(
        &pagination,
        &config.layout,
        &config.geometry,
        &measurer,
        &config.export_options(),
    )?;
    Ok((bytes, pagination))
}

/// Convenience: generate PDF with the default A4 config.
pub fn generate_pdf_from_text(raw: &str) -> Result<Vec<u8>> {
    let (bytes, _) = generate_pdf(raw, &PipelineConfig::default())?;
    Ok(bytes)
}

/// Paginate with the default preset, then switch to the requested preset
/// only if [`LayoutPreset::smart`] allows it. The caller's font family and
/// theme are kept.
pub fn smart_layout<M>(
    raw: &str,
    base: &LayoutConfig,
    geometry: &PageGeometry,
    requested: LayoutPreset,
    measurer: &mut M,
) -> Result<(LayoutPreset, Pagination)>
where
    M: Measure + ?Sized,
{
    let with_base = |preset: LayoutPreset| LayoutConfig {
        font_family: base.font_family.clone(),
        theme: base.theme,
        ..preset.config()
    };

    let blocks = parse_blocks(raw);
    let first = paginate(&blocks, &with_base(LayoutPreset::Default), geometry, measurer)?;
    let chosen = LayoutPreset::smart(requested, first.page_count());
    if chosen == LayoutPreset::Default {
        return Ok((chosen, first));
    }
    log::info!("Switching to {chosen} layout for a {}-page document", first.page_count());
    let pagination = paginate(&blocks, &with_base(chosen), geometry, measurer)?;
    Ok((chosen, pagination))
}
