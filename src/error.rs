//! Error types for the pagination pipeline.

use std::io;
use thiserror::Error;

/// Result type alias for resume-pager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected style or page configuration.
///
/// Raised when a [`LayoutConfig`](crate::layout_config::LayoutConfig) or
/// [`PageGeometry`](crate::layout_config::PageGeometry) is built or updated,
/// never in the middle of a pagination run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Page width or height is zero, negative or not finite.
    #[error("Invalid page size: {width}x{height} px")]
    InvalidPageSize { width: f32, height: f32 },

    /// Margin is negative or not finite.
    #[error("Invalid page margin: {0} px")]
    InvalidMargin(f32),

    /// Margins leave no vertical room for content.
    #[error("No room for content: page height {page_height} px with {margin} px margins")]
    NoContentHeight { page_height: f32, margin: f32 },

    /// Margins leave no horizontal room for content.
    #[error("No room for content: page width {page_width} px with {margin} px margins")]
    NoContentWidth { page_width: f32, margin: f32 },

    #[error("Invalid font size: {0} pt")]
    InvalidFontSize(f32),

    #[error("Invalid line height: {0}")]
    InvalidLineHeight(f32),

    #[error("Font family must not be empty")]
    EmptyFontFamily,

    /// Unknown preset or theme name.
    #[error("Unknown {kind}: {name:?}")]
    UnknownName { kind: &'static str, name: String },
}

/// Failure reported by a height measurement oracle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// The off-screen scaffold is gone (e.g. torn down by the host).
    #[error("Measurement scaffold is detached")]
    ScaffoldDetached,

    /// The unit was rendered with different style parameters than the ones
    /// used for measuring it.
    #[error("Rendered unit style does not match measurement style")]
    StyleMismatch,

    /// The oracle returned a negative or non-finite height.
    #[error("Oracle returned invalid height: {0}")]
    InvalidHeight(f32),

    /// The layout engine failed to lay out the unit.
    #[error("Layout failed: {0}")]
    Layout(String),
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Measuring one block failed; the whole run is abandoned.
    #[error("Measuring block {block_index} failed: {source}")]
    Measure {
        block_index: usize,
        #[source]
        source: MeasureError,
    },

    #[error("Font error: {0}")]
    Font(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PDF export error: {0}")]
    Export(String),
}

impl Error {
    /// True when the failure came from the measurement oracle rather than
    /// from configuration or I/O.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Error::Measure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_error_carries_block_index() {
        let err = Error::Measure {
            block_index: 7,
            source: MeasureError::ScaffoldDetached,
        };
        assert!(err.is_measurement());
        assert_eq!(
            err.to_string(),
            "Measuring block 7 failed: Measurement scaffold is detached"
        );
    }

    #[test]
    fn config_error_converts() {
        let err: Error = ConfigError::EmptyFontFamily.into();
        assert!(!err.is_measurement());
        assert!(err.to_string().contains("Font family"));
    }
}
