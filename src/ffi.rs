//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `rpg_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `rpg_free_buffer` / `rpg_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error):
//!   `1` null argument, `2` invalid UTF-8, `3` invalid configuration,
//!   `4` pipeline failure.
//! - Error details can be retrieved via `rpg_last_error`.
//!
//! ## Thread safety
//! - `rpg_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::layout_config::{LayoutConfig, Theme};
use crate::pipeline::{compute_pagination, generate_pdf, PipelineConfig};
use crate::resume::json_to_markdown;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

const RC_NULL: c_int = 1;
const RC_UTF8: c_int = 2;
const RC_CONFIG: c_int = 3;
const RC_PIPELINE: c_int = 4;

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

/// Display theme for use in [`RpgLayoutConfig`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpgTheme {
    Classic = 0,
    Mono = 1,
}

/// Optional configuration passed to the `rpg_*` functions.
///
/// Fields set to `0` (or `NULL` for strings) fall back to the default preset:
/// - `font_family`  → "SimSun"
/// - `font_size_pt` → 12
/// - `line_height`  → 1.5
/// - `title`        → "Resume"
#[repr(C)]
pub struct RpgLayoutConfig {
    /// Null-terminated UTF-8 document title embedded in PDF metadata.
    pub title: *const c_char,
    /// Null-terminated UTF-8 font family name.
    pub font_family: *const c_char,
    pub font_size_pt: f32,
    pub line_height: f32,
    pub theme: RpgTheme,
    /// Draw page-number footers in generated PDFs.
    pub footer: bool,
}

/// # Safety
/// `s`, if non-null, must point to a valid null-terminated string.
unsafe fn opt_c_str(s: *const c_char) -> Result<Option<String>, String> {
    if s.is_null() {
        return Ok(None);
    }
    CStr::from_ptr(s)
        .to_str()
        .map(|v| Some(v.to_string()))
        .map_err(|e| format!("Invalid UTF-8: {e}"))
}

/// Convert an `RpgLayoutConfig` (FFI) to a validated `PipelineConfig`.
///
/// # Safety
/// `cfg`, if non-null, must point to a fully-initialised [`RpgLayoutConfig`]
/// whose string fields are null or valid null-terminated strings.
unsafe fn pipeline_config_from_c(cfg: *const RpgLayoutConfig) -> Result<PipelineConfig, String> {
    let mut config = PipelineConfig::default();
    let Some(cfg) = cfg.as_ref() else {
        return Ok(config);
    };

    if let Some(title) = opt_c_str(cfg.title)? {
        config.title = title;
    }
    let defaults = LayoutConfig::default();
    let layout = LayoutConfig {
        font_family: opt_c_str(cfg.font_family)?.unwrap_or(defaults.font_family),
        font_size_pt: if cfg.font_size_pt == 0.0 { defaults.font_size_pt } else { cfg.font_size_pt },
        line_height: if cfg.line_height == 0.0 { defaults.line_height } else { cfg.line_height },
        theme: match cfg.theme {
            RpgTheme::Classic => Theme::Classic,
            RpgTheme::Mono => Theme::Mono,
        },
    };
    layout.validate().map_err(|e| e.to_string())?;
    config.layout = layout;
    config.footer = cfg.footer;
    Ok(config)
}

/// # Safety
/// `ptr` must point to `len` valid bytes.
unsafe fn input_str<'a>(ptr: *const u8, len: u32) -> Result<&'a str, c_int> {
    let bytes = slice::from_raw_parts(ptr, len as usize);
    std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        RC_UTF8
    })
}

/// # Safety
/// `out` must be a valid pointer.
unsafe fn write_string(out: *mut *mut c_char, s: String) -> c_int {
    match CString::new(s) {
        Ok(cs) => {
            *out = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("Output contained null byte");
            RC_PIPELINE
        }
    }
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Paginate directive text and return the pagination as JSON.
///
/// # Parameters
/// - `text_ptr`, `text_len`: UTF-8 document text (not necessarily null-terminated)
/// - `cfg`: optional pointer to an [`RpgLayoutConfig`]; pass `NULL` for defaults
/// - `out_json_ptr`: receives a pointer to a null-terminated JSON string
///
/// # Returns
/// `0` on success.
///
/// # Safety
/// - `text_ptr` must point to `text_len` valid bytes.
/// - `cfg`, if non-null, must be valid (see [`RpgLayoutConfig`]).
/// - The caller must free `*out_json_ptr` with `rpg_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rpg_paginate(
    text_ptr: *const u8,
    text_len: u32,
    cfg: *const RpgLayoutConfig,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if text_ptr.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let text = match input_str(text_ptr, text_len) {
        Ok(s) => s,
        Err(rc) => return rc,
    };
    let config = match pipeline_config_from_c(cfg) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e);
            return RC_CONFIG;
        }
    };

    match compute_pagination(text, &config) {
        Ok(pagination) => write_string(out_json_ptr, pagination.to_json()),
        Err(e) => {
            set_last_error(&e.to_string());
            RC_PIPELINE
        }
    }
}

/// Generate a PDF from directive text.
///
/// # Parameters
/// - `text_ptr`, `text_len`: UTF-8 document text
/// - `cfg`: optional pointer to an [`RpgLayoutConfig`]; pass `NULL` for defaults
/// - `out_buf`, `out_len`: PDF output
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `rpg_last_error`.
///
/// # Safety
/// - `text_ptr` must point to `text_len` valid bytes.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `rpg_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn rpg_generate_pdf(
    text_ptr: *const u8,
    text_len: u32,
    cfg: *const RpgLayoutConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if text_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let text = match input_str(text_ptr, text_len) {
        Ok(s) => s,
        Err(rc) => return rc,
    };
    let config = match pipeline_config_from_c(cfg) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e);
            return RC_CONFIG;
        }
    };

    match generate_pdf(text, &config) {
        Ok((pdf_bytes, _pagination)) => {
            let len = match buffer_len(pdf_bytes.len()) {
                Ok(len) => len,
                Err(msg) => {
                    set_last_error(&msg);
                    return RC_PIPELINE;
                }
            };
            let buf = pdf_bytes.into_boxed_slice();
            *out_buf = Box::into_raw(buf) as *mut u8;
            *out_len = len;
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            RC_PIPELINE
        }
    }
}

/// Output lengths cross the ABI as `u32`; larger buffers are refused
/// rather than truncated.
fn buffer_len(len: usize) -> Result<u32, String> {
    u32::try_from(len).map_err(|_| format!("PDF is {len} bytes, more than the u32 length field holds"))
}

/// Convert a JSON résumé record to directive text.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - The caller must free `*out_text_ptr` with `rpg_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rpg_resume_to_markdown(
    json_ptr: *const u8,
    json_len: u32,
    out_text_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_text_ptr.is_null() {
        set_last_error("Null pointer argument");
        return RC_NULL;
    }
    let json = match input_str(json_ptr, json_len) {
        Ok(s) => s,
        Err(rc) => return rc,
    };
    match json_to_markdown(json) {
        Ok(text) => write_string(out_text_ptr, text),
        Err(e) => {
            set_last_error(&e.to_string());
            RC_PIPELINE
        }
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `rpg_generate_pdf`.
///
/// # Safety
/// `buf` must have been returned by a previous `rpg_generate_pdf` call, and
/// `len` must be the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn rpg_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a string returned by `rpg_paginate` or `rpg_resume_to_markdown`.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn rpg_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `rpg_*` call on the same
/// thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn rpg_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn rpg_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
