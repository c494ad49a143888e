//! Character encoding detection and input decoding
//!
//! Converters receive raw file bytes and must turn them into text before any
//! parsing happens. Detection follows a three-level cascade:
//!
//! 1. **MIME charset parameter**: the input's MIME tag may carry a charset
//!    parameter (e.g. `text/html; charset=ISO-8859-1`)
//! 2. **HTML meta tags**: HTML inputs are scanned for `<meta charset>` or
//!    `<meta http-equiv="Content-Type">` declarations
//! 3. **Default to UTF-8**: if both fail, UTF-8 is assumed
//!
//! A file whose bytes cannot be decoded under the detected encoding is a
//! read failure, which aborts the whole conversion call (one bad file fails
//! the entire batch).
//!
//! # Examples
//!
//! ```rust
//! use mdhtml_engine::charset::detect_charset;
//!
//! // Detect from the MIME tag
//! let charset = detect_charset(Some("text/html; charset=ISO-8859-1"), b"<html></html>");
//! assert_eq!(charset, "ISO-8859-1");
//!
//! // Detect from an HTML meta tag
//! let html = b"<html><head><meta charset=\"UTF-8\"></head></html>";
//! assert_eq!(detect_charset(None, html), "UTF-8");
//!
//! // Default to UTF-8
//! assert_eq!(detect_charset(None, b"plain text"), "UTF-8");
//! ```

use crate::error::ConversionError;
use regex::Regex;
use std::sync::OnceLock;

/// Default charset when detection fails
const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for meta charset tags (first 1024 bytes)
const META_SCAN_LIMIT: usize = 1024;

/// Detect character encoding using the three-level cascade
///
/// Always returns a charset name, defaulting to `"UTF-8"`. Names are
/// normalized to uppercase for consistency.
///
/// # Arguments
///
/// * `mime` - Optional MIME tag of the input file (may carry a charset parameter)
/// * `content` - Raw input bytes, scanned for meta charset tags
pub fn detect_charset(mime: Option<&str>, content: &[u8]) -> String {
    if let Some(tag) = mime
        && let Some(charset) = extract_charset_from_mime(tag)
    {
        return normalize_charset(&charset);
    }

    if let Some(charset) = extract_charset_from_html(content) {
        return normalize_charset(&charset);
    }

    DEFAULT_CHARSET.to_string()
}

/// Decode input bytes to text
///
/// Runs [`detect_charset`] and transcodes the bytes with the detected
/// encoding. Unknown charset labels fall back to UTF-8 rather than failing.
///
/// # Errors
///
/// Returns [`ConversionError::EncodingError`] when the bytes are not valid
/// under the detected encoding (for UTF-8 a strict check; for legacy
/// encodings, when the decoder reports malformed sequences).
pub fn decode_text(mime: Option<&str>, content: &[u8]) -> Result<String, ConversionError> {
    let charset = detect_charset(mime, content);

    let encoding = encoding_rs::Encoding::for_label(charset.as_bytes())
        .unwrap_or(encoding_rs::UTF_8);

    if encoding == encoding_rs::UTF_8 {
        // Strict: a markdown/HTML file advertised as UTF-8 with broken byte
        // sequences is a read failure, not something to paper over.
        return match std::str::from_utf8(content) {
            Ok(text) => Ok(text.to_string()),
            Err(e) => Err(ConversionError::EncodingError(format!(
                "input is not valid UTF-8 (error at byte {})",
                e.valid_up_to()
            ))),
        };
    }

    let (text, _, had_errors) = encoding.decode(content);
    if had_errors {
        return Err(ConversionError::EncodingError(format!(
            "input could not be decoded as {}",
            charset
        )));
    }
    Ok(text.into_owned())
}

/// Extract charset from a MIME tag
///
/// Parses a `charset` parameter. Supported forms:
///
/// - `text/html; charset=UTF-8`
/// - `text/html; charset="UTF-8"`
/// - `text/html;charset=UTF-8` (no space)
/// - `text/html; charset=UTF-8; boundary=...` (multiple parameters)
pub fn extract_charset_from_mime(mime: &str) -> Option<String> {
    static CHARSET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex =
        CHARSET_REGEX.get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#).ok());
    let regex = regex.as_ref()?;

    regex
        .captures(mime)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract charset from HTML meta tags
///
/// Supported forms:
///
/// - HTML5: `<meta charset="UTF-8">`
/// - HTML4: `<meta http-equiv="Content-Type" content="text/html; charset=UTF-8">`
///
/// Only the first 1024 bytes are scanned; charset declarations belong in
/// the `<head>` section early in the document.
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let scan_limit = std::cmp::min(html.len(), META_SCAN_LIMIT);
    let html_prefix = &html[..scan_limit];

    // Lossy conversion is OK for meta tag detection
    let html_str = String::from_utf8_lossy(html_prefix);

    static HTML5_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html5_regex =
        HTML5_REGEX.get_or_init(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*"?([^";>\s]+)"?"#).ok());
    let html5_regex = html5_regex.as_ref()?;

    if let Some(caps) = html5_regex.captures(&html_str)
        && let Some(m) = caps.get(1)
    {
        return Some(m.as_str().to_string());
    }

    static HTML4_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let html4_regex = HTML4_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?i)<meta\s+http-equiv\s*=\s*"?Content-Type"?\s+content\s*=\s*"?[^">]*charset\s*=\s*([^";>\s]+)"?"#,
        )
        .ok()
    });
    let html4_regex = html4_regex.as_ref()?;

    if let Some(caps) = html4_regex.captures(&html_str)
        && let Some(m) = caps.get(1)
    {
        return Some(m.as_str().to_string());
    }

    None
}

/// Normalize charset name to uppercase
pub fn normalize_charset(charset: &str) -> String {
    charset.to_uppercase()
}
