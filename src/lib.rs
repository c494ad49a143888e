//! Bidirectional Markdown / HTML conversion engine with an embedded
//! allow-list HTML sanitizer
//!
//! The crate converts markdown to HTML with a hand-written line-oriented
//! block parser and converts HTML back to markdown with an ordered
//! substitution pipeline. Both directions share the sanitizer, which
//! removes dangerous tags, filters attributes against an allow list and
//! rejects unsafe URL schemes, counting every removal.
//!
//! Each direction is exposed as a plugin satisfying the uniform
//! `can_handle` / `estimate` / `convert` contract in [`plugin`].
//!
//! # Quick Start
//!
//! ```
//! use mdhtml_engine::plugin::{FileConverter, FileInput, MarkdownToHtml};
//!
//! let plugin = MarkdownToHtml::new();
//! let files = vec![FileInput::new(
//!     "hello.md",
//!     Some("text/markdown"),
//!     b"# Hello\n\nSome **bold** text.".to_vec(),
//! )];
//!
//! let output = plugin.convert(&files, None).unwrap();
//! let html = String::from_utf8(output.files[0].data.clone()).unwrap();
//! assert!(html.contains("<h1>Hello</h1>"));
//! assert!(html.contains("<strong>bold</strong>"));
//! ```
//!
//! # Modules
//!
//! - [`markdown`] - block parser, markdown to HTML
//! - [`inline`] - inline formatting cascade
//! - [`table`] - GFM table rendering
//! - [`converter`] - HTML to markdown substitution pipeline
//! - [`sanitizer`] - allow-list HTML sanitizer
//! - [`entities`] - HTML entity escaping and unescaping
//! - [`charset`] - charset detection and text decoding
//! - [`plugin`] - converter contract, options, batch loop
//! - [`digest`] - BLAKE3 content digests for outputs
//! - [`estimator`] - size/time heuristics backing `estimate`
//! - [`error`] - error taxonomy

pub mod charset;
pub mod converter;
pub mod digest;
pub mod entities;
pub mod error;
pub mod estimator;
pub mod inline;
pub mod markdown;
pub mod plugin;
pub mod sanitizer;
pub mod table;

pub use converter::MarkdownConverter;
pub use error::ConversionError;
pub use markdown::{MarkdownRenderer, RenderOptions};
pub use plugin::{
    ConversionOutput, Estimate, FileConverter, FileInput, HtmlToMarkdown, MarkdownToHtml,
    OutputFile,
};
pub use sanitizer::{HtmlSanitizer, SanitizeOutcome};
