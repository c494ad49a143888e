//! Converter plugin contract and the two conversion directions
//!
//! Every converter in the surrounding system satisfies the same
//! three-method contract: `can_handle` inspects file names and MIME
//! types, `estimate` gives a cheap size/time heuristic, and `convert`
//! runs the batch. This module implements the contract for the two
//! directions this crate provides, `markdown-to-html` and
//! `html-to-markdown`.
//!
//! # Batch semantics
//!
//! Files are processed sequentially in input order. Progress is
//! reported as `(files completed) / (total)` scaled to 0-100, before
//! and after each file. A file whose bytes cannot be decoded as text
//! aborts the whole batch with [`ConversionError::EncodingError`];
//! sanitizer removals never fail a file and surface as one aggregated
//! warning per input file.
//!
//! # Examples
//!
//! ```
//! use mdhtml_engine::plugin::{FileConverter, FileInput, MarkdownToHtml};
//!
//! let plugin = MarkdownToHtml::new();
//! let files = vec![FileInput::new("note.md", Some("text/markdown"), b"# Hi".to_vec())];
//! assert!(plugin.can_handle(&files));
//!
//! let output = plugin.convert(&files, None).unwrap();
//! assert_eq!(output.files[0].name, "note.html");
//! assert!(String::from_utf8_lossy(&output.files[0].data).contains("<h1>Hi</h1>"));
//! ```

use crate::charset::decode_text;
use crate::converter::MarkdownConverter;
use crate::digest::ContentDigest;
use crate::entities::escape_html;
use crate::error::ConversionError;
use crate::estimator::ConversionEstimator;
use crate::markdown::{MarkdownRenderer, RenderOptions};
use crate::sanitizer::HtmlSanitizer;

/// One input file submitted to a converter
#[derive(Debug, Clone)]
pub struct FileInput {
    /// File name including extension
    pub name: String,
    /// Declared MIME type, possibly with a charset parameter
    pub mime: Option<String>,
    /// Raw file bytes
    pub data: Vec<u8>,
}

impl FileInput {
    pub fn new(name: &str, mime: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.map(str::to_string),
            data,
        }
    }
}

/// One produced output file
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// Output file name, extension swapped from the input
    pub name: String,
    /// Output MIME type including charset parameter
    pub mime: String,
    /// UTF-8 encoded output bytes
    pub data: Vec<u8>,
}

/// Result of [`FileConverter::estimate`]
#[derive(Debug, Clone)]
pub struct Estimate {
    /// Whether this converter will accept the batch
    pub can_convert: bool,
    /// Estimated total output size in bytes
    pub estimated_size: u64,
    /// Estimated conversion time in milliseconds
    pub estimated_time_ms: u64,
    /// Non-fatal notes about the estimate
    pub warnings: Vec<String>,
}

/// Per-file conversion accounting
#[derive(Debug, Clone)]
pub struct FileStats {
    /// Input file name
    pub name: String,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// BLAKE3 content digest of the output bytes
    pub digest: String,
}

/// Whole-batch conversion accounting
#[derive(Debug, Clone, Default)]
pub struct ConversionStats {
    pub files: Vec<FileStats>,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
}

/// Successful result of [`FileConverter::convert`]
///
/// `files` and per-file warnings follow input order.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub files: Vec<OutputFile>,
    pub warnings: Vec<String>,
    pub stats: ConversionStats,
}

/// Progress callback, invoked with a 0-100 percentage
pub type ProgressFn<'a> = &'a mut dyn FnMut(u8);

/// Uniform contract every converter plugin satisfies
pub trait FileConverter {
    /// Stable plugin identifier
    fn id(&self) -> &'static str;

    /// Whether this converter accepts the given batch
    fn can_handle(&self, files: &[FileInput]) -> bool;

    /// Cheap size/time heuristic; performs no parsing
    fn estimate(&self, files: &[FileInput]) -> Estimate;

    /// Convert the batch, reporting progress if a callback is given
    fn convert(
        &self,
        files: &[FileInput],
        progress: Option<ProgressFn<'_>>,
    ) -> Result<ConversionOutput, ConversionError>;
}

/// Document wrapping applied to generated HTML fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapperMode {
    /// Emit the bare fragment
    #[default]
    None,
    /// Emit a complete document with `<meta charset>` and a `<title>`
    /// derived from the input file name
    Full,
    /// Wrap the fragment in an `<article>` element
    Article,
}

/// Options for the markdown-to-html direction
#[derive(Debug, Clone)]
pub struct MarkdownToHtmlOptions {
    /// Run the sanitizer over the generated HTML
    pub sanitize: bool,
    /// Enable tables, task lists and strikethrough
    pub gfm: bool,
    /// Document wrapping mode
    pub wrapper: WrapperMode,
}

impl Default for MarkdownToHtmlOptions {
    fn default() -> Self {
        Self {
            sanitize: true,
            gfm: true,
            wrapper: WrapperMode::None,
        }
    }
}

/// Options for the html-to-markdown direction
#[derive(Debug, Clone)]
pub struct HtmlToMarkdownOptions {
    /// Sanitize the input HTML before converting
    pub sanitize: bool,
}

impl Default for HtmlToMarkdownOptions {
    fn default() -> Self {
        Self { sanitize: true }
    }
}

/// The markdown-to-html plugin
pub struct MarkdownToHtml {
    options: MarkdownToHtmlOptions,
}

impl MarkdownToHtml {
    pub fn new() -> Self {
        Self::with_options(MarkdownToHtmlOptions::default())
    }

    pub fn with_options(options: MarkdownToHtmlOptions) -> Self {
        Self { options }
    }

    /// Convert one decoded markdown document to HTML
    fn convert_document(&self, name: &str, text: &str) -> (String, usize) {
        let renderer = MarkdownRenderer::with_options(RenderOptions {
            gfm: self.options.gfm,
        });
        let mut html = renderer.render(text);

        let removed = if self.options.sanitize {
            let outcome = HtmlSanitizer::new().sanitize(&html);
            html = outcome.html;
            outcome.removed
        } else {
            0
        };

        let wrapped = match self.options.wrapper {
            WrapperMode::None => html,
            WrapperMode::Article => format!("<article>\n{html}\n</article>"),
            WrapperMode::Full => {
                let title = escape_html(file_stem(name));
                format!(
                    "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
                     <title>{title}</title>\n</head>\n<body>\n{html}\n</body>\n</html>"
                )
            }
        };

        (wrapped, removed)
    }
}

impl Default for MarkdownToHtml {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConverter for MarkdownToHtml {
    fn id(&self) -> &'static str {
        "markdown-to-html"
    }

    fn can_handle(&self, files: &[FileInput]) -> bool {
        !files.is_empty()
            && files.iter().all(|file| {
                matches_mime(file, "text/markdown") || matches_extension(file, &["md", "markdown"])
            })
    }

    fn estimate(&self, files: &[FileInput]) -> Estimate {
        estimate_batch(self.can_handle(files), files)
    }

    fn convert(
        &self,
        files: &[FileInput],
        progress: Option<ProgressFn<'_>>,
    ) -> Result<ConversionOutput, ConversionError> {
        run_batch(files, progress, |file| {
            let text = decode_text(file.mime.as_deref(), &file.data)?;
            let (html, removed) = self.convert_document(&file.name, &text);
            Ok(ConvertedFile {
                name: swap_extension(&file.name, "html"),
                mime: "text/html;charset=utf-8",
                content: html,
                removed,
            })
        })
    }
}

/// The html-to-markdown plugin
pub struct HtmlToMarkdown {
    options: HtmlToMarkdownOptions,
}

impl HtmlToMarkdown {
    pub fn new() -> Self {
        Self::with_options(HtmlToMarkdownOptions::default())
    }

    pub fn with_options(options: HtmlToMarkdownOptions) -> Self {
        Self { options }
    }
}

impl Default for HtmlToMarkdown {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConverter for HtmlToMarkdown {
    fn id(&self) -> &'static str {
        "html-to-markdown"
    }

    fn can_handle(&self, files: &[FileInput]) -> bool {
        !files.is_empty()
            && files.iter().all(|file| {
                matches_mime(file, "text/html") || matches_extension(file, &["html", "htm"])
            })
    }

    fn estimate(&self, files: &[FileInput]) -> Estimate {
        estimate_batch(self.can_handle(files), files)
    }

    fn convert(
        &self,
        files: &[FileInput],
        progress: Option<ProgressFn<'_>>,
    ) -> Result<ConversionOutput, ConversionError> {
        run_batch(files, progress, |file| {
            let decoded = decode_text(file.mime.as_deref(), &file.data)?;
            // Full documents reduce to body contents first, so the
            // sanitizer never counts head-only markup
            let mut text = crate::converter::extract_body(&decoded).to_string();

            let removed = if self.options.sanitize {
                let outcome = HtmlSanitizer::new().sanitize(&text);
                text = outcome.html;
                outcome.removed
            } else {
                0
            };

            let markdown = MarkdownConverter::new().convert(&text);
            Ok(ConvertedFile {
                name: swap_extension(&file.name, "md"),
                mime: "text/markdown;charset=utf-8",
                content: markdown,
                removed,
            })
        })
    }
}

/// One converted file before batch accounting
struct ConvertedFile {
    name: String,
    mime: &'static str,
    content: String,
    removed: usize,
}

/// Sequential batch loop shared by both directions
///
/// Reports progress before and after each file; the first per-file
/// error aborts the whole batch.
fn run_batch<F>(
    files: &[FileInput],
    mut progress: Option<ProgressFn<'_>>,
    mut convert_one: F,
) -> Result<ConversionOutput, ConversionError>
where
    F: FnMut(&FileInput) -> Result<ConvertedFile, ConversionError>,
{
    if files.is_empty() {
        return Err(ConversionError::InvalidInput("no input files".to_string()));
    }

    let total = files.len();
    let digest = ContentDigest::new();

    let mut output = ConversionOutput {
        files: Vec::with_capacity(total),
        warnings: Vec::new(),
        stats: ConversionStats::default(),
    };

    for (completed, file) in files.iter().enumerate() {
        report_progress(&mut progress, completed, total);

        let converted = convert_one(file)?;
        log::debug!(
            "converted {} -> {} ({} bytes)",
            file.name,
            converted.name,
            converted.content.len()
        );

        if converted.removed > 0 {
            log::warn!(
                "sanitizer removed {} element(s) from {}",
                converted.removed,
                file.name
            );
            output.warnings.push(format!(
                "{}: sanitizer removed {} element(s)",
                file.name, converted.removed
            ));
        }

        let data = converted.content.into_bytes();
        output.stats.total_input_bytes += file.data.len() as u64;
        output.stats.total_output_bytes += data.len() as u64;
        output.stats.files.push(FileStats {
            name: file.name.clone(),
            input_bytes: file.data.len() as u64,
            output_bytes: data.len() as u64,
            digest: digest.compute(&data),
        });
        output.files.push(OutputFile {
            name: converted.name,
            mime: converted.mime.to_string(),
            data,
        });

        report_progress(&mut progress, completed + 1, total);
    }

    Ok(output)
}

// total is nonzero: empty batches are rejected before the loop
fn report_progress(progress: &mut Option<ProgressFn<'_>>, completed: usize, total: usize) {
    if let Some(callback) = progress {
        callback(((completed * 100) / total) as u8);
    }
}

fn estimate_batch(can_convert: bool, files: &[FileInput]) -> Estimate {
    let total_bytes: u64 = files.iter().map(|file| file.data.len() as u64).sum();
    let estimator = ConversionEstimator::new();

    Estimate {
        can_convert,
        estimated_size: estimator.estimate_size(total_bytes),
        estimated_time_ms: estimator.estimate_time_ms(total_bytes),
        warnings: Vec::new(),
    }
}

/// Match the MIME base type, ignoring any charset parameter
fn matches_mime(file: &FileInput, expected: &str) -> bool {
    file.mime
        .as_deref()
        .map(|mime| {
            mime.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case(expected)
        })
        .unwrap_or(false)
}

fn matches_extension(file: &FileInput, extensions: &[&str]) -> bool {
    extension(&file.name)
        .map(|ext| extensions.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Swap the file extension, appending one if the name has none
fn swap_extension(name: &str, new_ext: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.{new_ext}"),
        None => format!("{name}.{new_ext}"),
    }
}

fn file_stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md_file(name: &str, text: &str) -> FileInput {
        FileInput::new(name, Some("text/markdown"), text.as_bytes().to_vec())
    }

    fn html_file(name: &str, text: &str) -> FileInput {
        FileInput::new(name, Some("text/html"), text.as_bytes().to_vec())
    }

    #[test]
    fn test_can_handle_by_mime() {
        let plugin = MarkdownToHtml::new();
        assert!(plugin.can_handle(&[md_file("a.txt", "x")]));
        assert!(!plugin.can_handle(&[html_file("a.txt", "x")]));
    }

    #[test]
    fn test_can_handle_by_extension() {
        let plugin = MarkdownToHtml::new();
        assert!(plugin.can_handle(&[FileInput::new("a.md", None, vec![])]));
        assert!(plugin.can_handle(&[FileInput::new("a.MARKDOWN", None, vec![])]));
        assert!(!plugin.can_handle(&[FileInput::new("a.txt", None, vec![])]));
    }

    #[test]
    fn test_can_handle_requires_files() {
        assert!(!MarkdownToHtml::new().can_handle(&[]));
        assert!(!HtmlToMarkdown::new().can_handle(&[]));
    }

    #[test]
    fn test_can_handle_html_direction() {
        let plugin = HtmlToMarkdown::new();
        assert!(plugin.can_handle(&[FileInput::new("a.htm", None, vec![])]));
        assert!(plugin.can_handle(&[FileInput::new(
            "a.bin",
            Some("text/html;charset=utf-8"),
            vec![],
        )]));
        assert!(!plugin.can_handle(&[FileInput::new("a.md", None, vec![])]));
    }

    #[test]
    fn test_estimate_is_heuristic_only() {
        let plugin = MarkdownToHtml::new();
        let estimate = plugin.estimate(&[md_file("a.md", "12345")]);

        assert!(estimate.can_convert);
        assert_eq!(estimate.estimated_size, 6);
        assert!(estimate.estimated_time_ms >= 1);
    }

    #[test]
    fn test_output_name_and_mime() {
        let output = MarkdownToHtml::new()
            .convert(&[md_file("notes.md", "# Hi")], None)
            .unwrap();
        assert_eq!(output.files[0].name, "notes.html");
        assert_eq!(output.files[0].mime, "text/html;charset=utf-8");

        let output = HtmlToMarkdown::new()
            .convert(&[html_file("page.htm", "<h1>Hi</h1>")], None)
            .unwrap();
        assert_eq!(output.files[0].name, "page.md");
        assert_eq!(output.files[0].mime, "text/markdown;charset=utf-8");
    }

    #[test]
    fn test_output_order_matches_input_order() {
        let output = MarkdownToHtml::new()
            .convert(&[md_file("a.md", "# A"), md_file("b.md", "# B")], None)
            .unwrap();

        assert_eq!(output.files[0].name, "a.html");
        assert_eq!(output.files[1].name, "b.html");
        assert!(String::from_utf8_lossy(&output.files[0].data).contains("<h1>A</h1>"));
        assert!(String::from_utf8_lossy(&output.files[1].data).contains("<h1>B</h1>"));
    }

    #[test]
    fn test_progress_reported_before_and_after_each_file() {
        let mut seen = Vec::new();
        let mut callback = |pct: u8| seen.push(pct);

        MarkdownToHtml::new()
            .convert(
                &[md_file("a.md", "x"), md_file("b.md", "y")],
                Some(&mut callback),
            )
            .unwrap();

        assert_eq!(seen, vec![0, 50, 50, 100]);
    }

    #[test]
    fn test_empty_batch_is_invalid_input() {
        let result = MarkdownToHtml::new().convert(&[], None);
        assert!(matches!(result, Err(ConversionError::InvalidInput(_))));

        let result = HtmlToMarkdown::new().convert(&[], None);
        assert!(matches!(result, Err(ConversionError::InvalidInput(_))));
    }

    #[test]
    fn test_encoding_failure_aborts_batch() {
        let good = md_file("a.md", "# ok");
        let bad = FileInput::new("b.md", Some("text/markdown"), vec![0xff, 0xfe, 0x41]);

        let result = MarkdownToHtml::new().convert(&[good, bad], None);
        assert!(matches!(result, Err(ConversionError::EncodingError(_))));
    }

    #[test]
    fn test_sanitizer_warning_aggregated_per_file() {
        let output = HtmlToMarkdown::new()
            .convert(
                &[html_file("a.html", "<p onclick=\"x()\">hi</p><script>bad</script>")],
                None,
            )
            .unwrap();

        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].starts_with("a.html: sanitizer removed"));
    }

    #[test]
    fn test_sanitize_disabled_produces_no_warnings() {
        let plugin =
            HtmlToMarkdown::with_options(HtmlToMarkdownOptions { sanitize: false });
        let output = plugin
            .convert(&[html_file("a.html", "<p onclick=\"x()\">hi</p>")], None)
            .unwrap();
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_wrapper_none_is_bare_fragment() {
        let output = MarkdownToHtml::new()
            .convert(&[md_file("a.md", "# Hi")], None)
            .unwrap();
        let html = String::from_utf8_lossy(&output.files[0].data).into_owned();
        assert_eq!(html, "<h1>Hi</h1>");
    }

    #[test]
    fn test_wrapper_full_document() {
        let plugin = MarkdownToHtml::with_options(MarkdownToHtmlOptions {
            wrapper: WrapperMode::Full,
            ..Default::default()
        });
        let output = plugin.convert(&[md_file("report.md", "# Hi")], None).unwrap();
        let html = String::from_utf8_lossy(&output.files[0].data).into_owned();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"utf-8\">"));
        assert!(html.contains("<title>report</title>"));
        assert!(html.contains("<body>\n<h1>Hi</h1>\n</body>"));
    }

    #[test]
    fn test_wrapper_article() {
        let plugin = MarkdownToHtml::with_options(MarkdownToHtmlOptions {
            wrapper: WrapperMode::Article,
            ..Default::default()
        });
        let output = plugin.convert(&[md_file("a.md", "# Hi")], None).unwrap();
        let html = String::from_utf8_lossy(&output.files[0].data).into_owned();
        assert_eq!(html, "<article>\n<h1>Hi</h1>\n</article>");
    }

    #[test]
    fn test_gfm_disabled_skips_tables() {
        let plugin = MarkdownToHtml::with_options(MarkdownToHtmlOptions {
            gfm: false,
            ..Default::default()
        });
        let output = plugin
            .convert(&[md_file("a.md", "a|b\n---|---\n1|2")], None)
            .unwrap();
        let html = String::from_utf8_lossy(&output.files[0].data).into_owned();
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_full_document_html_converts_body_only() {
        let html = "<html><head><title>Skip</title></head><body><h1>Keep</h1></body></html>";
        let output = HtmlToMarkdown::new()
            .convert(&[html_file("a.html", html)], None)
            .unwrap();
        let md = String::from_utf8_lossy(&output.files[0].data).into_owned();
        assert_eq!(md, "# Keep");
    }

    #[test]
    fn test_stats_carry_digests() {
        let output = MarkdownToHtml::new()
            .convert(&[md_file("a.md", "# Hi")], None)
            .unwrap();

        let stats = &output.stats;
        assert_eq!(stats.files.len(), 1);
        assert_eq!(stats.files[0].digest.len(), 32);
        assert_eq!(stats.files[0].output_bytes, output.files[0].data.len() as u64);
        assert_eq!(stats.total_input_bytes, 4);
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(swap_extension("a.md", "html"), "a.html");
        assert_eq!(swap_extension("archive.tar.md", "html"), "archive.tar.html");
        assert_eq!(swap_extension("noext", "html"), "noext.html");
        assert_eq!(file_stem("report.md"), "report");
        assert_eq!(file_stem("noext"), "noext");
    }
}
