//! Markdown to HTML rendering
//!
//! This module provides the block-level engine: a single forward scan over
//! the input lines with one line of lookahead (for setext headers) and
//! exactly one open block at any time. Opening a new block type first
//! flushes whatever block is currently open; a blank line or a line that no
//! longer matches the open block's grammar also closes it.
//!
//! There is no error state. Input that matches no grammar rule falls
//! through to a paragraph, and an unterminated code fence at end-of-input
//! is flushed as a closed code block rather than discarded.

use crate::entities::escape_html;
use crate::inline::format_inline;
use crate::table::{ColumnAlignment, render_table};
use regex::Regex;
use std::sync::OnceLock;

/// Rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown extensions (tables, task lists,
    /// strikethrough)
    pub gfm: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { gfm: true }
    }
}

/// List marker family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

/// The single open block context
///
/// Exactly one variant is active at any time; each carries its own
/// accumulator, so "only one block open" is structural rather than a
/// convention. Code blocks store raw lines (verbatim, never
/// inline-formatted), blockquotes store marker-stripped lines that are
/// re-joined and inline-formatted as one unit, and tables store raw rows
/// (first = header, second = alignment spec, rest = body).
enum OpenBlock {
    None,
    CodeBlock {
        language: String,
        lines: Vec<String>,
    },
    List {
        kind: ListKind,
        start: u32,
        items: Vec<String>,
    },
    Blockquote {
        lines: Vec<String>,
    },
    Table {
        rows: Vec<String>,
    },
}

/// Markdown to HTML renderer
///
/// Stateless across calls: each [`render`](MarkdownRenderer::render) call
/// scans its input fresh and discards all accumulators at the end.
///
/// # Examples
///
/// ```
/// use mdhtml_engine::markdown::MarkdownRenderer;
///
/// let renderer = MarkdownRenderer::new();
/// let html = renderer.render("# Title\n\nSome **bold** text.");
/// assert!(html.contains("<h1>Title</h1>"));
/// assert!(html.contains("<strong>bold</strong>"));
/// ```
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a renderer with default options (GFM enabled)
    pub fn new() -> Self {
        Self {
            options: RenderOptions::default(),
        }
    }

    /// Create a renderer with custom options
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a markdown document to an HTML fragment
    ///
    /// Output fragments are produced in source line order and joined with
    /// newlines.
    pub fn render(&self, markdown: &str) -> String {
        let gfm = self.options.gfm;
        let normalized = markdown.replace("\r\n", "\n");
        let lines: Vec<&str> = normalized.split('\n').collect();

        let mut out: Vec<String> = Vec::new();
        let mut open = OpenBlock::None;
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();

            // Open code block: everything is raw until the closing fence
            if let OpenBlock::CodeBlock { lines: buf, .. } = &mut open {
                if trimmed.starts_with("```") {
                    flush(&mut open, &mut out, gfm);
                } else {
                    buf.push(line.to_string());
                }
                i += 1;
                continue;
            }

            // Fence line toggles code-block state
            if let Some(info) = trimmed.strip_prefix("```") {
                flush(&mut open, &mut out, gfm);
                open = OpenBlock::CodeBlock {
                    language: info.trim().to_string(),
                    lines: Vec::new(),
                };
                i += 1;
                continue;
            }

            // Blank line closes whatever is open and emits nothing
            if trimmed.is_empty() {
                flush(&mut open, &mut out, gfm);
                i += 1;
                continue;
            }

            // ATX header
            if let Some((level, rest)) = parse_atx_header(trimmed) {
                flush(&mut open, &mut out, gfm);
                out.push(format!(
                    "<h{level}>{}</h{level}>",
                    format_inline(rest, gfm)
                ));
                i += 1;
                continue;
            }

            // Setext header: one line of lookahead, both lines consumed.
            // Only applies at block scope so an underline cannot steal a
            // line out of an open blockquote or list; lines that close an
            // open block are re-tested after the flush below.
            if matches!(open, OpenBlock::None)
                && let Some(next) = lines.get(i + 1)
                && let Some(level) = setext_level(next.trim())
            {
                out.push(format!(
                    "<h{level}>{}</h{level}>",
                    format_inline(trimmed, gfm)
                ));
                i += 2;
                continue;
            }

            // Horizontal rule
            if is_horizontal_rule(trimmed) {
                flush(&mut open, &mut out, gfm);
                out.push("<hr/>".to_string());
                i += 1;
                continue;
            }

            // Blockquote accumulation
            if let Some(rest) = trimmed.strip_prefix('>') {
                let stripped = rest.strip_prefix(' ').unwrap_or(rest).to_string();
                match &mut open {
                    OpenBlock::Blockquote { lines } => lines.push(stripped),
                    _ => {
                        flush(&mut open, &mut out, gfm);
                        open = OpenBlock::Blockquote {
                            lines: vec![stripped],
                        };
                    }
                }
                i += 1;
                continue;
            }

            // List item
            if let Some((kind, number, text)) = parse_list_item(trimmed) {
                let item = self.render_list_item(text);
                match &mut open {
                    OpenBlock::List {
                        kind: open_kind,
                        items,
                        ..
                    } if *open_kind == kind => items.push(item),
                    _ => {
                        // Switching marker family closes the previous list
                        flush(&mut open, &mut out, gfm);
                        open = OpenBlock::List {
                            kind,
                            start: number,
                            items: vec![item],
                        };
                    }
                }
                i += 1;
                continue;
            }

            // Table collection (GFM only): any line containing a pipe
            if gfm && trimmed.contains('|') {
                match &mut open {
                    OpenBlock::Table { rows } => {
                        if rows.len() == 1 && !is_alignment_row(trimmed) {
                            // Second row is not an alignment spec, so this
                            // was never a table: the buffered line degrades
                            // to a paragraph and collection restarts here.
                            let first = rows.remove(0);
                            out.push(render_paragraph(&first, gfm));
                            rows.push(trimmed.to_string());
                        } else {
                            rows.push(trimmed.to_string());
                        }
                    }
                    _ => {
                        flush(&mut open, &mut out, gfm);
                        open = OpenBlock::Table {
                            rows: vec![trimmed.to_string()],
                        };
                    }
                }
                i += 1;
                continue;
            }

            // The line matches no open-block grammar; close anything open
            flush(&mut open, &mut out, gfm);

            // Back at block scope, so a following underline makes this
            // line a setext header even though it just closed a block
            if let Some(next) = lines.get(i + 1)
                && let Some(level) = setext_level(next.trim())
            {
                out.push(format!(
                    "<h{level}>{}</h{level}>",
                    format_inline(trimmed, gfm)
                ));
                i += 2;
                continue;
            }

            // Indented code at block scope, one line at a time
            if let Some(code) = strip_code_indent(line) {
                out.push(format!("<pre><code>{}</code></pre>", escape_html(code)));
                i += 1;
                continue;
            }

            // Paragraph fallback
            out.push(render_paragraph(line, gfm));
            i += 1;
        }

        // End of input flushes the open block, including an unterminated
        // code fence
        flush(&mut open, &mut out, gfm);

        out.join("\n")
    }

    /// Render one list item body, honoring GFM task-list syntax
    fn render_list_item(&self, text: &str) -> String {
        if self.options.gfm
            && let Some(caps) = regex_task_item().captures(text)
        {
            let checked = !caps[1].eq(" ");
            let body = format_inline(&caps[2], true);
            let input = if checked {
                "<input type=\"checkbox\" checked disabled/>"
            } else {
                "<input type=\"checkbox\" disabled/>"
            };
            return format!("<li>{} {}</li>", input, body);
        }
        format!("<li>{}</li>", format_inline(text, self.options.gfm))
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Flush the open block into the output sequence and clear it
fn flush(open: &mut OpenBlock, out: &mut Vec<String>, gfm: bool) {
    match std::mem::replace(open, OpenBlock::None) {
        OpenBlock::None => {}
        OpenBlock::CodeBlock { language, lines } => {
            let mut html = String::from("<pre><code");
            if !language.is_empty() {
                html.push_str(&format!(" class=\"language-{}\"", escape_html(&language)));
            }
            html.push('>');
            for line in &lines {
                html.push_str(&escape_html(line));
                html.push('\n');
            }
            html.push_str("</code></pre>");
            out.push(html);
        }
        OpenBlock::List { kind, start, items } => {
            let body = items.concat();
            let html = match kind {
                ListKind::Unordered => format!("<ul>{}</ul>", body),
                // Start number preserved only when it is not 1
                ListKind::Ordered if start != 1 => {
                    format!("<ol start=\"{}\">{}</ol>", start, body)
                }
                ListKind::Ordered => format!("<ol>{}</ol>", body),
            };
            out.push(html);
        }
        OpenBlock::Blockquote { lines } => {
            let joined = lines.join("\n");
            out.push(format!(
                "<blockquote>{}</blockquote>",
                format_inline(&joined, gfm)
            ));
        }
        OpenBlock::Table { rows } => {
            if rows.len() >= 2 {
                let header = split_table_row(&rows[0]);
                let alignments: Vec<Option<ColumnAlignment>> = split_table_row(&rows[1])
                    .iter()
                    .map(|cell| ColumnAlignment::from_marker(cell))
                    .collect();
                let body: Vec<Vec<String>> =
                    rows[2..].iter().map(|row| split_table_row(row)).collect();
                out.push(render_table(&header, &alignments, &body, gfm));
            } else {
                // A lone pipe line never became a table
                for row in rows {
                    out.push(render_paragraph(&row, gfm));
                }
            }
        }
    }
}

/// Render a paragraph line
///
/// Leading whitespace is dropped; a trailing two-space run is preserved so
/// the inline formatter can turn it into `<br/>`.
fn render_paragraph(line: &str, gfm: bool) -> String {
    let payload = line.trim_start();
    let payload = if payload.ends_with("  ") {
        payload
    } else {
        payload.trim_end()
    };
    format!("<p>{}</p>", format_inline(payload, gfm))
}

/// Parse an ATX header: 1-6 `#` followed by a space
fn parse_atx_header(trimmed: &str) -> Option<(usize, &str)> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = trimmed[level..].strip_prefix(' ')?;
    Some((level, rest.trim()))
}

fn setext_level(underline: &str) -> Option<u8> {
    if is_setext_h1(underline) {
        Some(1)
    } else if is_setext_h2(underline) {
        Some(2)
    } else {
        None
    }
}

fn is_setext_h1(underline: &str) -> bool {
    !underline.is_empty() && underline.chars().all(|c| c == '=')
}

/// A dash underline of 3 or more characters is a horizontal rule, not a
/// setext header
fn is_setext_h2(underline: &str) -> bool {
    !underline.is_empty() && underline.len() < 3 && underline.chars().all(|c| c == '-')
}

/// A line of 3+ `-`, `*` or `_` (internal whitespace ignored)
fn is_horizontal_rule(trimmed: &str) -> bool {
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() < 3 {
        return false;
    }
    let mut chars = compact.chars();
    let first = match chars.next() {
        Some(c @ ('-' | '*' | '_')) => c,
        _ => return false,
    };
    chars.all(|c| c == first)
}

/// Parse a list item line, returning the marker family, the start number
/// (ordered lists; 1 for unordered) and the item text
fn parse_list_item(trimmed: &str) -> Option<(ListKind, u32, &str)> {
    if let Some(caps) = regex_unordered_item().captures(trimmed) {
        let text = caps.get(1).map_or("", |m| m.as_str());
        return Some((ListKind::Unordered, 1, text));
    }
    if let Some(caps) = regex_ordered_item().captures(trimmed) {
        let number = caps[1].parse::<u32>().unwrap_or(1);
        let text = caps.get(2).map_or("", |m| m.as_str());
        return Some((ListKind::Ordered, number, text));
    }
    None
}

/// Split a table row line into trimmed cells, dropping boundary pipes
fn split_table_row(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Check the alignment-row grammar: every cell is `:?-+:?`
fn is_alignment_row(row: &str) -> bool {
    let cells = split_table_row(row);
    !cells.is_empty()
        && cells
            .iter()
            .all(|cell| regex_alignment_cell().is_match(cell))
}

fn regex_unordered_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*+]\s+(.*)$").unwrap())
}

fn regex_ordered_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.\s+(.*)$").unwrap())
}

fn regex_alignment_cell() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^:?-+:?$").unwrap())
}

fn regex_task_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([ xX])\] (.*)$").unwrap())
}

fn strip_code_indent(line: &str) -> Option<&str> {
    line.strip_prefix("    ").or_else(|| line.strip_prefix('\t'))
}
