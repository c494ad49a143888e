//! HTML to Markdown conversion
//!
//! The converter is a fixed, ordered sequence of structural substitutions
//! over the whole document; each step assumes the previous ones have
//! already run. The order (headers, emphasis, code, links/images,
//! blockquotes, lists, tables, rules, breaks, paragraphs, unwrap, strip,
//! unescape, collapse, trim) is the contract to preserve.
//!
//! Malformed HTML is handled permissively: patterns transform what they
//! recognize and the final strip pass removes whatever markup is left, so
//! unmatched fragments degrade to literal text rather than errors.

use crate::entities::unescape_html;
use regex::Regex;
use std::sync::OnceLock;

/// HTML to Markdown converter
///
/// Stateless; one [`convert`](MarkdownConverter::convert) call per
/// document.
///
/// # Examples
///
/// ```
/// use mdhtml_engine::converter::MarkdownConverter;
///
/// let converter = MarkdownConverter::new();
/// let md = converter.convert("<h2>Hi</h2><p>Some <strong>bold</strong> text.</p>");
/// assert!(md.contains("## Hi"));
/// assert!(md.contains("**bold**"));
/// ```
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert an HTML string (fragment or full document) to markdown
    ///
    /// Full documents are reduced to their `<body>` contents first.
    pub fn convert(&self, html: &str) -> String {
        let mut text = extract_body(html).replace("\r\n", "\n");

        // Headers
        text = regex_heading()
            .replace_all(&text, |caps: &regex::Captures| {
                let level = caps[1].parse::<usize>().unwrap_or(1).clamp(1, 6);
                format!("\n{} {}\n\n", "#".repeat(level), caps[2].trim())
            })
            .into_owned();

        // Emphasis
        text = regex_strong().replace_all(&text, "**$1**").into_owned();
        text = regex_em().replace_all(&text, "*$1*").into_owned();
        text = regex_strike().replace_all(&text, "~~$1~~").into_owned();

        // Code, fenced before inline so <pre><code> pairs are consumed first
        text = regex_code_block()
            .replace_all(&text, |caps: &regex::Captures| {
                let lang = caps.get(1).map_or("", |m| m.as_str());
                let body = caps[2].trim_matches('\n');
                format!("\n```{}\n{}\n```\n\n", lang, body)
            })
            .into_owned();
        text = regex_inline_code().replace_all(&text, "`$1`").into_owned();

        // Links, then images in either attribute order
        text = regex_link().replace_all(&text, "[$2]($1)").into_owned();
        text = regex_image_src_alt().replace_all(&text, "![$2]($1)").into_owned();
        text = regex_image_alt_src().replace_all(&text, "![$1]($2)").into_owned();

        // Blockquotes
        text = regex_blockquote()
            .replace_all(&text, |caps: &regex::Captures| {
                let quoted: Vec<String> = caps[1]
                    .trim()
                    .lines()
                    .map(|line| format!("> {}", line.trim()))
                    .collect();
                format!("\n\n{}\n\n", quoted.join("\n"))
            })
            .into_owned();

        // Lists
        text = regex_unordered_list()
            .replace_all(&text, |caps: &regex::Captures| {
                let mut block = String::from("\n\n");
                for item in regex_list_item().captures_iter(&caps[1]) {
                    block.push_str(&format!("- {}\n", item[1].trim()));
                }
                block.push('\n');
                block
            })
            .into_owned();
        text = regex_ordered_list()
            .replace_all(&text, |caps: &regex::Captures| {
                let start = regex_start_attr()
                    .captures(&caps[1])
                    .and_then(|c| c[1].parse::<usize>().ok())
                    .unwrap_or(1);
                let mut block = String::from("\n\n");
                for (offset, item) in regex_list_item().captures_iter(&caps[2]).enumerate() {
                    // An attacker-supplied start attribute can sit at the
                    // numeric limit; saturate instead of overflowing
                    let number = start.saturating_add(offset);
                    block.push_str(&format!("{}. {}\n", number, item[1].trim()));
                }
                block.push('\n');
                block
            })
            .into_owned();

        // Tables: sectioned (<thead>/<tbody>) or flat <tr> rows both reduce
        // through the same row scan
        text = regex_table()
            .replace_all(&text, |caps: &regex::Captures| render_table_markdown(&caps[1]))
            .into_owned();

        // Rules and breaks
        text = regex_hr().replace_all(&text, "\n---\n").into_owned();
        text = regex_br().replace_all(&text, "  \n").into_owned();

        // Paragraphs become blank-line-delimited text
        text = regex_paragraph()
            .replace_all(&text, |caps: &regex::Captures| {
                format!("\n\n{}\n\n", caps[1].trim())
            })
            .into_owned();

        // Unwrap purely structural containers, then strip whatever markup
        // is left
        text = regex_div_span().replace_all(&text, "").into_owned();
        text = regex_any_tag().replace_all(&text, "").into_owned();

        text = unescape_html(&text);
        text = regex_excess_newlines().replace_all(&text, "\n\n").into_owned();
        text.trim().to_string()
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce a full document to its `<body>` contents; fragments pass through
pub(crate) fn extract_body(html: &str) -> &str {
    match regex_body().captures(html) {
        Some(caps) => caps.get(1).map_or(html, |m| m.as_str()),
        None => html,
    }
}

/// Render one `<table>` body as pipe-delimited markdown
fn render_table_markdown(inner: &str) -> String {
    let rows: Vec<Vec<String>> = regex_table_row()
        .captures_iter(inner)
        .map(|row| {
            regex_table_cell()
                .captures_iter(&row[1])
                .map(|cell| {
                    regex_any_tag()
                        .replace_all(&cell[1], "")
                        .trim()
                        .replace('\n', " ")
                })
                .collect()
        })
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        return String::new();
    }

    // Separator sized to the widest row
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = String::from("\n\n");
    out.push_str(&format!("| {} |\n", rows[0].join(" | ")));
    out.push_str(&format!(
        "| {} |\n",
        vec!["---"; width].join(" | ")
    ));
    for row in &rows[1..] {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out.push('\n');
    out
}

fn regex_body() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").unwrap())
}

fn regex_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>").unwrap())
}

fn regex_strong() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(?:strong|b)\b[^>]*>(.*?)</(?:strong|b)>").unwrap())
}

fn regex_em() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(?:em|i)\b[^>]*>(.*?)</(?:em|i)>").unwrap())
}

fn regex_strike() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(?:del|s|strike)\b[^>]*>(.*?)</(?:del|s|strike)>").unwrap()
    })
}

fn regex_code_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<pre[^>]*><code(?:\s+class="(?:language-|lang-)?([^"]*)")?[^>]*>(.*?)</code></pre>"#,
        )
        .unwrap()
    })
}

fn regex_inline_code() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<code[^>]*>(.*?)</code>").unwrap())
}

fn regex_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*"([^"]*)"[^>]*>(.*?)</a>"#).unwrap()
    })
}

fn regex_image_src_alt() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\b[^>]*src\s*=\s*"([^"]*)"[^>]*alt\s*=\s*"([^"]*)"[^>]*/?>"#)
            .unwrap()
    })
}

fn regex_image_alt_src() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\b[^>]*alt\s*=\s*"([^"]*)"[^>]*src\s*=\s*"([^"]*)"[^>]*/?>"#)
            .unwrap()
    })
}

fn regex_blockquote() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<blockquote[^>]*>(.*?)</blockquote>").unwrap())
}

fn regex_unordered_list() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<ul[^>]*>(.*?)</ul>").unwrap())
}

fn regex_ordered_list() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<ol([^>]*)>(.*?)</ol>").unwrap())
}

fn regex_list_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").unwrap())
}

fn regex_start_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)start\s*=\s*"?(\d+)"?"#).unwrap())
}

fn regex_table() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<table[^>]*>(.*?)</table>").unwrap())
}

fn regex_table_row() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap())
}

fn regex_table_cell() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<t[hd][^>]*>(.*?)</t[hd]>").unwrap())
}

fn regex_hr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<hr\b[^>]*/?>").unwrap())
}

fn regex_br() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<br\s*/?>").unwrap())
}

fn regex_paragraph() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").unwrap())
}

fn regex_div_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?(?:div|span)\b[^>]*>").unwrap())
}

fn regex_any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").unwrap())
}

fn regex_excess_newlines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(html: &str) -> String {
        MarkdownConverter::new().convert(html)
    }

    #[test]
    fn test_headers() {
        assert_eq!(convert("<h1>One</h1>"), "# One");
        assert_eq!(convert("<h3>Three</h3>"), "### Three");
        assert_eq!(convert("<h6>Six</h6>"), "###### Six");
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(convert("<strong>b</strong>"), "**b**");
        assert_eq!(convert("<b>b</b>"), "**b**");
        assert_eq!(convert("<em>i</em>"), "*i*");
        assert_eq!(convert("<i>i</i>"), "*i*");
        assert_eq!(convert("<del>s</del>"), "~~s~~");
    }

    #[test]
    fn test_fenced_code_with_language() {
        let md = convert("<pre><code class=\"language-rust\">let x = 1;</code></pre>");
        assert_eq!(md, "```rust\nlet x = 1;\n```");
    }

    #[test]
    fn test_fenced_code_without_language() {
        let md = convert("<pre><code>plain</code></pre>");
        assert_eq!(md, "```\nplain\n```");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(convert("<p>use <code>let</code> here</p>"), "use `let` here");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert("<a href=\"https://example.com\">site</a>"),
            "[site](https://example.com)"
        );
    }

    #[test]
    fn test_images_both_attribute_orders() {
        assert_eq!(
            convert("<img src=\"a.png\" alt=\"pic\">"),
            "![pic](a.png)"
        );
        assert_eq!(
            convert("<img alt=\"pic\" src=\"a.png\">"),
            "![pic](a.png)"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(convert("<blockquote>a\nb</blockquote>"), "> a\n> b");
    }

    #[test]
    fn test_unordered_list() {
        let md = convert("<ul><li>x</li><li>y</li></ul>");
        assert_eq!(md, "- x\n- y");
    }

    #[test]
    fn test_ordered_list_with_start() {
        assert_eq!(convert("<ol><li>a</li><li>b</li></ol>"), "1. a\n2. b");
        assert_eq!(
            convert("<ol start=\"5\"><li>a</li><li>b</li></ol>"),
            "5. a\n6. b"
        );
    }

    #[test]
    fn test_ordered_list_start_at_numeric_limit_saturates() {
        let html = format!("<ol start=\"{}\"><li>a</li><li>b</li></ol>", usize::MAX);
        let md = convert(&html);
        assert!(md.contains(&format!("{}. a", usize::MAX)));
        assert!(md.contains(&format!("{}. b", usize::MAX)));
    }

    #[test]
    fn test_table_sectioned() {
        let html = "<table><thead><tr><th>a</th><th>b</th></tr></thead>\
                    <tbody><tr><td>1</td><td>2</td></tr></tbody></table>";
        let md = convert(html);
        assert_eq!(md, "| a | b |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_table_flat_rows() {
        let html = "<table><tr><td>a</td><td>b</td></tr><tr><td>1</td><td>2</td></tr></table>";
        let md = convert(html);
        assert_eq!(md, "| a | b |\n| --- | --- |\n| 1 | 2 |");
    }

    #[test]
    fn test_table_separator_sized_to_widest_row() {
        let html = "<table><tr><td>a</td></tr><tr><td>1</td><td>2</td><td>3</td></tr></table>";
        let md = convert(html);
        assert!(md.contains("| --- | --- | --- |"));
    }

    #[test]
    fn test_hr_and_br() {
        assert_eq!(convert("<p>a</p><hr><p>b</p>"), "a\n\n---\n\nb");
        assert_eq!(convert("<p>a<br>b</p>"), "a  \nb");
    }

    #[test]
    fn test_paragraph_separation() {
        assert_eq!(convert("<p>one</p><p>two</p>"), "one\n\ntwo");
    }

    #[test]
    fn test_div_span_unwrapped() {
        assert_eq!(convert("<div><span>kept</span></div>"), "kept");
    }

    #[test]
    fn test_remaining_tags_stripped() {
        assert_eq!(convert("<article><p>x</p></article>"), "x");
        assert_eq!(convert("<custom-tag>y</custom-tag>"), "y");
    }

    #[test]
    fn test_entities_unescaped() {
        assert_eq!(convert("<p>a &amp; b &lt; c</p>"), "a & b < c");
        assert_eq!(convert("<p>&#8212;</p>"), "\u{2014}");
    }

    #[test]
    fn test_full_document_uses_body_only() {
        let html = "<html><head><title>Skip</title></head>\
                    <body><h1>Keep</h1></body></html>";
        assert_eq!(convert(html), "# Keep");
    }

    #[test]
    fn test_malformed_html_degrades_to_text() {
        let md = convert("<p>ok</p><broken <p>rest");
        assert!(md.contains("ok"));
        assert!(!md.contains("</p>"));
    }

    #[test]
    fn test_newline_collapse() {
        let md = convert("<p>a</p>\n\n\n\n<p>b</p>");
        assert_eq!(md, "a\n\nb");
    }
}
