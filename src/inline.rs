//! Inline markdown formatting
//!
//! Converts one line (or one block payload) of markdown text into inline
//! HTML. The transformation is an ordered cascade and the order is a
//! correctness contract, not a preference:
//!
//! 1. escape the five HTML special characters
//! 2. code spans
//! 3. images
//! 4. links
//! 5. autolinks (angle-bracket URLs and emails)
//! 6. combined bold+italic
//! 7. bold
//! 8. italic
//! 9. strikethrough (GFM)
//! 10. trailing two-space run at line end → `<br/>`
//!
//! Escaping runs first, so every later pattern operates on already-escaped
//! text. Autolink patterns therefore match the `&lt;`/`&gt;` entity forms,
//! and link/image URLs are taken from escaped text — inputs containing `&`,
//! `<` or `>` inside link targets depend on this ordering byte-for-byte.

use crate::entities::escape_html;
use regex::Regex;
use std::sync::OnceLock;

/// Format a run of markdown text as inline HTML
///
/// `gfm` enables the strikethrough extension; all other steps are
/// flavor-independent.
///
/// # Examples
///
/// ```
/// use mdhtml_engine::inline::format_inline;
///
/// assert_eq!(format_inline("**bold**", true), "<strong>bold</strong>");
/// assert_eq!(format_inline("`a < b`", true), "<code>a &lt; b</code>");
/// assert_eq!(format_inline("~~gone~~", false), "~~gone~~");
/// ```
pub fn format_inline(text: &str, gfm: bool) -> String {
    let mut out = escape_html(text);

    out = regex_code_span()
        .replace_all(&out, "<code>$1</code>")
        .to_string();

    out = regex_image()
        .replace_all(&out, |caps: &regex::Captures| {
            let alt = caps.get(1).map_or("", |m| m.as_str());
            let url = caps.get(2).map_or("", |m| m.as_str());
            match caps.get(3) {
                Some(title) => {
                    format!("<img src=\"{}\" alt=\"{}\" title=\"{}\"/>", url, alt, title.as_str())
                }
                None => format!("<img src=\"{}\" alt=\"{}\"/>", url, alt),
            }
        })
        .to_string();

    out = regex_link()
        .replace_all(&out, |caps: &regex::Captures| {
            let label = caps.get(1).map_or("", |m| m.as_str());
            let url = caps.get(2).map_or("", |m| m.as_str());
            match caps.get(3) {
                Some(title) => {
                    format!("<a href=\"{}\" title=\"{}\">{}</a>", url, title.as_str(), label)
                }
                None => format!("<a href=\"{}\">{}</a>", url, label),
            }
        })
        .to_string();

    out = regex_autolink_url()
        .replace_all(&out, "<a href=\"$1\">$1</a>")
        .to_string();
    out = regex_autolink_email()
        .replace_all(&out, "<a href=\"mailto:$1\">$1</a>")
        .to_string();

    out = regex_bold_italic_star()
        .replace_all(&out, "<strong><em>$1</em></strong>")
        .to_string();
    out = regex_bold_italic_underscore()
        .replace_all(&out, "<strong><em>$1</em></strong>")
        .to_string();

    out = regex_bold_star()
        .replace_all(&out, "<strong>$1</strong>")
        .to_string();
    out = regex_bold_underscore()
        .replace_all(&out, "<strong>$1</strong>")
        .to_string();

    out = regex_italic_star().replace_all(&out, "<em>$1</em>").to_string();
    out = regex_italic_underscore()
        .replace_all(&out, "<em>$1</em>")
        .to_string();

    if gfm {
        out = regex_strikethrough()
            .replace_all(&out, "<del>$1</del>")
            .to_string();
    }

    out = regex_line_break().replace_all(&out, "<br/>").to_string();

    out
}

fn regex_code_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").unwrap())
}

fn regex_image() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Titles were double-quoted in the source, which step 1 turned into &quot;
    RE.get_or_init(|| Regex::new(r#"!\[([^\]]*)\]\(([^)"\s]+)(?:\s+&quot;([^)]*?)&quot;)?\)"#).unwrap())
}

fn regex_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\[([^\]]*)\]\(([^)"\s]+)(?:\s+&quot;([^)]*?)&quot;)?\)"#).unwrap())
}

fn regex_autolink_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The angle brackets are already escaped at this point
    RE.get_or_init(|| Regex::new(r"&lt;(https?://[^\s]+?)&gt;").unwrap())
}

fn regex_autolink_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&lt;([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})&gt;").unwrap()
    })
}

fn regex_bold_italic_star() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*\*([^*]+)\*\*\*").unwrap())
}

fn regex_bold_italic_underscore() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"___([^_]+)___").unwrap())
}

fn regex_bold_star() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap())
}

fn regex_bold_underscore() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__([^_]+)__").unwrap())
}

fn regex_italic_star() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").unwrap())
}

fn regex_italic_underscore() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The underscore form requires a non-space character immediately inside
    RE.get_or_init(|| Regex::new(r"_([^\s_][^_]*)_").unwrap())
}

fn regex_strikethrough() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"~~([^~]+)~~").unwrap())
}

fn regex_line_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)[ ]{2,}$").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping_runs_first() {
        assert_eq!(format_inline("a < b & c", true), "a &lt; b &amp; c");
        // Escaped text inside a code span
        assert_eq!(
            format_inline("`<div>`", true),
            "<code>&lt;div&gt;</code>"
        );
    }

    #[test]
    fn test_code_span() {
        assert_eq!(format_inline("use `let x`", true), "use <code>let x</code>");
    }

    #[test]
    fn test_image() {
        assert_eq!(
            format_inline("![logo](img.png)", true),
            "<img src=\"img.png\" alt=\"logo\"/>"
        );
        assert_eq!(
            format_inline("![logo](img.png \"The Logo\")", true),
            "<img src=\"img.png\" alt=\"logo\" title=\"The Logo\"/>"
        );
    }

    #[test]
    fn test_link() {
        assert_eq!(
            format_inline("[site](https://example.com)", true),
            "<a href=\"https://example.com\">site</a>"
        );
        assert_eq!(
            format_inline("[site](https://example.com \"Home\")", true),
            "<a href=\"https://example.com\" title=\"Home\">site</a>"
        );
    }

    #[test]
    fn test_link_url_is_escaped_text() {
        // The & in the query string was escaped in step 1 and stays escaped
        assert_eq!(
            format_inline("[q](https://example.com?a=1&b=2)", true),
            "<a href=\"https://example.com?a=1&amp;b=2\">q</a>"
        );
    }

    #[test]
    fn test_image_not_swallowed_by_link() {
        let out = format_inline("![alt](a.png) and [txt](b.html)", true);
        assert_eq!(
            out,
            "<img src=\"a.png\" alt=\"alt\"/> and <a href=\"b.html\">txt</a>"
        );
    }

    #[test]
    fn test_autolinks() {
        assert_eq!(
            format_inline("<https://example.com/x>", true),
            "<a href=\"https://example.com/x\">https://example.com/x</a>"
        );
        assert_eq!(
            format_inline("<user@example.com>", true),
            "<a href=\"mailto:user@example.com\">user@example.com</a>"
        );
    }

    #[test]
    fn test_emphasis_star_forms() {
        assert_eq!(format_inline("**b**", true), "<strong>b</strong>");
        assert_eq!(format_inline("*i*", true), "<em>i</em>");
        assert_eq!(
            format_inline("***both***", true),
            "<strong><em>both</em></strong>"
        );
    }

    #[test]
    fn test_emphasis_underscore_forms() {
        assert_eq!(format_inline("__b__", true), "<strong>b</strong>");
        assert_eq!(format_inline("_i_", true), "<em>i</em>");
        assert_eq!(
            format_inline("___both___", true),
            "<strong><em>both</em></strong>"
        );
    }

    #[test]
    fn test_underscore_italic_requires_non_space() {
        // Space immediately inside the opening underscore blocks the match
        assert_eq!(format_inline("_ not italic_", true), "_ not italic_");
        assert_eq!(format_inline("_yes_", true), "<em>yes</em>");
    }

    #[test]
    fn test_strikethrough_gated_on_gfm() {
        assert_eq!(format_inline("~~x~~", true), "<del>x</del>");
        assert_eq!(format_inline("~~x~~", false), "~~x~~");
    }

    #[test]
    fn test_trailing_two_spaces_become_break() {
        assert_eq!(format_inline("line  ", true), "line<br/>");
        assert_eq!(format_inline("a  \nb", true), "a<br/>\nb");
        // A single trailing space is not a break
        assert_eq!(format_inline("line ", true), "line ");
    }

    #[test]
    fn test_mixed_line() {
        let out = format_inline("see [**bold link**](x.html) today", true);
        assert_eq!(
            out,
            "see <a href=\"x.html\"><strong>bold link</strong></a> today"
        );
    }
}
