//! Allow-list HTML sanitization
//!
//! An independent pass over an HTML string that removes disallowed tags,
//! attributes and URLs, counting every removal. The input may come from an
//! untrusted file or from this crate's own markdown renderer when
//! sanitization is requested.
//!
//! # Threat Model
//!
//! The primary threat is untrusted HTML executing in whatever view the host
//! application renders the output in: `<script>` bodies, event-handler
//! attributes, `javascript:`/`data:` URLs, and content-loading elements
//! (`iframe`, `object`, `embed`).
//!
//! # Processing Order
//!
//! The three passes build on each other and must run in order:
//!
//! 1. **Dangerous tags**: paired `<tag>…</tag>` occurrences are removed
//!    with their entire subtree, then any remaining self-closing or bare
//!    occurrences of the same tag.
//! 2. **Attributes**: every remaining opening tag with attributes is
//!    re-parsed; event-handler names (`on` + letter), names outside the
//!    allow-list (unless `aria-`/`data-` prefixed), and unsafe `href`/`src`
//!    URLs are dropped. Surviving values are re-escaped.
//! 3. **Tag allow-list**: any leftover tag whose name is not allowed has
//!    its markup stripped, leaving the inner text in place.
//!
//! Sanitization never fails; the worst case is aggressive stripping, which
//! is the intended fail-safe. Pattern-based sanitization of malformed
//! markup is approximate (an attribute value containing a raw `>` can
//! desynchronize matching) — this mirrors the reference behavior and is a
//! documented limitation, not something this module tries to out-smart.

use regex::Regex;
use std::sync::OnceLock;

/// Tags removed together with their entire content
const DANGEROUS_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "form", "input", "button", "select",
    "textarea", "applet", "frame", "frameset", "meta", "link", "base", "noscript",
];

/// Tags that survive the final allow-list pass
const TAG_ALLOW: &[&str] = &[
    "a", "abbr", "article", "b", "blockquote", "br", "caption", "code", "dd", "del", "details",
    "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "img", "li", "mark", "ol", "p", "pre", "s", "small", "span", "strong", "sub", "summary",
    "sup", "table", "tbody", "td", "th", "thead", "tr", "u", "ul",
];

/// Attributes that survive pass 2 (plus any `aria-`/`data-` prefix)
const ATTRIBUTE_ALLOW: &[&str] = &[
    "align", "alt", "checked", "class", "colspan", "dir", "disabled", "height", "href", "id",
    "lang", "rel", "rowspan", "src", "start", "style", "target", "title", "type", "width",
];

/// Result of one sanitization pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOutcome {
    /// The cleaned HTML
    pub html: String,
    /// Number of removed elements, attributes and URLs
    pub removed: usize,
}

/// Allow-list HTML sanitizer
///
/// The policy sets are process-wide constants; the sanitizer itself is
/// stateless and cheap to construct.
///
/// # Examples
///
/// ```
/// use mdhtml_engine::sanitizer::HtmlSanitizer;
///
/// let outcome = HtmlSanitizer::new().sanitize("<p onclick=\"x()\">hi</p>");
/// assert_eq!(outcome.html, "<p>hi</p>");
/// assert!(outcome.removed >= 1);
/// ```
pub struct HtmlSanitizer;

impl HtmlSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Sanitize an HTML string, returning the cleaned output and the
    /// number of removals
    pub fn sanitize(&self, html: &str) -> SanitizeOutcome {
        let mut removed = 0usize;

        let text = remove_dangerous_tags(html, &mut removed);
        let text = filter_attributes(&text, &mut removed);
        let text = strip_disallowed_tags(&text, &mut removed);

        if removed > 0 {
            log::debug!("sanitizer removed {} element(s)", removed);
        }

        SanitizeOutcome {
            html: text,
            removed,
        }
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// URL-safety predicate for `href`/`src` values
///
/// Accepts empty values, fragment and absolute-path references,
/// `http(s)`, `mailto:` and `tel:` schemes, and any scheme-less value.
/// Everything else with a `:` is rejected.
///
/// # Examples
///
/// ```
/// use mdhtml_engine::sanitizer::is_safe_url;
///
/// assert!(is_safe_url("https://example.com"));
/// assert!(is_safe_url("/docs/index.html"));
/// assert!(is_safe_url("relative/path.png"));
/// assert!(!is_safe_url("javascript:alert(1)"));
/// assert!(!is_safe_url("data:text/html,x"));
/// assert!(!is_safe_url("weird:thing"));
/// ```
pub fn is_safe_url(url: &str) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() || trimmed.starts_with('/') || trimmed.starts_with('#') {
        return true;
    }

    let lower = trimmed.to_lowercase();
    const SAFE_SCHEMES: &[&str] = &["http://", "https://", "mailto:", "tel:"];
    if SAFE_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return true;
    }

    const BLOCKED_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:", "file:"];
    if BLOCKED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return false;
    }

    // Any other scheme-bearing value is rejected; scheme-less is fine
    !lower.contains(':')
}

/// Pass 1: remove dangerous tags, paired occurrences first
fn remove_dangerous_tags(html: &str, removed: &mut usize) -> String {
    static PATTERNS: OnceLock<Vec<(Regex, Regex)>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        DANGEROUS_TAGS
            .iter()
            .map(|tag| {
                let paired =
                    Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap();
                let bare = Regex::new(&format!(r"(?is)</?{tag}\b[^>]*/?>")).unwrap();
                (paired, bare)
            })
            .collect()
    });

    let mut text = html.to_string();
    for (paired, bare) in patterns {
        for re in [paired, bare] {
            let hits = re.find_iter(&text).count();
            if hits > 0 {
                text = re.replace_all(&text, "").into_owned();
                *removed += hits;
            }
        }
    }
    text
}

/// Pass 2: re-parse the attributes of every remaining opening tag
fn filter_attributes(html: &str, removed: &mut usize) -> String {
    regex_open_tag_with_attrs()
        .replace_all(html, |caps: &regex::Captures| {
            let name = caps[1].to_lowercase();
            let attrs = &caps[2];
            let self_closing = !caps[3].is_empty();

            let mut rebuilt = format!("<{}", name);
            for attr in regex_attribute().captures_iter(attrs) {
                let attr_name = attr[1].to_lowercase();

                if is_event_handler(&attr_name) || !is_allowed_attribute(&attr_name) {
                    *removed += 1;
                    continue;
                }

                match attr.get(2) {
                    Some(raw) => {
                        let value = crate::entities::unescape_html(unquote(raw.as_str()));
                        if (attr_name == "href" || attr_name == "src") && !is_safe_url(&value) {
                            *removed += 1;
                            continue;
                        }
                        rebuilt.push_str(&format!(
                            " {}=\"{}\"",
                            attr_name,
                            crate::entities::escape_html(&value)
                        ));
                    }
                    None => {
                        rebuilt.push(' ');
                        rebuilt.push_str(&attr_name);
                    }
                }
            }
            if self_closing {
                rebuilt.push('/');
            }
            rebuilt.push('>');
            rebuilt
        })
        .into_owned()
}

/// Pass 3: strip the markup of any tag not in the allow-list
fn strip_disallowed_tags(html: &str, removed: &mut usize) -> String {
    regex_any_tag()
        .replace_all(html, |caps: &regex::Captures| {
            let name = caps[1].to_lowercase();
            if TAG_ALLOW.contains(&name.as_str()) {
                caps[0].to_string()
            } else {
                *removed += 1;
                String::new()
            }
        })
        .into_owned()
}

fn is_event_handler(attr_name: &str) -> bool {
    let mut chars = attr_name.chars();
    chars.next() == Some('o')
        && chars.next() == Some('n')
        && chars.next().is_some_and(|c| c.is_ascii_lowercase())
}

fn is_allowed_attribute(attr_name: &str) -> bool {
    ATTRIBUTE_ALLOW.contains(&attr_name)
        || attr_name.starts_with("aria-")
        || attr_name.starts_with("data-")
}

fn unquote(value: &str) -> &str {
    let v = value.trim();
    if (v.starts_with('"') && v.ends_with('"') && v.len() >= 2)
        || (v.starts_with('\'') && v.ends_with('\'') && v.len() >= 2)
    {
        &v[1..v.len() - 1]
    } else {
        v
    }
}

fn regex_open_tag_with_attrs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<([A-Za-z][A-Za-z0-9]*)\s+([^<>]*?)(/?)\s*>").unwrap())
}

fn regex_attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s>]+))?"#).unwrap()
    })
}

fn regex_any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)</?([A-Za-z][A-Za-z0-9]*)\b[^>]*?/?>").unwrap())
}
