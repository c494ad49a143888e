//! HTML entity escaping and unescaping
//!
//! Leaf utility shared by both conversion directions. Escaping covers the
//! five characters with special meaning in HTML (`&`, `<`, `>`, `"`, `'`);
//! unescaping additionally resolves decimal and hexadecimal numeric
//! character references (`&#65;`, `&#x41;`).

/// Escape the five HTML special characters
///
/// Returns the input unchanged (as a fresh `String`) when no special
/// character is present. The scan copies unmodified slices in bulk rather
/// than pushing char by char.
///
/// # Examples
///
/// ```
/// use mdhtml_engine::entities::escape_html;
///
/// assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut result = String::with_capacity(s.len());
    let mut start = 0;

    for (index, &byte) in bytes.iter().enumerate() {
        let replacement = match byte {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };

        result.push_str(&s[start..index]);
        result.push_str(replacement);
        start = index + 1;
    }

    if start == 0 {
        return s.to_string();
    }

    result.push_str(&s[start..]);
    result
}

/// Unescape HTML entities back to literal text
///
/// Resolves the five named entities produced by [`escape_html`] (plus the
/// common `&apos;` and `&nbsp;` forms) and numeric character references in
/// decimal (`&#8212;`) and hexadecimal (`&#x2014;`) notation. Unrecognized
/// entity-like sequences are left untouched.
///
/// # Examples
///
/// ```
/// use mdhtml_engine::entities::unescape_html;
///
/// assert_eq!(unescape_html("a &lt; b &amp; c"), "a < b & c");
/// assert_eq!(unescape_html("&#65;&#x42;"), "AB");
/// assert_eq!(unescape_html("&bogus;"), "&bogus;");
/// ```
pub fn unescape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        match decode_entity(candidate) {
            Some((decoded, consumed)) => {
                result.push(decoded);
                rest = &candidate[consumed..];
            }
            None => {
                result.push('&');
                rest = &candidate[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Decode a single entity at the start of `s` (which begins with `&`)
///
/// Returns the decoded character and the number of bytes consumed, or
/// `None` if `s` does not start with a recognized entity.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    const NAMED: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#39;", '\''),
        ("&apos;", '\''),
        ("&nbsp;", '\u{a0}'),
    ];

    for &(name, ch) in NAMED {
        if s.starts_with(name) {
            return Some((ch, name.len()));
        }
    }

    // Numeric character reference: &#123; or &#x1F600;
    let body = s.strip_prefix("&#")?;
    let (digits, radix) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    let end = digits.find(';')?;
    if end == 0 || end > 8 {
        return None;
    }
    let code = u32::from_str_radix(&digits[..end], radix).ok()?;
    let ch = char::from_u32(code)?;

    // "&#" + optional "x" + digits + ";"
    let consumed = s.len() - digits.len() + end + 1;
    Some((ch, consumed))
}
