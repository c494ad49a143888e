//! GFM table rendering
//!
//! Turns the rows accumulated by the block parser (header cells, per-column
//! alignment markers, body rows) into an HTML table. Cell text is
//! inline-formatted on the way out.

use crate::inline::format_inline;

/// Table column alignment, parsed from the alignment row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlignment {
    Left,
    Center,
    Right,
}

impl ColumnAlignment {
    /// Parse one alignment-row cell (`:---`, `:---:`, `---:`, `---`)
    ///
    /// Returns `None` for a plain dash run, which leaves the column
    /// unstyled.
    pub fn from_marker(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        let leading = cell.starts_with(':');
        let trailing = cell.ends_with(':');
        match (leading, trailing) {
            (true, true) => Some(ColumnAlignment::Center),
            (false, true) => Some(ColumnAlignment::Right),
            (true, false) => Some(ColumnAlignment::Left),
            (false, false) => None,
        }
    }

    fn style_attr(self) -> &'static str {
        match self {
            ColumnAlignment::Left => " style=\"text-align:left\"",
            ColumnAlignment::Center => " style=\"text-align:center\"",
            ColumnAlignment::Right => " style=\"text-align:right\"",
        }
    }
}

/// Render header, alignments and body rows as an HTML table
///
/// A missing alignment for a column omits the `style` attribute for that
/// column in every row. Rows may be ragged; cells beyond a row's length
/// simply do not exist in the output.
pub fn render_table(
    header: &[String],
    alignments: &[Option<ColumnAlignment>],
    body: &[Vec<String>],
    gfm: bool,
) -> String {
    let mut out = String::from("<table><thead><tr>");

    for (i, cell) in header.iter().enumerate() {
        out.push_str("<th");
        if let Some(align) = alignment_for(alignments, i) {
            out.push_str(align.style_attr());
        }
        out.push('>');
        out.push_str(&format_inline(cell, gfm));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");

    for row in body {
        out.push_str("<tr>");
        for (i, cell) in row.iter().enumerate() {
            out.push_str("<td");
            if let Some(align) = alignment_for(alignments, i) {
                out.push_str(align.style_attr());
            }
            out.push('>');
            out.push_str(&format_inline(cell, gfm));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");

    out
}

fn alignment_for(alignments: &[Option<ColumnAlignment>], column: usize) -> Option<ColumnAlignment> {
    alignments.get(column).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_alignment_markers() {
        assert_eq!(ColumnAlignment::from_marker("---"), None);
        assert_eq!(
            ColumnAlignment::from_marker(":---"),
            Some(ColumnAlignment::Left)
        );
        assert_eq!(
            ColumnAlignment::from_marker("---:"),
            Some(ColumnAlignment::Right)
        );
        assert_eq!(
            ColumnAlignment::from_marker(":---:"),
            Some(ColumnAlignment::Center)
        );
    }

    #[test]
    fn test_basic_table_shape() {
        let html = render_table(
            &cells(&["a", "b"]),
            &[None, None],
            &[cells(&["1", "2"])],
            true,
        );
        let expected = "<table><thead><tr><th>a</th><th>b</th></tr></thead>\
                        <tbody><tr><td>1</td><td>2</td></tr></tbody></table>";
        assert_eq!(html, expected);
    }

    #[test]
    fn test_styled_and_unstyled_columns() {
        let html = render_table(
            &cells(&["l", "c", "p"]),
            &[
                Some(ColumnAlignment::Left),
                Some(ColumnAlignment::Center),
                None,
            ],
            &[cells(&["1", "2", "3"])],
            true,
        );
        assert!(html.contains("<th style=\"text-align:left\">l</th>"));
        assert!(html.contains("<th style=\"text-align:center\">c</th>"));
        assert!(html.contains("<th>p</th>"));
        assert!(html.contains("<td style=\"text-align:left\">1</td>"));
        assert!(html.contains("<td>3</td>"));
    }

    #[test]
    fn test_cells_are_inline_formatted() {
        let html = render_table(
            &cells(&["**h**"]),
            &[None],
            &[cells(&["`x < y`"])],
            true,
        );
        assert!(html.contains("<th><strong>h</strong></th>"));
        assert!(html.contains("<td><code>x &lt; y</code></td>"));
    }

    #[test]
    fn test_ragged_rows() {
        let html = render_table(
            &cells(&["a", "b"]),
            &[None, Some(ColumnAlignment::Right)],
            &[cells(&["only"])],
            true,
        );
        assert!(html.contains("<tr><td>only</td></tr>"));
    }
}
