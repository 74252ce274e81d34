//! Markdown renderer implementation.

use crate::error::Result;

use super::options::RenderOptions;
use super::view::View;
use super::{status_message, visible_grid};

/// Render a view as a Markdown pipe table.
///
/// Status views render as a single blockquote line.
pub fn to_markdown(view: &View, options: &RenderOptions) -> Result<String> {
    if let Some(message) = status_message(view) {
        return Ok(format!("> {}", message));
    }

    let (headers, rows, hidden) = visible_grid(view, options);
    if headers.is_empty() {
        return Ok(String::new());
    }

    let cell = |s: &str| render_cell(s, options.escape_special_chars);

    let mut output = String::new();
    output.push('|');
    for header in &headers {
        output.push_str(&format!(" {} |", cell(header)));
    }
    output.push('\n');

    output.push('|');
    for _ in &headers {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in &rows {
        output.push('|');
        for value in row {
            if value.is_empty() {
                output.push_str(" |");
            } else {
                output.push_str(&format!(" {} |", cell(value)));
            }
        }
        output.push('\n');
    }

    if hidden > 0 {
        output.push_str(&format!("\n_{} more rows not shown_\n", hidden));
    }

    Ok(output.trim_end().to_string())
}

/// Make a value safe inside a table cell.
///
/// Pipes and backslashes always need escaping inside a cell; line breaks
/// become `<br>`.
fn render_cell(s: &str, escape: bool) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '|' => result.push_str("\\|"),
            '\\' if escape => result.push_str("\\\\"),
            '`' | '*' | '_' if escape => {
                result.push('\\');
                result.push(c);
            }
            '\r' => {}
            '\n' => result.push_str("<br>"),
            _ => result.push(c),
        }
    }

    result
}
