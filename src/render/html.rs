//! HTML renderer implementation.

use crate::error::Result;

use super::options::RenderOptions;
use super::view::View;
use super::{status_message, visible_grid};

/// Render a view as an HTML fragment.
///
/// Tables become `<table>` with a `<thead>`; the other views become a single
/// `<div>` whose class names the view.
pub fn to_html(view: &View, options: &RenderOptions) -> Result<String> {
    if let Some(message) = status_message(view) {
        let class = match view {
            View::Loading { .. } => "loading",
            View::Error { .. } => "error",
            _ => "empty",
        };
        return Ok(format!(
            "<div class=\"{}\">{}</div>",
            class,
            escape_html(&message)
        ));
    }

    let (headers, rows, hidden) = visible_grid(view, options);
    if headers.is_empty() {
        return Ok(String::new());
    }

    let mut html = String::from("<table>\n  <thead>\n    <tr>\n");
    for header in &headers {
        html.push_str(&format!("      <th>{}</th>\n", escape_html(header)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for row in &rows {
        html.push_str("    <tr>\n");
        for cell in row {
            html.push_str(&format!("      <td>{}</td>\n", escape_html(cell)));
        }
        html.push_str("    </tr>\n");
    }

    html.push_str("  </tbody>\n</table>");

    if hidden > 0 {
        html.push_str(&format!("\n<p>{} more rows not shown</p>", hidden));
    }

    Ok(html)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
