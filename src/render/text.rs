//! Plain text renderer implementation.

use crate::error::Result;
use unicode_width::UnicodeWidthStr;

use super::options::RenderOptions;
use super::view::View;
use super::{status_message, visible_grid};

/// Render a view as plain text with aligned columns.
pub fn to_text(view: &View, options: &RenderOptions) -> Result<String> {
    if let Some(message) = status_message(view) {
        return Ok(message);
    }

    let (headers, rows, hidden) = visible_grid(view, options);
    if headers.is_empty() {
        return Ok(String::new());
    }

    // Cells must stay on one line
    let single_line = |cells: &[String]| -> Vec<String> {
        cells.iter().map(|c| c.replace(['\r', '\n'], " ")).collect()
    };
    let headers = single_line(&headers);
    let rows: Vec<Vec<String>> = rows.iter().map(|row| single_line(row)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut output = String::new();
    output.push_str(&render_line(&headers, &widths));
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    output.push('\n');

    for row in &rows {
        output.push_str(&render_line(row, &widths));
        output.push('\n');
    }

    if hidden > 0 {
        output.push_str(&format!("... {} more rows\n", hidden));
    }

    Ok(output.trim_end().to_string())
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    line.trim_end().to_string()
}
