//! Output rendering for upload state.
//!
//! A [`UiState`](crate::session::UiState) is first projected into a [`View`],
//! which is then rendered as plain text, Markdown, HTML, or JSON.
//!
//! # Example
//!
//! ```
//! use sheetview::render::{render, OutputFormat, RenderOptions, View};
//! use sheetview::session::UiState;
//!
//! let view = View::from_state(&UiState::default());
//! let out = render(&view, &RenderOptions::new().with_format(OutputFormat::Markdown))?;
//! assert!(out.is_empty());
//! # Ok::<(), sheetview::Error>(())
//! ```

mod html;
mod json;
mod markdown;
mod options;
mod text;
mod view;

pub use html::to_html;
pub use json::to_json;
pub use markdown::to_markdown;
pub use options::{JsonFormat, OutputFormat, RenderOptions};
pub use text::to_text;
pub use view::{View, EMPTY_MESSAGE, LOADING_MESSAGE};

use crate::error::Result;
use unicode_width::UnicodeWidthChar;

/// Render a view in the format selected by `options`.
pub fn render(view: &View, options: &RenderOptions) -> Result<String> {
    match options.format {
        OutputFormat::Text => to_text(view, options),
        OutputFormat::Markdown => to_markdown(view, options),
        OutputFormat::Html => to_html(view, options),
        OutputFormat::Json => to_json(view, options.json_format),
    }
}

/// Status line for non-table views; `None` for tables and idle.
pub(crate) fn status_message(view: &View) -> Option<String> {
    match view {
        View::Loading {
            file_name: Some(name),
        } => Some(format!("Loading {}...", name)),
        View::Loading { file_name: None } => Some(LOADING_MESSAGE.to_string()),
        View::Error { message } => Some(message.clone()),
        View::Empty { .. } => Some(EMPTY_MESSAGE.to_string()),
        View::Idle | View::Table { .. } => None,
    }
}

/// Display cells of a table view after row and width limits.
///
/// Returns the headers, the visible rows, and how many rows were cut.
pub(crate) fn visible_grid(
    view: &View,
    options: &RenderOptions,
) -> (Vec<String>, Vec<Vec<String>>, usize) {
    let View::Table { headers, .. } = view else {
        return (Vec::new(), Vec::new(), 0);
    };

    let mut rows = view.cell_grid();
    let hidden = match options.max_rows {
        Some(max) if rows.len() > max => {
            let hidden = rows.len() - max;
            rows.truncate(max);
            hidden
        }
        _ => 0,
    };

    let clip = |s: &str| match options.max_cell_width {
        Some(width) => truncate_width(s, width),
        None => s.to_string(),
    };

    let headers = headers.iter().map(|h| clip(h)).collect();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|c| clip(c)).collect())
        .collect();

    (headers, rows, hidden)
}

/// Cut `s` to at most `width` display columns, marking the cut with `…`.
pub(crate) fn truncate_width(s: &str, width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
