//! Projection of session state into a single displayable view.

use crate::model::ParsedTable;
use crate::session::UiState;
use serde::Serialize;

/// Shown while an attempt is in flight.
pub const LOADING_MESSAGE: &str = "Loading...";

/// Shown when a file was read but produced no data rows.
pub const EMPTY_MESSAGE: &str = "No data found in the uploaded file.";

/// Exactly one thing to display for a given state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum View {
    /// Nothing selected yet
    Idle,
    /// An attempt is in flight
    Loading {
        #[serde(skip_serializing_if = "Option::is_none")]
        file_name: Option<String>,
    },
    /// The last attempt failed
    Error { message: String },
    /// Rows to show under their headers
    Table {
        headers: Vec<String>,
        rows: ParsedTable,
    },
    /// A file was read but had no data rows
    Empty { file_name: String },
}

impl View {
    /// Pick the view for `state`.
    ///
    /// Loading takes precedence over an error, an error over data, and data
    /// over the empty notice. The empty notice needs a selected file.
    pub fn from_state(state: &UiState) -> Self {
        if state.loading {
            return View::Loading {
                file_name: state.file_name.clone(),
            };
        }

        if let Some(ref message) = state.error {
            return View::Error {
                message: message.clone(),
            };
        }

        if !state.table.is_empty() {
            return View::Table {
                headers: state.headers.clone(),
                rows: state.table.clone(),
            };
        }

        match state.file_name {
            Some(ref name) => View::Empty {
                file_name: name.clone(),
            },
            None => View::Idle,
        }
    }

    /// Row cells as display strings, one `Vec` per row, in header order.
    ///
    /// Missing and empty cells become "". Returns nothing for non-table views.
    pub fn cell_grid(&self) -> Vec<Vec<String>> {
        match self {
            View::Table { headers, rows } => rows
                .iter()
                .map(|record| headers.iter().map(|h| record.display(h)).collect())
                .collect(),
            _ => Vec::new(),
        }
    }
}
