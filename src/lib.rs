//! # sheetview
//!
//! Load a spreadsheet, shape the rows of its first sheet into header-keyed
//! records, and render them as a table.
//!
//! Decoding workbook bytes is delegated to a [`SpreadsheetLibrary`], loaded
//! once per [`LibraryRegistry`]. The bundled [`xlsx::OoxmlLibrary`] handles
//! `.xlsx` files.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sheetview::parse_file;
//!
//! let shaped = parse_file("people.xlsx")?;
//! println!("Columns: {:?}", shaped.headers);
//! println!("Rows: {}", shaped.records.len());
//! # Ok::<(), sheetview::Error>(())
//! ```
//!
//! ## Upload sessions
//!
//! ```no_run
//! use sheetview::render::{render, RenderOptions};
//! use sheetview::session::{SelectedFile, UploadSession};
//!
//! # async fn demo() -> sheetview::Result<()> {
//! let session = UploadSession::with_defaults();
//! let _ = session.select(Some(SelectedFile::from_path("people.xlsx"))).await;
//! println!("{}", render(&session.view(), &RenderOptions::default())?);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod container;
pub mod detect;
pub mod error;
pub mod library;
pub mod loader;
pub mod model;
pub mod render;
pub mod session;
pub mod shape;
pub mod xlsx;

// Re-exports
pub use detect::{detect_format_from_bytes, is_accepted_extension, SpreadsheetFormat};
pub use error::{Error, Result};
pub use library::{HeaderMode, ReadHint, Sheet, SpreadsheetLibrary, Workbook};
pub use loader::{LibraryLoader, LibraryRegistry, LibrarySource};
pub use model::{CellValue, ParsedTable, RawSheet, Record};
pub use render::{render, OutputFormat, RenderOptions, View};
pub use session::{SelectedFile, SessionConfig, UiState, UploadSession};
pub use shape::{shape_rows, ShapedSheet};

use std::path::Path;

/// Parse a spreadsheet file with the bundled library.
///
/// # Example
///
/// ```no_run
/// let shaped = sheetview::parse_file("people.xlsx")?;
/// assert!(!shaped.headers.is_empty());
/// # Ok::<(), sheetview::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<ShapedSheet> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| Error::FileRead(format!("{}: {}", path.display(), e)))?;
    parse_bytes(&data)
}

/// Parse spreadsheet bytes with the bundled library.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("people.xlsx")?;
/// let shaped = sheetview::parse_bytes(&data)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<ShapedSheet> {
    shape::parse_workbook_bytes(Some(&xlsx::OoxmlLibrary::new()), data)
}
