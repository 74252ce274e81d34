//! Bundled spreadsheet library for Office Open XML workbooks.
//!
//! [`OoxmlLibrary`] is the default [`SpreadsheetLibrary`](crate::library::SpreadsheetLibrary)
//! handed out by [`BundledSource`](crate::loader::BundledSource).
//!
//! # Example
//!
//! ```no_run
//! use sheetview::library::{ReadHint, SpreadsheetLibrary};
//! use sheetview::xlsx::OoxmlLibrary;
//!
//! let data = std::fs::read("spreadsheet.xlsx")?;
//! let workbook = OoxmlLibrary::new().read_workbook(&data, ReadHint::Sniff)?;
//!
//! for name in &workbook.sheet_names {
//!     println!("Sheet: {}", name);
//! }
//! # Ok::<(), sheetview::Error>(())
//! ```

mod reader;
mod shared_strings;

pub use reader::OoxmlLibrary;
