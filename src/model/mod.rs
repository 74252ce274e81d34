//! Data model for shaped spreadsheet rows.
//!
//! The spreadsheet library hands back a [`RawSheet`] of [`CellValue`]s; the
//! row shaper turns everything below the header row into [`Record`]s.

mod cell;
mod record;

pub use cell::*;
pub use record::*;
