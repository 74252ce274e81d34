//! Row shaping: raw sheet rows into header-keyed records.

use crate::adapter::narrow_rows;
use crate::error::{Error, Result};
use crate::library::{HeaderMode, ReadHint, SpreadsheetLibrary};
use crate::model::{CellValue, ParsedTable, RawSheet, Record};
use serde::Serialize;
use tracing::debug;

/// Headers plus the records shaped from the rows below them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShapedSheet {
    pub headers: Vec<String>,
    pub records: ParsedTable,
}

/// Shape an array-of-arrays sheet.
///
/// Row 0 supplies the headers. Each later row is zipped against them by
/// position: cells past the last header are dropped and missing cells become
/// [`CellValue::Empty`]. When a header name repeats, the later column's value
/// is kept under the first occurrence's key.
///
/// # Example
///
/// ```
/// use sheetview::model::CellValue;
/// use sheetview::shape::shape_rows;
///
/// let raw = vec![
///     vec![CellValue::text("Name"), CellValue::text("Age")],
///     vec![CellValue::text("Alice"), CellValue::text("30")],
/// ];
/// let shaped = shape_rows(raw)?;
/// assert_eq!(shaped.headers, vec!["Name", "Age"]);
/// assert_eq!(shaped.records[0].display("Age"), "30");
/// # Ok::<(), sheetview::Error>(())
/// ```
pub fn shape_rows(raw: RawSheet) -> Result<ShapedSheet> {
    let mut rows = raw.into_iter();
    let header_row = rows.next().ok_or(Error::EmptySheet)?;

    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

    let records = rows
        .map(|row| {
            let mut cells = row.into_iter();
            headers
                .iter()
                .map(|header| (header.as_str(), cells.next().unwrap_or(CellValue::Empty)))
                .collect::<Record>()
        })
        .collect();

    Ok(ShapedSheet { headers, records })
}

/// Read a workbook with `library` and shape its first sheet.
///
/// Fails with [`Error::LibraryNotLoaded`] when no library is available and
/// with [`Error::EmptySheet`] when the first sheet has no rows. Every other
/// failure is reported as [`Error::Parse`].
pub fn parse_workbook_bytes(
    library: Option<&dyn SpreadsheetLibrary>,
    data: &[u8],
) -> Result<ShapedSheet> {
    let library = library.ok_or(Error::LibraryNotLoaded)?;
    read_first_sheet(library, data).map_err(Error::into_parse_error)
}

fn read_first_sheet(library: &dyn SpreadsheetLibrary, data: &[u8]) -> Result<ShapedSheet> {
    let workbook = library.read_workbook(data, ReadHint::Sniff)?;

    let sheet = workbook
        .first_sheet()
        .ok_or_else(|| Error::Parse("workbook contains no sheets".to_string()))?;

    let raw = narrow_rows(library.sheet_to_json(sheet, HeaderMode::Array)?)?;
    debug!(
        library = library.name(),
        sheet = %sheet.name,
        rows = raw.len(),
        "sheet converted"
    );

    shape_rows(raw)
}
