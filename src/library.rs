//! The spreadsheet library collaborator.
//!
//! Decoding workbook bytes is delegated to an implementation of
//! [`SpreadsheetLibrary`]. The surface is deliberately narrow: read a
//! workbook, then convert one sheet to loosely-typed JSON. Anything that
//! satisfies it can be registered with a [`LibraryRegistry`](crate::LibraryRegistry).
//!
//! # Example
//!
//! ```no_run
//! use sheetview::library::{HeaderMode, ReadHint, SpreadsheetLibrary};
//! use sheetview::xlsx::OoxmlLibrary;
//!
//! let data = std::fs::read("data.xlsx")?;
//! let library = OoxmlLibrary::new();
//! let workbook = library.read_workbook(&data, ReadHint::Sniff)?;
//! if let Some(sheet) = workbook.first_sheet() {
//!     let rows = library.sheet_to_json(sheet, HeaderMode::Array)?;
//!     println!("{}", rows);
//! }
//! # Ok::<(), sheetview::Error>(())
//! ```

use crate::error::Result;
use crate::model::{CellValue, RawSheet};
use std::collections::{BTreeMap, HashMap};

/// Format hint passed to [`SpreadsheetLibrary::read_workbook`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadHint {
    /// Detect the format from the bytes
    #[default]
    Sniff,
    /// Treat the bytes as an OOXML workbook
    Xlsx,
    /// Treat the bytes as a legacy BIFF workbook
    Xls,
}

/// Row layout requested from [`SpreadsheetLibrary::sheet_to_json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderMode {
    /// One JSON array per row, including the header row
    #[default]
    Array,
    /// One JSON object per data row, keyed by the first row
    FirstRow,
}

/// Number of rows in a worksheet.
pub const MAX_ROWS: u32 = 1_048_576;

/// Number of columns in a worksheet (`A` to `XFD`).
pub const MAX_COLS: u32 = 16_384;

/// Zero-based cell position, ordered row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Zero-based position, or `None` past the worksheet limits.
    pub fn checked(row: u32, col: u32) -> Option<Self> {
        (row < MAX_ROWS && col < MAX_COLS).then(|| Self::new(row, col))
    }

    /// Parse an A1-style reference such as `B7` or `$AA$10`.
    ///
    /// References past `XFD1048576` are rejected.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.replace('$', "");
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            col = col.checked_mul(26)?.checked_add(digit)?;
        }

        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }

        Self::checked(row - 1, col - 1)
    }
}

/// One tab of a workbook: a sparse grid of non-empty cells.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<CellRef, CellValue>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Store a cell value. Empty values are not stored.
    pub fn set(&mut self, at: CellRef, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&at);
        } else {
            self.cells.insert(at, value);
        }
    }

    /// Get a cell value.
    pub fn get(&self, at: CellRef) -> Option<&CellValue> {
        self.cells.get(&at)
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Top-left and bottom-right corners of the used range.
    pub fn used_range(&self) -> Option<(CellRef, CellRef)> {
        let first_row = self.cells.keys().next()?.row;
        let last_row = self.cells.keys().next_back()?.row;
        let first_col = self.cells.keys().map(|c| c.col).min()?;
        let last_col = self.cells.keys().map(|c| c.col).max()?;
        Some((
            CellRef::new(first_row, first_col),
            CellRef::new(last_row, last_col),
        ))
    }

    /// Array-of-arrays view of the used range.
    ///
    /// Blank rows inside the range are kept as empty rows; gaps inside a row
    /// are [`CellValue::Empty`]; trailing gaps are trimmed.
    pub fn rows(&self) -> RawSheet {
        let Some((start, end)) = self.used_range() else {
            return Vec::new();
        };

        let mut rows: RawSheet = vec![Vec::new(); (end.row - start.row + 1) as usize];
        for (at, value) in &self.cells {
            let row = &mut rows[(at.row - start.row) as usize];
            let col = (at.col - start.col) as usize;
            if row.len() <= col {
                row.resize(col + 1, CellValue::Empty);
            }
            row[col] = value.clone();
        }
        rows
    }
}

/// A parsed workbook: sheet names in tab order plus the sheets by name.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheet_names: Vec<String>,
    pub sheets: HashMap<String, Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet, keeping tab order.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheet_names.push(sheet.name.clone());
        self.sheets.insert(sheet.name.clone(), sheet);
    }

    /// The first sheet by position.
    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheet_names
            .first()
            .and_then(|name| self.sheets.get(name))
    }
}

/// A spreadsheet decoding library.
///
/// Implementations must be shareable across threads so that a single
/// registered instance can serve every upload attempt.
pub trait SpreadsheetLibrary: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Decode a workbook from the full bytes of a file.
    fn read_workbook(&self, data: &[u8], hint: ReadHint) -> Result<Workbook>;

    /// Convert a sheet to JSON rows in the requested layout.
    ///
    /// The output is intentionally loose; callers narrow it with
    /// [`adapter::narrow_rows`](crate::adapter::narrow_rows).
    fn sheet_to_json(&self, sheet: &Sheet, mode: HeaderMode) -> Result<serde_json::Value>;
}
