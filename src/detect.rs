//! Format detection for spreadsheet files.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::io::{Cursor, Read};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Compound File Binary magic bytes used by legacy `.xls` workbooks.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Macro-enabled workbooks share the same sheet layout.
const XLSM_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

/// File extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Detected spreadsheet format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Office Open XML workbook (.xlsx)
    Xlsx,
    /// Legacy BIFF workbook (.xls)
    Xls,
}

impl SpreadsheetFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xlsx => "xlsx",
            SpreadsheetFormat::Xls => "xls",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            SpreadsheetFormat::Xlsx => "Excel Workbook",
            SpreadsheetFormat::Xls => "Excel 97-2003 Workbook",
        }
    }
}

impl std::fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Check whether a file name carries one of the accepted extensions.
///
/// The comparison is case-insensitive. This is advisory only: a selection
/// with another extension is still read and handed to the library.
pub fn is_accepted_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// Detect the spreadsheet format from a byte slice.
///
/// # Example
///
/// ```no_run
/// use sheetview::detect::detect_format_from_bytes;
///
/// let data = std::fs::read("data.xlsx")?;
/// let format = detect_format_from_bytes(&data)?;
/// # Ok::<(), sheetview::Error>(())
/// ```
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SpreadsheetFormat> {
    if is_cfb_file(data) {
        return Ok(SpreadsheetFormat::Xls);
    }

    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()));
        }
    };

    if content_types.contains(XLSX_CONTENT_TYPE) || content_types.contains(XLSM_CONTENT_TYPE) {
        return Ok(SpreadsheetFormat::Xlsx);
    }

    // Fallback: a workbook part without a matching content type
    if archive.file_names().any(|n| n == "xl/workbook.xml") {
        Ok(SpreadsheetFormat::Xlsx)
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Check if data starts with the Compound File Binary signature.
pub fn is_cfb_file(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == CFB_MAGIC
}
