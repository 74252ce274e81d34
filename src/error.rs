//! Error types for the sheetview library.
//!
//! The first six variants are the user-facing error kinds of an upload
//! attempt; their `Display` output is the message shown to the user. The rest
//! are raised inside the bundled spreadsheet library and end up wrapped in
//! [`Error::Parse`] once they cross the shaping boundary.

use std::io;
use thiserror::Error;

/// Result type alias for sheetview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, reading, or shaping a spreadsheet.
#[derive(Error, Debug)]
pub enum Error {
    /// The spreadsheet library could not be fetched or initialised.
    #[error("Failed to load the Excel parsing library: {0}")]
    LibraryLoad(String),

    /// An upload was triggered with an empty selection.
    #[error("No file selected.")]
    NoFileSelected,

    /// The selected file could not be read.
    #[error("Error reading file: {0}")]
    FileRead(String),

    /// Parsing was attempted before the library was registered.
    #[error("Excel parsing library is not loaded.")]
    LibraryNotLoaded,

    /// The first sheet produced zero rows.
    #[error("The Excel sheet is empty or could not be parsed.")]
    EmptySheet,

    /// Any other failure while reading the workbook or shaping rows.
    #[error("Error parsing file: {0}")]
    Parse(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed data in the workbook.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required workbook part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),
}

impl Error {
    /// Wrap an error in [`Error::Parse`], leaving errors that are already
    /// user-facing untouched.
    pub fn into_parse_error(self) -> Self {
        match self {
            Error::LibraryLoad(_)
            | Error::NoFileSelected
            | Error::FileRead(_)
            | Error::LibraryNotLoaded
            | Error::EmptySheet
            | Error::Parse(_) => self,
            other => Error::Parse(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NoFileSelected.to_string(), "No file selected.");
        assert_eq!(
            Error::EmptySheet.to_string(),
            "The Excel sheet is empty or could not be parsed."
        );

        let err = Error::Parse("bad zip".to_string());
        assert_eq!(err.to_string(), "Error parsing file: bad zip");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_into_parse_error() {
        let err = Error::XmlParse("unexpected eof".to_string()).into_parse_error();
        assert_eq!(
            err.to_string(),
            "Error parsing file: XML parse error: unexpected eof"
        );

        let err = Error::EmptySheet.into_parse_error();
        assert!(matches!(err, Error::EmptySheet));
    }
}
