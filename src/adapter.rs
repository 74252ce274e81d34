//! Narrowing of the library's loosely-typed output.
//!
//! [`SpreadsheetLibrary::sheet_to_json`](crate::library::SpreadsheetLibrary::sheet_to_json)
//! returns arbitrary JSON. Everything past this point works on [`RawSheet`],
//! so the shape is checked once here.

use crate::error::{Error, Result};
use crate::model::{CellValue, RawSheet};
use serde_json::Value;

/// Convert array-of-arrays JSON into a [`RawSheet`].
///
/// The outer value must be an array whose elements are arrays (or `null`,
/// treated as a blank row) of scalars. Nested arrays or objects inside a row
/// are rejected.
pub fn narrow_rows(value: Value) -> Result<RawSheet> {
    let rows = match value {
        Value::Array(rows) => rows,
        other => {
            return Err(Error::InvalidData(format!(
                "expected an array of rows, got {}",
                json_kind(&other)
            )))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Array(cells) => cells
                .into_iter()
                .enumerate()
                .map(|(col, cell)| {
                    narrow_cell(cell).ok_or_else(|| {
                        Error::InvalidData(format!(
                            "row {} column {} is not a scalar value",
                            index + 1,
                            col + 1
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>(),
            Value::Null => Ok(Vec::new()),
            other => Err(Error::InvalidData(format!(
                "row {} is {}, expected an array",
                index + 1,
                json_kind(&other)
            ))),
        })
        .collect()
}

/// Convert a single JSON scalar into a [`CellValue`].
pub fn narrow_cell(value: Value) -> Option<CellValue> {
    match value {
        Value::Null => Some(CellValue::Empty),
        Value::Bool(b) => Some(CellValue::Bool(b)),
        Value::Number(n) => n.as_f64().map(CellValue::Number),
        Value::String(s) => Some(CellValue::Text(s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
