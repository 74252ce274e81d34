//! JSON renderer implementation.

use crate::error::{Error, Result};

use super::options::JsonFormat;
use super::view::View;

/// Convert a view to JSON.
///
/// The `view` field names the variant; table rows are objects keyed by header.
pub fn to_json(view: &View, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(view),
        JsonFormat::Pretty => serde_json::to_string_pretty(view),
    };
    json.map_err(|e| Error::InvalidData(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    #[test]
    fn test_to_json_compact() {
        let view = View::Table {
            headers: vec!["Name".to_string(), "Age".to_string()],
            rows: vec![[
                ("Name", CellValue::text("Alice")),
                ("Age", CellValue::Number(30.0)),
            ]
            .into_iter()
            .collect()],
        };

        let json = to_json(&view, JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"{"view":"table","headers":["Name","Age"],"rows":[{"Name":"Alice","Age":30.0}]}"#
        );
    }

    #[test]
    fn test_to_json_pretty_error() {
        let view = View::Error {
            message: "No file selected.".to_string(),
        };
        let json = to_json(&view, JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"view\": \"error\""));
        assert!(json.contains("\"message\": \"No file selected.\""));
    }

    #[test]
    fn test_idle() {
        assert_eq!(to_json(&View::Idle, JsonFormat::Compact).unwrap(), r#"{"view":"idle"}"#);
    }
}
