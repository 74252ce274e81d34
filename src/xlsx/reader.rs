//! Bundled OOXML workbook reader.

use crate::container::WorkbookContainer;
use crate::detect::{detect_format_from_bytes, SpreadsheetFormat};
use crate::error::{Error, Result};
use crate::library::{
    CellRef, HeaderMode, ReadHint, Sheet, SpreadsheetLibrary, Workbook, MAX_ROWS,
};
use crate::model::CellValue;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use super::shared_strings::SharedStrings;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Sheet entry from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// Spreadsheet library for Office Open XML (`.xlsx`/`.xlsm`) workbooks.
///
/// Legacy `.xls` input is recognised but rejected with
/// [`Error::UnsupportedFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OoxmlLibrary;

impl OoxmlLibrary {
    pub fn new() -> Self {
        Self
    }

    fn read_xlsx(&self, data: &[u8]) -> Result<Workbook> {
        let container = WorkbookContainer::from_bytes(data.to_vec())?;

        if !container.exists(WORKBOOK_PART) {
            return Err(Error::MissingComponent(WORKBOOK_PART.to_string()));
        }

        let shared_strings = if container.exists(SHARED_STRINGS_PART) {
            SharedStrings::parse(&container.read_xml(SHARED_STRINGS_PART)?)?
        } else {
            SharedStrings::default()
        };

        let relationships = parse_workbook_rels(&container)?;
        let sheets = parse_workbook(&container.read_xml(WORKBOOK_PART)?)?;

        let mut workbook = Workbook::new();
        for info in sheets {
            let mut sheet = Sheet::new(&info.name);

            match relationships.get(&info.rel_id) {
                Some(target) => {
                    let path = WorkbookContainer::resolve_path(WORKBOOK_PART, target);
                    if container.exists(&path) {
                        parse_sheet(&container.read_xml(&path)?, &shared_strings, &mut sheet)?;
                    } else {
                        debug!(sheet = %info.name, part = %path, "worksheet part missing");
                    }
                }
                None => {
                    debug!(sheet = %info.name, rel_id = %info.rel_id, "sheet has no relationship")
                }
            }

            workbook.add_sheet(sheet);
        }

        debug!(sheets = workbook.sheet_names.len(), "workbook read");
        Ok(workbook)
    }
}

impl SpreadsheetLibrary for OoxmlLibrary {
    fn name(&self) -> &str {
        "ooxml"
    }

    fn read_workbook(&self, data: &[u8], hint: ReadHint) -> Result<Workbook> {
        let format = match hint {
            ReadHint::Sniff => detect_format_from_bytes(data)?,
            ReadHint::Xlsx => SpreadsheetFormat::Xlsx,
            ReadHint::Xls => SpreadsheetFormat::Xls,
        };

        match format {
            SpreadsheetFormat::Xlsx => self.read_xlsx(data),
            SpreadsheetFormat::Xls => Err(Error::UnsupportedFormat(
                "legacy .xls (BIFF) workbooks".to_string(),
            )),
        }
    }

    fn sheet_to_json(&self, sheet: &Sheet, mode: HeaderMode) -> Result<Value> {
        let rows = sheet.rows();

        let value = match mode {
            HeaderMode::Array => Value::Array(
                rows.iter()
                    .map(|row| Value::Array(row.iter().map(cell_to_json).collect()))
                    .collect(),
            ),
            HeaderMode::FirstRow => {
                let Some((header, data)) = rows.split_first() else {
                    return Ok(Value::Array(Vec::new()));
                };
                let keys: Vec<String> = header.iter().map(|c| c.to_string()).collect();

                Value::Array(
                    data.iter()
                        .map(|row| {
                            let mut object = Map::new();
                            for (key, cell) in keys.iter().zip(row) {
                                if !cell.is_empty() {
                                    object.insert(key.clone(), cell_to_json(cell));
                                }
                            }
                            Value::Object(object)
                        })
                        .collect(),
                )
            }
        };

        Ok(value)
    }
}

fn cell_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        CellValue::Text(s) => Value::String(s.clone()),
    }
}

fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

/// Parse workbook relationships: relationship id -> target.
fn parse_workbook_rels(container: &WorkbookContainer) -> Result<HashMap<String, String>> {
    let mut rels = HashMap::new();

    if !container.exists(WORKBOOK_RELS_PART) {
        return Ok(rels);
    }

    let xml = container.read_xml(WORKBOOK_RELS_PART)?;
    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"Relationship" {
                    if let (Some(id), Some(target)) =
                        (attr_string(&e, b"Id"), attr_string(&e, b"Target"))
                    {
                        rels.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Parse workbook.xml for sheet entries in tab order.
fn parse_workbook(xml: &str) -> Result<Vec<SheetInfo>> {
    let mut sheets = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"sheet" {
                    if let Some(name) = attr_string(&e, b"name") {
                        sheets.push(SheetInfo {
                            name,
                            rel_id: attr_string(&e, b"r:id").unwrap_or_default(),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Position and type of the `<c>` element being read.
struct PendingCell {
    at: CellRef,
    cell_type: Option<String>,
    value: String,
}

/// Parse a worksheet part into `sheet`.
///
/// Cells without an `r` attribute take the column after the previous cell;
/// rows without one take the row after the previous row. Positions past the
/// worksheet limits are [`Error::InvalidData`].
fn parse_sheet(xml: &str, shared_strings: &SharedStrings, sheet: &mut Sheet) -> Result<()> {
    let mut reader = quick_xml::Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut next_row: u32 = 0;
    let mut current_row: u32 = 0;
    let mut next_col: u32 = 0;
    let mut pending: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"row" => {
                    current_row = row_position(e, next_row)?;
                    next_row = current_row + 1;
                    next_col = 0;
                }
                b"c" => {
                    let at = cell_position(e, current_row, next_col)?;
                    next_col = at.col + 1;
                    pending = Some(PendingCell {
                        at,
                        cell_type: attr_string(e, b"t"),
                        value: String::new(),
                    });
                }
                b"rPh" => in_phonetic = true,
                b"v" | b"t" if pending.is_some() && !in_phonetic => in_value = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"row" => {
                    current_row = row_position(e, next_row)?;
                    next_row = current_row + 1;
                }
                b"c" => {
                    // Styled but valueless cell
                    let at = cell_position(e, current_row, next_col)?;
                    next_col = at.col + 1;
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                if in_value {
                    if let Some(cell) = pending.as_mut() {
                        let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                        cell.value.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"c" => {
                    if let Some(cell) = pending.take() {
                        let value = resolve_cell_value(
                            &cell.value,
                            cell.cell_type.as_deref(),
                            shared_strings,
                        );
                        sheet.set(cell.at, value);
                    }
                }
                b"v" | b"t" => in_value = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Zero-based index of a `<row>`, from its `r` attribute or `next_row`.
fn row_position(e: &BytesStart<'_>, next_row: u32) -> Result<u32> {
    match attr_string(e, b"r") {
        Some(r) => r
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|&index| index < MAX_ROWS)
            .ok_or_else(|| Error::InvalidData(format!("row number {:?} is out of range", r))),
        None if next_row < MAX_ROWS => Ok(next_row),
        None => Err(Error::InvalidData(format!(
            "worksheet has more than {} rows",
            MAX_ROWS
        ))),
    }
}

/// Position of a `<c>`, from its `r` attribute or the next free column.
fn cell_position(e: &BytesStart<'_>, row: u32, next_col: u32) -> Result<CellRef> {
    match attr_string(e, b"r") {
        Some(r) => CellRef::parse(&r).ok_or_else(|| {
            Error::InvalidData(format!("cell reference {:?} is invalid or out of range", r))
        }),
        None => CellRef::checked(row, next_col).ok_or_else(|| {
            Error::InvalidData(format!("row {} has too many columns", row + 1))
        }),
    }
}

/// Resolve a raw `<v>` payload according to the cell type attribute.
fn resolve_cell_value(
    raw: &str,
    cell_type: Option<&str>,
    shared_strings: &SharedStrings,
) -> CellValue {
    match cell_type {
        Some("s") => match raw.trim().parse::<usize>() {
            Ok(idx) => CellValue::text(shared_strings.get(idx).unwrap_or("")),
            Err(_) => CellValue::text(raw),
        },
        Some("b") => CellValue::Bool(raw.trim() == "1"),
        // Error cells carry their display text (#DIV/0!, #N/A, ...)
        Some("e") | Some("str") | Some("inlineStr") | Some("d") => {
            if raw.is_empty() {
                CellValue::Empty
            } else {
                CellValue::text(raw)
            }
        }
        _ => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                match trimmed.parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::text(raw),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(strings: &[&str]) -> SharedStrings {
        let body: String = strings
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", s))
            .collect();
        SharedStrings::parse(&format!("<sst>{}</sst>", body)).unwrap()
    }

    #[test]
    fn test_resolve_cell_value() {
        let ss = shared(&["Name"]);
        assert_eq!(resolve_cell_value("0", Some("s"), &ss), CellValue::text("Name"));
        assert_eq!(resolve_cell_value("7", Some("s"), &ss), CellValue::text(""));
        assert_eq!(resolve_cell_value("1", Some("b"), &ss), CellValue::Bool(true));
        assert_eq!(resolve_cell_value("42", None, &ss), CellValue::Number(42.0));
        assert_eq!(resolve_cell_value("1.5", Some("n"), &ss), CellValue::Number(1.5));
        assert_eq!(resolve_cell_value("#N/A", Some("e"), &ss), CellValue::text("#N/A"));
        assert_eq!(resolve_cell_value("", None, &ss), CellValue::Empty);
    }

    #[test]
    fn test_parse_sheet_positions() {
        let xml = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1" t="inlineStr"><is><t>Age</t></is></c></row>
<row r="3"><c r="A3" t="str"><v>Bob</v></c><c s="2"/><c><v>30</v></c></row>
</sheetData></worksheet>"#;

        let mut sheet = Sheet::new("Sheet1");
        parse_sheet(xml, &shared(&["Name"]), &mut sheet).unwrap();

        assert_eq!(sheet.get(CellRef::new(0, 0)), Some(&CellValue::text("Name")));
        assert_eq!(sheet.get(CellRef::new(0, 2)), Some(&CellValue::text("Age")));
        assert_eq!(sheet.get(CellRef::new(2, 0)), Some(&CellValue::text("Bob")));
        assert_eq!(sheet.get(CellRef::new(2, 1)), None);
        assert_eq!(sheet.get(CellRef::new(2, 2)), Some(&CellValue::Number(30.0)));
    }

    #[test]
    fn test_parse_sheet_implicit_positions() {
        let xml = r#"<worksheet><sheetData>
<row><c t="str"><v>Name</v></c><c t="str"><v>Age</v></c></row>
<row><c t="str"><v>Alice</v></c><c><v>30</v></c></row>
<row r="5"><c t="str"><v>Bob</v></c></row>
<row><c/><c><v>7</v></c></row>
</sheetData></worksheet>"#;

        let mut sheet = Sheet::new("Sheet1");
        parse_sheet(xml, &SharedStrings::default(), &mut sheet).unwrap();

        assert_eq!(sheet.get(CellRef::new(1, 1)), Some(&CellValue::Number(30.0)));
        assert_eq!(sheet.get(CellRef::new(4, 0)), Some(&CellValue::text("Bob")));
        assert_eq!(sheet.get(CellRef::new(5, 1)), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn test_row_number_overflow_is_invalid_data() {
        let xml = r#"<worksheet><sheetData>
<row r="4294967295"><c t="str"><v>a</v></c></row>
<row><c t="str"><v>b</v></c></row>
</sheetData></worksheet>"#;

        let mut sheet = Sheet::new("Sheet1");
        let err = parse_sheet(xml, &SharedStrings::default(), &mut sheet).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_positions_past_limits_are_rejected() {
        let cases = [
            r#"<row r="1048576"><c t="str"><v>x</v></c></row><row><c/></row>"#,
            r#"<row r="1"><c r="ZZZZZZ1"><v>1</v></c></row>"#,
            r#"<row r="1"><c r="A3000000000"><v>1</v></c></row>"#,
            r#"<row r="1"><c r="XFD1"><v>1</v></c><c><v>2</v></c></row>"#,
        ];

        for rows in cases {
            let xml = format!("<worksheet><sheetData>{}</sheetData></worksheet>", rows);
            let mut sheet = Sheet::new("Sheet1");
            let result = parse_sheet(&xml, &SharedStrings::default(), &mut sheet);
            assert!(matches!(result, Err(Error::InvalidData(_))), "{}", rows);
        }
    }

    #[test]
    fn test_last_cell_within_limits() {
        let xml = r#"<worksheet><sheetData>
<row r="1048576"><c r="XFD1048576"><v>1</v></c></row>
</sheetData></worksheet>"#;

        let mut sheet = Sheet::new("Sheet1");
        parse_sheet(xml, &SharedStrings::default(), &mut sheet).unwrap();
        assert_eq!(sheet.cell_count(), 1);
    }

    #[test]
    fn test_parse_workbook_sheet_order() {
        let xml = r#"<workbook><sheets>
<sheet name="Second &amp; more" sheetId="2" r:id="rId2"/>
<sheet name="First" sheetId="1" r:id="rId1"/>
</sheets></workbook>"#;

        let sheets = parse_workbook(xml).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Second & more");
        assert_eq!(sheets[0].rel_id, "rId2");
        assert_eq!(sheets[1].name, "First");
    }

    #[test]
    fn test_sheet_to_json_modes() {
        let mut sheet = Sheet::new("S");
        sheet.set(CellRef::new(0, 0), CellValue::text("Name"));
        sheet.set(CellRef::new(0, 1), CellValue::text("Age"));
        sheet.set(CellRef::new(1, 0), CellValue::text("Alice"));
        sheet.set(CellRef::new(1, 1), CellValue::Number(30.0));
        sheet.set(CellRef::new(2, 0), CellValue::text("Bob"));

        let library = OoxmlLibrary::new();
        let array = library.sheet_to_json(&sheet, HeaderMode::Array).unwrap();
        assert_eq!(
            array,
            serde_json::json!([["Name", "Age"], ["Alice", 30.0], ["Bob"]])
        );

        let objects = library.sheet_to_json(&sheet, HeaderMode::FirstRow).unwrap();
        assert_eq!(
            objects,
            serde_json::json!([{"Name": "Alice", "Age": 30.0}, {"Name": "Bob"}])
        );
    }

    #[test]
    fn test_xls_is_unsupported() {
        let library = OoxmlLibrary::new();
        let result = library.read_workbook(&[0u8; 16], ReadHint::Xls);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
