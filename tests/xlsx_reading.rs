//! Reading synthetic workbooks end to end with the bundled library.

mod common;

use common::{build_xlsx, build_xlsx_with_sheet_data, strings, Blank, Bool, Num, Str};
use sheetview::library::{HeaderMode, ReadHint, SpreadsheetLibrary};
use sheetview::xlsx::OoxmlLibrary;
use sheetview::{parse_bytes, CellValue, Error};

#[test]
fn test_people_sheet() {
    let data = build_xlsx(&[(
        "People",
        strings(&[&["Name", "Age"], &["Alice", "30"], &["Bob", ""]]),
    )]);

    let shaped = parse_bytes(&data).unwrap();
    assert_eq!(shaped.headers, vec!["Name", "Age"]);
    assert_eq!(shaped.records.len(), 2);
    assert_eq!(shaped.records[0].get("Name"), Some(&CellValue::text("Alice")));
    assert_eq!(shaped.records[0].get("Age"), Some(&CellValue::text("30")));
    assert_eq!(shaped.records[1].get("Name"), Some(&CellValue::text("Bob")));
    assert_eq!(shaped.records[1].get("Age"), Some(&CellValue::text("")));
}

#[test]
fn test_typed_cells() {
    let data = build_xlsx(&[(
        "Typed",
        vec![
            vec![Str("Item"), Str("Qty"), Str("Paid"), Str("Note")],
            vec![Str("Pen"), Num(3.0), Bool(true)],
            vec![Str("Ink"), Blank, Bool(false), Str("refill")],
        ],
    )]);

    let shaped = parse_bytes(&data).unwrap();
    let pen = &shaped.records[0];
    assert_eq!(pen.get("Qty"), Some(&CellValue::Number(3.0)));
    assert_eq!(pen.get("Paid"), Some(&CellValue::Bool(true)));
    assert_eq!(pen.get("Note"), Some(&CellValue::Empty));

    let ink = &shaped.records[1];
    assert_eq!(ink.get("Qty"), Some(&CellValue::Empty));
    assert_eq!(ink.display("Note"), "refill");
}

#[test]
fn test_only_first_sheet_is_used() {
    let data = build_xlsx(&[
        ("Summary", strings(&[&["Total"], &["42"]])),
        ("Detail", strings(&[&["Line", "Amount"], &["1", "40"]])),
    ]);

    let shaped = parse_bytes(&data).unwrap();
    assert_eq!(shaped.headers, vec!["Total"]);
    assert_eq!(shaped.records.len(), 1);
}

#[test]
fn test_empty_first_sheet() {
    let data = build_xlsx(&[("Blank", Vec::new()), ("Data", strings(&[&["A"], &["1"]]))]);

    let err = parse_bytes(&data).unwrap_err();
    assert!(matches!(err, Error::EmptySheet));
    assert_eq!(
        err.to_string(),
        "The Excel sheet is empty or could not be parsed."
    );
}

#[test]
fn test_workbook_sheet_names() {
    let data = build_xlsx(&[
        ("R&D", strings(&[&["x"]])),
        ("Sales", strings(&[&["y"]])),
    ]);

    let library = OoxmlLibrary::new();
    let workbook = library.read_workbook(&data, ReadHint::Sniff).unwrap();
    assert_eq!(workbook.sheet_names, vec!["R&D", "Sales"]);

    let sheet = workbook.first_sheet().unwrap();
    let rows = library.sheet_to_json(sheet, HeaderMode::Array).unwrap();
    assert_eq!(rows, serde_json::json!([["x"]]));
}

#[test]
fn test_corrupt_bytes() {
    let mut data = build_xlsx(&[("S", strings(&[&["A"]]))]);
    data.truncate(data.len() / 2);

    let err = parse_bytes(&data).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().starts_with("Error parsing file:"));
}

#[test]
fn test_parse_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.xlsx");
    std::fs::write(&path, build_xlsx(&[("P", strings(&[&["Name"], &["Ann"]]))])).unwrap();

    let shaped = sheetview::parse_file(&path).unwrap();
    assert_eq!(shaped.records[0].display("Name"), "Ann");

    let missing = sheetview::parse_file(dir.path().join("nope.xlsx")).unwrap_err();
    assert!(matches!(missing, Error::FileRead(_)));
}

#[test]
fn test_rows_and_cells_without_references() {
    let data = build_xlsx_with_sheet_data(
        r#"<row><c t="str"><v>Name</v></c><c t="str"><v>Age</v></c></row>
<row><c t="str"><v>Alice</v></c><c><v>30</v></c></row>
<row r="4"><c/><c><v>41</v></c></row>
<row><c t="str"><v>Cy</v></c></row>"#,
    );

    let shaped = parse_bytes(&data).unwrap();
    assert_eq!(shaped.headers, vec!["Name", "Age"]);
    // Row 3 is blank and stays in place
    assert_eq!(shaped.records.len(), 4);
    assert_eq!(shaped.records[0].display("Name"), "Alice");
    assert_eq!(shaped.records[0].get("Age"), Some(&CellValue::Number(30.0)));
    assert_eq!(shaped.records[1].get("Name"), Some(&CellValue::Empty));
    assert_eq!(shaped.records[2].get("Name"), Some(&CellValue::Empty));
    assert_eq!(shaped.records[2].display("Age"), "41");
    assert_eq!(shaped.records[3].display("Name"), "Cy");
}

#[test]
fn test_out_of_range_positions_are_parse_errors() {
    let overflowing = build_xlsx_with_sheet_data(
        r#"<row r="4294967295"><c t="str"><v>a</v></c></row><row><c t="str"><v>b</v></c></row>"#,
    );
    let err = parse_bytes(&overflowing).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert!(err.to_string().starts_with("Error parsing file: Invalid data:"));

    let far_apart = build_xlsx_with_sheet_data(
        r#"<row r="1"><c r="A1"><v>1</v></c><c r="ZZZZZZ1"><v>2</v></c></row>"#,
    );
    assert!(matches!(parse_bytes(&far_apart), Err(Error::Parse(_))));
}
