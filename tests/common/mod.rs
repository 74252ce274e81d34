//! Synthetic `.xlsx` workbooks for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A cell in a fixture sheet.
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Str(&'a str),
    Num(f64),
    Bool(bool),
    Blank,
}

pub use Cell::{Blank, Bool, Num, Str};

/// Turn a grid of string literals into fixture cells.
pub fn strings<'a>(rows: &[&[&'a str]]) -> Vec<Vec<Cell<'a>>> {
    rows.iter()
        .map(|row| row.iter().map(|s| Cell::Str(*s)).collect())
        .collect()
}

fn column_name(mut col: usize) -> String {
    let mut name = String::new();
    loop {
        name.insert(0, (b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Build a workbook with the given sheets, in tab order.
pub fn build_xlsx(sheets: &[(&str, Vec<Vec<Cell<'_>>>)]) -> Vec<u8> {
    let mut shared: Vec<String> = Vec::new();
    let mut sheet_xml = Vec::new();

    for (_, rows) in sheets {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, cell) in row.iter().enumerate() {
                let at = format!("{}{}", column_name(c), r + 1);
                match cell {
                    Cell::Str(s) => {
                        let idx = match shared.iter().position(|x| x.as_str() == *s) {
                            Some(idx) => idx,
                            None => {
                                shared.push(s.to_string());
                                shared.len() - 1
                            }
                        };
                        xml.push_str(&format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, at, idx));
                    }
                    Cell::Num(n) => xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, at, n)),
                    Cell::Bool(b) => xml.push_str(&format!(
                        r#"<c r="{}" t="b"><v>{}</v></c>"#,
                        at,
                        if *b { 1 } else { 0 }
                    )),
                    Cell::Blank => {}
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        sheet_xml.push(xml);
    }

    let names: Vec<&str> = sheets.iter().map(|(name, _)| *name).collect();
    package(&names, &sheet_xml, &shared)
}

/// Build a single-sheet workbook around hand-written `<sheetData>` content.
///
/// Cells must carry their own values (`t="str"` or numbers); the shared
/// strings table is empty.
pub fn build_xlsx_with_sheet_data(sheet_data: &str) -> Vec<u8> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        sheet_data
    );
    package(&["Sheet1"], &[xml], &[])
}

fn package(names: &[&str], sheet_xml: &[String], shared: &[String]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for (i, name) in names.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name),
            n,
            n
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }
    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut sst = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    for s in shared {
        sst.push_str(&format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(s)));
    }
    sst.push_str("</sst>");

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let part = |zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, body: &str| {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };

    part(&mut zip, "[Content_Types].xml", &content_types);
    part(&mut zip, "xl/workbook.xml", &workbook);
    part(&mut zip, "xl/_rels/workbook.xml.rels", &rels);
    part(&mut zip, "xl/sharedStrings.xml", &sst);
    for (i, xml) in sheet_xml.iter().enumerate() {
        part(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), xml);
    }

    zip.finish().unwrap().into_inner()
}
