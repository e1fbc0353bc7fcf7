//! Minimal `.xlsx` writer shared by the unit and integration tests.
//!
//! Only depends on external crates so it can be compiled both inside the
//! library and as part of the integration test crates.
use quick_xml::escape::escape;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const MAIN_NAMESPACE: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Builder for a workbook of inline-string and numeric cells.
#[derive(Default)]
pub struct Workbook {
    sheets: Vec<(String, String)>,
    shared_strings: Option<Vec<String>>,
}

/// A workbook written to its own temporary directory, removed on drop.
pub struct WorkbookFile {
    _dir: TempDir,
    path: PathBuf,
}

impl WorkbookFile {
    pub fn path(&self) -> &str {
        self.path.to_str().unwrap_or_default()
    }
}

fn column_name(col: usize) -> String {
    let mut letters = Vec::new();
    let mut rest = col + 1;
    while rest > 0 {
        rest -= 1;
        letters.push(b'A' + (rest % 26) as u8);
        rest /= 26;
    }
    letters.iter().rev().map(|&letter| letter as char).collect()
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores text cells in the shared string table instead of inline.
    pub fn shared_strings(mut self) -> Self {
        self.shared_strings = Some(Vec::new());
        self
    }

    /// Adds a sheet. Numeric text becomes a number cell, `None` leaves the
    /// cell out and a row without cells is not written at all.
    pub fn sheet(mut self, name: &str, rows: &[&[Option<&str>]]) -> Self {
        let mut xml = String::new();
        for (row, cells) in rows.iter().enumerate() {
            if cells.iter().all(Option::is_none) {
                continue;
            }
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
            for (col, cell) in cells.iter().enumerate() {
                let Some(value) = cell else { continue };
                let reference = format!("{}{}", column_name(col), row + 1);
                if value.parse::<f64>().is_ok() {
                    xml.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
                } else if let Some(shared_strings) = self.shared_strings.as_mut() {
                    shared_strings.push(value.to_string());
                    let index = shared_strings.len() - 1;
                    xml.push_str(&format!(r#"<c r="{reference}" t="s"><v>{index}</v></c>"#));
                } else {
                    xml.push_str(&format!(r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#, escape(*value)));
                }
            }
            xml.push_str("</row>");
        }
        self.sheets.push((name.to_owned(), xml));
        self
    }

    /// Adds a sheet from literal `<row>` elements.
    pub fn raw_sheet(mut self, name: &str, rows: &str) -> Self {
        self.sheets.push((name.to_owned(), rows.to_owned()));
        self
    }

    /// Writes the workbook as `workbook.xlsx` in a fresh temporary directory.
    pub fn write(self) -> ZipResult<WorkbookFile> {
        let dir = tempfile::tempdir()?;
        let path = self.write_to(dir.path(), "workbook.xlsx")?;
        Ok(WorkbookFile { _dir: dir, path })
    }

    /// Writes the workbook as `dir/file_name` and returns its path.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> ZipResult<PathBuf> {
        let path = dir.join(file_name);
        let mut zip = ZipWriter::new(File::create(&path)?);

        let mut workbook = format!(
            r#"{XML_DECLARATION}<workbook xmlns="{MAIN_NAMESPACE}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#
        );
        let mut relationships = format!(
            r#"{XML_DECLARATION}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
        );
        for (index, (name, rows)) in self.sheets.iter().enumerate() {
            let id = index + 1;
            workbook.push_str(&format!(r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#, escape(name.as_str())));
            relationships.push_str(&format!(
                r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#
            ));
            zip.start_file(format!("xl/worksheets/sheet{id}.xml"), SimpleFileOptions::default())?;
            zip.write_all(
                format!(r#"{XML_DECLARATION}<worksheet xmlns="{MAIN_NAMESPACE}"><sheetData>{rows}</sheetData></worksheet>"#)
                    .as_bytes(),
            )?;
        }
        workbook.push_str("</sheets></workbook>");
        relationships.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", SimpleFileOptions::default())?;
        zip.write_all(workbook.as_bytes())?;
        zip.start_file("xl/_rels/workbook.xml.rels", SimpleFileOptions::default())?;
        zip.write_all(relationships.as_bytes())?;

        if let Some(shared_strings) = &self.shared_strings {
            let items = shared_strings
                .iter()
                .map(|text| format!("<si><t>{}</t></si>", escape(text.as_str())))
                .collect::<String>();
            zip.start_file("xl/sharedStrings.xml", SimpleFileOptions::default())?;
            zip.write_all(format!(r#"{XML_DECLARATION}<sst xmlns="{MAIN_NAMESPACE}">{items}</sst>"#).as_bytes())?;
        }
        zip.finish()?;
        Ok(path)
    }
}
