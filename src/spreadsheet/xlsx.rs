use crate::error::HousingEtlError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::Package;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use glob::Pattern;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

// SpreadsheetML element names, compared without namespace prefix
const WORKBOOK_PROPERTIES: &[u8] = b"workbookPr";
const SHEET: &[u8] = b"sheet";
const NUMBER_FORMATS: &[u8] = b"numFmts";
const NUMBER_FORMAT: &[u8] = b"numFmt";
const CELL_FORMATS: &[u8] = b"cellXfs";
const CELL_FORMAT: &[u8] = b"xf";
const STRING_ITEM: &[u8] = b"si";
const PHONETIC_RUN: &[u8] = b"rPh";
const TEXT: &[u8] = b"t";
const ROW: &[u8] = b"row";
const CELL: &[u8] = b"c";
const INLINE_STRING: &[u8] = b"is";
const VALUE: &[u8] = b"v";

/// An open `.xlsx` or `.xlsm` workbook.
pub(crate) struct XlsxSpreadsheet {
    zip: Package,
    /// Cell type per style index (`s` attribute of a cell)
    styles: Vec<CellType>,
    /// `(sheet name, part path)` in workbook order
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    /// Opens the package and reads the sheet list and the cell styles.
    pub(crate) fn open(file_name: &str) -> Result<XlsxSpreadsheet, HousingEtlError> {
        let mut zip = excel::open_package(file_name)?;
        let (sheets, is_1904) = read_workbook(&mut zip)?;
        if sheets.is_empty() {
            return Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()).into());
        }
        let styles = read_styles(&mut zip, is_1904)?;
        debug!(file_name, sheets = sheets.len(), styles = styles.len(), "opened workbook");
        Ok(XlsxSpreadsheet { zip, styles, sheets })
    }

    fn read_worksheet(&mut self, name: &str, path: &str) -> Result<Sheet, HousingEtlError> {
        let mut reader = self
            .zip
            .xml_reader(path)?
            .ok_or_else(|| SpreadsheetError::FileError(path.to_owned()))?;
        let mut sheet = Sheet::new(name);
        // Fallback position for rows and cells written without an `r` attribute
        let (mut next_row, mut next_col) = (0usize, 0usize);
        let mut current: Option<Cell> = None;

        match_xml_events!(reader => {
            Event::Start(event) if event.local_name().as_ref() == ROW => {
                if let Some(number) = event.get_attribute_value("r")?.and_then(|r| r.parse::<usize>().ok()) {
                    next_row = number.saturating_sub(1);
                }
                next_col = 0;
            }
            Event::End(event) if event.local_name().as_ref() == ROW => next_row += 1,
            Event::Start(event) if event.local_name().as_ref() == CELL => {
                let (row, col) = event
                    .get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((next_row, next_col));
                next_col = col + 1;
                let kind = match event.get_attribute_value("t")?.as_deref() {
                    Some("s") => CellType::SharedString,
                    Some("inlineStr") | Some("str") => CellType::InlineString,
                    Some("b") => CellType::Boolean,
                    Some("d") => CellType::IsoDateTime,
                    // #N/A, #REF! and friends read as blanks
                    Some("e") => CellType::Empty,
                    _ => match event.get_attribute_value("s")? {
                        Some(style) if !style.is_empty() => {
                            self.styles.get(style.parse::<usize>()?).copied().unwrap_or(CellType::Number)
                        }
                        _ => CellType::Number,
                    },
                };
                current = Some(Cell { row, col, kind, value: String::new() });
            }
            Event::Start(event) if current.is_some() && event.local_name().as_ref() == INLINE_STRING => {
                let value = read_text(&mut reader, INLINE_STRING, false)?;
                if let Some(cell) = current.as_mut() {
                    cell.value = value;
                }
            }
            Event::Start(event) if current.is_some() && event.local_name().as_ref() == VALUE => {
                let value = read_text(&mut reader, VALUE, true)?;
                if let Some(cell) = current.as_mut() {
                    cell.value = value;
                }
            }
            Event::End(event) if event.local_name().as_ref() == CELL => {
                if let Some(cell) = current.take() {
                    if cell.kind != CellType::Empty && !cell.value.is_empty() {
                        sheet.push(cell);
                    }
                }
            }
        });

        debug!(
            sheet = name,
            cells = sheet.cells.len(),
            first = ?sheet.cells.first().map(Cell::reference),
            last = ?sheet.cells.last().map(Cell::reference),
            "read worksheet"
        );
        Ok(sheet)
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    fn load_shared_strings(&mut self) -> Result<Vec<String>, HousingEtlError> {
        let mut shared_strings = Vec::new();
        let Some(mut reader) = self.zip.xml_reader("xl/sharedStrings.xml")? else {
            return Ok(shared_strings);
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.local_name().as_ref() == STRING_ITEM => {
                shared_strings.push(read_text(&mut reader, STRING_ITEM, false)?);
            }
        });
        Ok(shared_strings)
    }

    fn read_sheet(&mut self, pattern: &Pattern) -> Result<Option<Sheet>, HousingEtlError> {
        let Some((name, path)) = self.sheets.iter().find(|(name, _)| pattern.matches(name)).cloned() else {
            return Ok(None);
        };
        self.read_worksheet(&name, &path).map(Some)
    }
}

/// Reads the worksheet list, resolved to part paths, and the date system flag.
fn read_workbook(zip: &mut Package) -> Result<(Vec<(String, String)>, bool), HousingEtlError> {
    let targets = excel::load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip
        .xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_owned()))?;
    let mut sheets = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == WORKBOOK_PROPERTIES => {
            is_1904 = matches!(event.get_attribute_value("date1904")?.as_deref(), Some("1") | Some("true"));
        }
        Event::Start(event) if event.local_name().as_ref() == SHEET => {
            let mut name = None;
            let mut id = None;
            for attribute in event.attributes() {
                let attribute = attribute?;
                match attribute.key.local_name().as_ref() {
                    b"name" => name = Some(attribute.get_value()?.into_owned()),
                    b"id" => id = Some(attribute.get_value()?.into_owned()),
                    _ => (),
                }
            }
            if let Some((name, path)) = name.zip(id.and_then(|id| targets.get(&id))) {
                sheets.push((name, path.to_owned()));
            }
        }
    });
    Ok((sheets, is_1904))
}

/// Reads `xl/styles.xml` into one cell type per cell format.
/// A workbook without styles treats every number as a plain number.
fn read_styles(zip: &mut Package, is_1904: bool) -> Result<Vec<CellType>, HousingEtlError> {
    let Some(mut reader) = zip.xml_reader("xl/styles.xml")? else {
        return Ok(Vec::new());
    };
    let mut in_number_formats = false;
    let mut in_cell_formats = false;
    let mut custom = HashMap::new();
    let mut format_ids = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == NUMBER_FORMATS => in_number_formats = true,
        Event::End(event) if event.local_name().as_ref() == NUMBER_FORMATS => in_number_formats = false,
        Event::Start(event) if in_number_formats && event.local_name().as_ref() == NUMBER_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let code = event.get_attribute_value("formatCode")?;
            if let Some((id, code)) = id.zip(code) {
                custom.insert(id.into_owned(), CellType::parse_custom_number_format(&code, is_1904));
            }
        }
        Event::Start(event) if event.local_name().as_ref() == CELL_FORMATS => in_cell_formats = true,
        Event::End(event) if event.local_name().as_ref() == CELL_FORMATS => break,
        Event::Start(event) if in_cell_formats && event.local_name().as_ref() == CELL_FORMAT => {
            format_ids.push(event.get_attribute_value("numFmtId")?.map(|id| id.into_owned()).unwrap_or_default());
        }
    });
    Ok(excel::load_number_formats(format_ids, custom, is_1904))
}

/// Collects the text up to the closing `end` element, skipping phonetic runs.
/// Outside `<t>` elements text is only kept when `inside_text` is set, as for `<v>`.
fn read_text<R: BufRead>(reader: &mut XmlReader<R>, end: &[u8], inside_text: bool) -> Result<String, HousingEtlError> {
    let mut in_phonetic_run = false;
    let mut in_text = inside_text;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.local_name().as_ref() == end => break,
        Event::Start(event) if event.local_name().as_ref() == PHONETIC_RUN => in_phonetic_run = true,
        Event::End(event) if event.local_name().as_ref() == PHONETIC_RUN => in_phonetic_run = false,
        Event::Start(event) if !in_phonetic_run && event.local_name().as_ref() == TEXT => in_text = true,
        Event::End(event) if in_text && event.local_name().as_ref() == TEXT => in_text = false,
        Event::Text(event) if in_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if in_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if in_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
