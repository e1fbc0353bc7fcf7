//! # Spreadsheet Processing Module
//!
//! Reads worksheets out of Excel workbooks (`.xlsx`, `.xlsm`) into [`sheet::Sheet`]
//! values: cells with their position, detected type and raw value. Shared strings
//! are loaded separately so callers only pay for them when they need text.
use crate::error::HousingEtlError;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use glob::Pattern;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

pub(crate) mod cell;
mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
mod xlsx;

/// Errors raised while opening or reading a spreadsheet file.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// Unsupported or unrecognized file format
    #[error("Unsupported spreadsheet format for '{0}'")]
    UnsupportedFormat(String),

    /// Missing or unreadable package part
    #[error("Cannot read '{0}' as an Excel workbook")]
    FileError(String),

    /// Workbook without any worksheet
    #[error("Spreadsheet '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),
}

/// Common interface of the supported workbook formats.
pub(crate) trait Spreadsheet {
    /// Returns the worksheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Loads the shared string table; cells of type `SharedString` index into it
    fn load_shared_strings(&mut self) -> Result<Vec<String>, HousingEtlError>;

    /// Reads the first worksheet, in workbook order, whose name matches the pattern
    fn read_sheet(&mut self, pattern: &Pattern) -> Result<Option<Sheet>, HousingEtlError>;
}

/// Opens a spreadsheet, choosing the reader from the file extension.
pub(crate) fn open_spreadsheet(file_name: &str) -> Result<Box<dyn Spreadsheet>, HousingEtlError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxSpreadsheet::open(file_name)?)),
        _ => Err(SpreadsheetError::UnsupportedFormat(file_name.to_owned()).into()),
    }
}
