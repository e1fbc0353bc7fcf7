//! # Source Loading
//!
//! Turns a worksheet into a validated [`RawTable`]: the sheet is selected by
//! name pattern, blank rows are dropped, the header row is located after the
//! configured number of leading rows and its names are normalized before the
//! column layout is checked.
use crate::config::SourceConfig;
use crate::error::HousingEtlError;
use crate::error::ResultMessage;
use crate::spreadsheet::open_spreadsheet;
use glob::Pattern;
use thiserror::Error;
use tracing::info;

mod table;

pub use table::describe;
pub use table::RawRow;
pub use table::RawTable;
pub use table::TableSummary;
pub use table::IDENTIFIER_COLUMNS;

/// A worksheet that does not have the expected wide layout.
#[derive(Error, Debug)]
pub enum SourceFormatError {
    #[error("No sheet matches '{0}', available sheets: {1:?}")]
    SheetNotFound(String, Vec<String>),

    #[error("Header row {0} not found, the sheet has fewer non-empty rows")]
    MissingHeaderRow(usize),

    #[error("Expected at least 3 columns (Code, CurrentCode, Area), found {0}")]
    MissingColumns(usize),

    #[error("Column {index} should be '{expected}' but is '{found}', is the header offset right?")]
    UnexpectedColumn {
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Column header '{0}' is not a year")]
    InvalidYearHeader(String),
}

/// Loads one source workbook as a wide table.
pub fn load_table(config: &SourceConfig) -> Result<RawTable, HousingEtlError> {
    read_table(config).with_prefix(&config.file_name)
}

fn read_table(config: &SourceConfig) -> Result<RawTable, HousingEtlError> {
    let pattern = Pattern::new(&config.sheet_name)?;
    let mut spreadsheet = open_spreadsheet(&config.file_name)?;
    let shared_strings = spreadsheet.load_shared_strings()?;
    let sheet = match spreadsheet.read_sheet(&pattern)? {
        Some(sheet) => sheet,
        None => {
            return Err(SourceFormatError::SheetNotFound(config.sheet_name.to_owned(), spreadsheet.sheet_names()).into())
        }
    };

    let mut records = sheet
        .records()
        .into_iter()
        .map(|record| {
            record
                .into_iter()
                .map(|cell| cell.and_then(|cell| cell.text(&shared_strings)))
                .map(|text| text.filter(|text| !text.trim().is_empty()))
                .collect::<Vec<_>>()
        })
        .filter(|record| record.iter().any(Option::is_some));

    let offset = config.header_offset();
    let header = records
        .nth(offset)
        .ok_or(SourceFormatError::MissingHeaderRow(offset))?
        .into_iter()
        .map(|column| column.map(|column| normalize_header(&column)).unwrap_or_default())
        .collect::<Vec<_>>();
    let records = records
        .map(|record| record.into_iter().map(|cell| cell.map(|text| text.trim().to_owned())).collect())
        .collect::<Vec<Vec<Option<String>>>>();

    let table = RawTable::from_records(&sheet.name, header, records)?;
    info!(
        file_name = config.file_name.as_str(),
        sheet = sheet.name.as_str(),
        rows = table.rows.len(),
        years = table.years.len(),
        "loaded source table"
    );
    Ok(table)
}

/// Strips surrounding whitespace and every embedded space or line break from a header name.
pub fn normalize_header(column: &str) -> String {
    column.trim().chars().filter(|c| !matches!(c, ' ' | '\n' | '\r')).collect()
}
