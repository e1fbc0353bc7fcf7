//! Run configuration: where the two workbooks live and where the database goes.
use std::path::PathBuf;

/// Location and layout of one source workbook.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Path or URL of the workbook
    pub file_name: String,
    /// Glob pattern selecting the sheet; the first matching sheet is read
    pub sheet_name: String,
    /// Number of non-empty rows above the header row
    pub header_offset: Option<usize>,
}

impl SourceConfig {
    pub fn new(file_name: &str, sheet_name: &str, header_offset: Option<usize>) -> Self {
        Self {
            file_name: file_name.to_owned(),
            sheet_name: sheet_name.to_owned(),
            header_offset,
        }
    }

    /// Affordable housing supply per borough.
    pub fn housing_supply() -> Self {
        Self::new("dclg-affordable-housing-borough.xlsx", "Data", None)
    }

    /// Households on local authority waiting lists; a title row sits above the header.
    pub fn waiting_list() -> Self {
        Self::new(
            "households-on-local-authority-waiting-list.xlsx",
            "Households on LA Waiting List",
            Some(1),
        )
    }

    pub(crate) fn header_offset(&self) -> usize {
        self.header_offset.unwrap_or(0)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::housing_supply()
    }
}

/// Inputs and output of one pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub housing_supply: SourceConfig,
    pub waiting_list: SourceConfig,
    /// DuckDB database file, created when missing
    pub database: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            housing_supply: SourceConfig::housing_supply(),
            waiting_list: SourceConfig::waiting_list(),
            database: PathBuf::from("affordable_housing_project.duckdb"),
        }
    }
}
