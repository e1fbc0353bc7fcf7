//! # Housing ETL
//!
//! Loads the London affordable housing supply and local authority waiting
//! list workbooks into a DuckDB database.
//!
//! ## Pipeline
//!
//! - **Source loading**: reads a local Excel workbook (`.xlsx`, `.xlsm`),
//!   selects the sheet by name pattern, locates the header row and validates
//!   the `[Code, CurrentCode, Area, <years>...]` layout
//! - **Reshaping**: turns one column per year into one observation per area
//!   and year, dropping blank and non-numeric cells
//! - **Dimensions**: collects the distinct areas and years both tables refer to
//! - **Persistence**: replaces the `AREA`, `YEAR`, `AFFORDABLE_HOUSING` and
//!   `WAITING_LIST` relations in one transaction and reads the counts back
//!
//! ## Example
//!
//! ```no_run
//! use housing_etl::config::PipelineConfig;
//! use housing_etl::database::Store;
//! use housing_etl::pipeline;
//!
//! let config = PipelineConfig::default();
//! let mut store = Store::open(&config.database)?;
//! let report = pipeline::run(&config, &mut store)?;
//! println!("{report}");
//! store.close()?;
//! # Ok::<(), housing_etl::error::HousingEtlError>(())
//! ```
pub mod config;
pub mod database;
pub mod error;
mod helpers;
pub mod pipeline;
pub mod source;
mod spreadsheet;
pub mod transform;

#[cfg(test)]
#[path = "../tests/common/workbook.rs"]
mod test_support;

pub use spreadsheet::SpreadsheetError;
