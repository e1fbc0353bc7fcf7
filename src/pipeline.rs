//! The load run: read both workbooks, reshape them, replace the store and count what landed.
use crate::config::PipelineConfig;
use crate::database::Store;
use crate::error::HousingEtlError;
use crate::source::describe;
use crate::source::load_table;
use crate::source::RawTable;
use crate::transform::build_dimensions;
use crate::transform::reshape;
use crate::transform::Metric;
use std::fmt;
use tracing::info;

/// Row counts of one run, expected from the reshaped data and read back from the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub areas: usize,
    pub years: usize,
    pub housing_expected: usize,
    pub housing_stored: usize,
    pub waiting_expected: usize,
    pub waiting_stored: usize,
}

impl LoadReport {
    /// Stored row count of the fact table of `metric`.
    pub fn stored(&self, metric: Metric) -> usize {
        match metric {
            Metric::HousingSupply => self.housing_stored,
            Metric::WaitingList => self.waiting_stored,
        }
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Data Count: {}", Metric::HousingSupply, self.housing_stored)?;
        write!(f, "{} Data Count: {}", Metric::WaitingList, self.waiting_stored)
    }
}

/// Loads both source workbooks named in `config` into `store`.
pub fn run(config: &PipelineConfig, store: &mut Store) -> Result<LoadReport, HousingEtlError> {
    let housing = load_table(&config.housing_supply)?;
    info!("{}", describe(&housing));
    let waiting = load_table(&config.waiting_list)?;
    info!("{}", describe(&waiting));
    run_tables(&housing, &waiting, store)
}

/// Reshapes two wide tables and replaces the store contents with them.
///
/// Counts are read back after the load and reported as they are; a difference
/// from the expected counts is logged but does not fail the run.
pub fn run_tables(housing: &RawTable, waiting: &RawTable, store: &mut Store) -> Result<LoadReport, HousingEtlError> {
    let housing = reshape(housing, Metric::HousingSupply);
    let waiting = reshape(waiting, Metric::WaitingList);
    let dimensions = build_dimensions(&housing.records, &waiting.records);

    store.create_schema()?;
    store.replace(&dimensions, &housing, &waiting)?;

    let report = LoadReport {
        areas: dimensions.areas.len(),
        years: dimensions.years.len(),
        housing_expected: housing.len(),
        housing_stored: store.count(Metric::HousingSupply)?,
        waiting_expected: waiting.len(),
        waiting_stored: store.count(Metric::WaitingList)?,
    };
    for (metric, expected, stored) in [
        (Metric::HousingSupply, report.housing_expected, report.housing_stored),
        (Metric::WaitingList, report.waiting_expected, report.waiting_stored),
    ] {
        info!(%metric, expected, stored, "verified fact table");
    }
    Ok(report)
}
