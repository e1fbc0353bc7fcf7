//! # Wide-to-Long Reshaping
//!
//! A [`RawTable`] holds one column per year. Reshaping emits one
//! [`Observation`] per area and year that carries a usable number; blank and
//! non-numeric cells are dropped rather than kept as nulls.
use crate::source::RawTable;
use std::fmt;
use tracing::debug;

mod dimension;

pub use dimension::build_dimensions;
pub use dimension::Area;
pub use dimension::Dimensions;

/// The measurement a fact table records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Affordable housing units supplied
    HousingSupply,
    /// Households on the local authority waiting list
    WaitingList,
}

impl Metric {
    /// Fact table the metric is stored in.
    pub fn table_name(&self) -> &'static str {
        match self {
            Metric::HousingSupply => "AFFORDABLE_HOUSING",
            Metric::WaitingList => "WAITING_LIST",
        }
    }

    /// Column holding the measured value.
    pub fn value_column(&self) -> &'static str {
        match self {
            Metric::HousingSupply => "housingUnits",
            Metric::WaitingList => "householdsCount",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::HousingSupply => write!(f, "Affordable Housing"),
            Metric::WaitingList => write!(f, "Waiting List"),
        }
    }
}

/// One measured value for an area in a year.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub year: i32,
    pub area_code: String,
    pub name: String,
    pub value: i64,
}

/// The long form of one source table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observations {
    pub metric: Metric,
    pub records: Vec<Observation>,
}

impl Observations {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.records.iter()
    }
}

/// Unpivots every year column of `table` into observations of `metric`.
///
/// Rows keep their order and, within a row, observations follow the column
/// order. A table without year columns yields no observations.
pub fn reshape(table: &RawTable, metric: Metric) -> Observations {
    let mut records = Vec::with_capacity(table.rows.len() * table.years.len());
    let mut dropped = 0usize;
    for row in &table.rows {
        for (year, cell) in table.years.iter().zip(&row.values) {
            match cell.as_deref().and_then(parse_value) {
                Some(value) => records.push(Observation {
                    year: *year,
                    area_code: row.current_code.to_owned(),
                    name: row.area.to_owned(),
                    value,
                }),
                None => dropped += 1,
            }
        }
        // Short rows count their absent trailing cells as missing too.
        dropped += table.years.len().saturating_sub(row.values.len());
    }
    debug!(table = table.name.as_str(), %metric, kept = records.len(), dropped, "reshaped table");
    Observations { metric, records }
}

/// Reads a cell as a whole number.
///
/// Integers are taken as they are, thousands separators allowed. Decimal
/// values are rounded to the nearest integer. Markers such as `..`, `-` or
/// `n/a` are missing values.
pub fn parse_value(text: &str) -> Option<i64> {
    let text = text.trim().replace(',', "");
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.round() as i64)
}
