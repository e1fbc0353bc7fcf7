#![allow(dead_code)]

use housing_etl::source::RawTable;

mod workbook;

pub use workbook::Workbook;

/// Builds a validated wide table from literal rows, the first being the header.
pub fn raw_table(name: &str, rows: &[&[Option<&str>]]) -> RawTable {
    let (header, records) = rows.split_first().expect("header row");
    let header = header.iter().map(|cell| cell.unwrap_or_default().to_string()).collect();
    let records = records
        .iter()
        .map(|record| record.iter().map(|cell| cell.map(str::to_owned)).collect())
        .collect();
    RawTable::from_records(name, header, records).expect("valid table")
}
