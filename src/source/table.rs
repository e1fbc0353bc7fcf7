use crate::source::SourceFormatError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

/// Number of identifier columns ahead of the year columns.
pub const IDENTIFIER_COLUMNS: usize = 3;

static YEAR_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4})(\D|$)").expect("hardcoded regex pattern"));

/// One area row of a wide table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
    /// Legacy area code, often blank in recent releases
    pub code: Option<String>,
    /// Current ONS area code; the key every observation is filed under
    pub current_code: String,
    pub area: String,
    /// Cell text under each year column, aligned with [`RawTable::years`]
    pub values: Vec<Option<String>>,
}

/// A wide table: identifier columns `[Code, CurrentCode, Area]` followed by one column per year.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawTable {
    pub name: String,
    pub years: Vec<i32>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Builds a table from a normalized header row and the records below it.
    ///
    /// The header must start with the three identifier columns (`Code`, a
    /// `...Code` column and `Area`, compared case-insensitively with spaces and
    /// underscores ignored). Every header after them must begin with a four
    /// digit year. Trailing blank header cells are ignored together with any
    /// values stored under them.
    ///
    /// Rows missing the current code or the area name cannot be keyed and are
    /// skipped.
    pub fn from_records(
        name: &str,
        header: Vec<String>,
        records: Vec<Vec<Option<String>>>,
    ) -> Result<RawTable, SourceFormatError> {
        let width = header.iter().rposition(|column| !column.trim().is_empty()).map(|i| i + 1).unwrap_or(0);
        if width < IDENTIFIER_COLUMNS {
            return Err(SourceFormatError::MissingColumns(width));
        }

        check_identifier(&header, 0, "Code", |column| column == "code")?;
        check_identifier(&header, 1, "CurrentCode", |column| column.ends_with("code"))?;
        check_identifier(&header, 2, "Area", |column| column == "area")?;

        let years = header[IDENTIFIER_COLUMNS..width]
            .iter()
            .map(|column| parse_year(column).ok_or_else(|| SourceFormatError::InvalidYearHeader(column.to_owned())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(records.len());
        for (index, mut record) in records.into_iter().enumerate() {
            record.resize(width, None);
            let mut cells = record.into_iter();
            let code = cells.next().flatten();
            let current_code = cells.next().flatten();
            let area = cells.next().flatten();
            match (current_code, area) {
                (Some(current_code), Some(area)) => rows.push(RawRow {
                    code,
                    current_code,
                    area,
                    values: cells.collect(),
                }),
                _ => debug!(table = name, record = index, "skipped row without area identifiers"),
            }
        }

        Ok(RawTable {
            name: name.to_owned(),
            years,
            rows,
        })
    }

    /// Number of value cells holding no text.
    pub fn missing_cells(&self) -> usize {
        self.rows.iter().flat_map(|row| &row.values).filter(|value| value.is_none()).count()
    }
}

/// Shape of a loaded table, reported once per source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// Blank cells per year column
    pub missing: Vec<(i32, usize)>,
}

impl TableSummary {
    pub fn missing_cells(&self) -> usize {
        self.missing.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} rows x {} columns", self.name, self.rows, self.columns)?;
        if let (Some(first), Some(last)) = (self.first_year, self.last_year) {
            write!(f, ", years {first}-{last}")?;
        }
        write!(f, ", {} missing values", self.missing_cells())?;
        let mut years = self.missing.iter().filter(|(_, count)| *count > 0);
        if let Some((year, count)) = years.next() {
            write!(f, " ({year}: {count}")?;
            for (year, count) in years {
                write!(f, ", {year}: {count}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Summarizes the shape and completeness of a table.
pub fn describe(table: &RawTable) -> TableSummary {
    let missing = table
        .years
        .iter()
        .enumerate()
        .map(|(index, year)| {
            let count = table
                .rows
                .iter()
                .filter(|row| row.values.get(index).map(Option::is_none).unwrap_or(true))
                .count();
            (*year, count)
        })
        .collect();
    TableSummary {
        name: table.name.to_owned(),
        rows: table.rows.len(),
        columns: IDENTIFIER_COLUMNS + table.years.len(),
        first_year: table.years.iter().min().copied(),
        last_year: table.years.iter().max().copied(),
        missing,
    }
}

fn check_identifier(
    header: &[String],
    index: usize,
    expected: &'static str,
    accept: impl Fn(&str) -> bool,
) -> Result<(), SourceFormatError> {
    let column = header[index].to_lowercase().replace(['_', ' '], "");
    if accept(&column) {
        Ok(())
    } else {
        Err(SourceFormatError::UnexpectedColumn {
            index,
            expected,
            found: header[index].to_owned(),
        })
    }
}

/// Reads the year a column header stands for: `1997`, `1997.0` or `1997-98`.
pub(crate) fn parse_year(column: &str) -> Option<i32> {
    YEAR_HEADER
        .captures(column)
        .and_then(|captures| captures.get(1))
        .and_then(|year| year.as_str().parse::<i32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|column| column.to_string()).collect()
    }

    fn record(cells: &[Option<&str>]) -> Vec<Option<String>> {
        cells.iter().map(|cell| cell.map(str::to_owned)).collect()
    }

    #[test]
    fn parse_year_accepts_common_header_shapes() {
        assert_eq!(parse_year("1997"), Some(1997));
        assert_eq!(parse_year("1997.0"), Some(1997));
        assert_eq!(parse_year("2011-12"), Some(2011));
        assert_eq!(parse_year(" 2020 "), Some(2020));
        assert_eq!(parse_year("Total"), None);
        assert_eq!(parse_year("19970"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn from_records_builds_rows_aligned_with_years() {
        let table = RawTable::from_records(
            "housing",
            header(&["Code", "CurrentCode", "Area", "1997", "1998"]),
            vec![
                record(&[Some("E09"), Some("E09000001"), Some("Camden"), Some("10"), Some("20")]),
                record(&[None, Some("E09000002"), Some("Barnet"), None]),
            ],
        )
        .unwrap();
        assert_eq!(table.years, vec![1997, 1998]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].code.as_deref(), Some("E09"));
        assert_eq!(table.rows[1].code, None);
        assert_eq!(table.rows[1].values, vec![None, None]);
        assert_eq!(table.missing_cells(), 2);
    }

    #[test]
    fn identifier_headers_are_matched_loosely() {
        let table = RawTable::from_records(
            "waiting",
            header(&["code", "current_code", "AREA", "2001"]),
            vec![],
        );
        assert!(table.is_ok());
        let table = RawTable::from_records("waiting", header(&["Code", "NewCode", "Area"]), vec![]).unwrap();
        assert!(table.years.is_empty());
    }

    #[test]
    fn shifted_header_is_reported() {
        let error = RawTable::from_records(
            "waiting",
            header(&["Households on local authority waiting list", "", "", ""]),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(error, SourceFormatError::MissingColumns(1)));

        let error = RawTable::from_records(
            "waiting",
            header(&["E09", "E09000001", "Camden", "10"]),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(error, SourceFormatError::UnexpectedColumn { index: 0, .. }));
    }

    #[test]
    fn non_year_headers_are_rejected() {
        let error = RawTable::from_records(
            "housing",
            header(&["Code", "CurrentCode", "Area", "1997", "Notes"]),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(error, SourceFormatError::InvalidYearHeader(ref column) if column == "Notes"));
    }

    #[test]
    fn trailing_blank_headers_and_cells_are_dropped() {
        let table = RawTable::from_records(
            "housing",
            header(&["Code", "CurrentCode", "Area", "1997", "", ""]),
            vec![record(&[Some("E09"), Some("E09000001"), Some("Camden"), Some("10"), None, Some("note")])],
        )
        .unwrap();
        assert_eq!(table.years, vec![1997]);
        assert_eq!(table.rows[0].values, vec![Some("10".to_string())]);
    }

    #[test]
    fn rows_without_identifiers_are_skipped() {
        let table = RawTable::from_records(
            "housing",
            header(&["Code", "CurrentCode", "Area", "1997"]),
            vec![
                record(&[Some("Source: DCLG")]),
                record(&[Some("E12"), None, Some("London"), Some("5")]),
                record(&[None, Some("E09000001"), Some("Camden"), Some("10")]),
            ],
        )
        .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].current_code, "E09000001");
    }

    #[test]
    fn describe_counts_missing_cells_per_year() {
        let table = RawTable::from_records(
            "housing",
            header(&["Code", "CurrentCode", "Area", "1997", "1998"]),
            vec![
                record(&[None, Some("E09000001"), Some("Camden"), Some("10"), None]),
                record(&[None, Some("E09000002"), Some("Barnet"), None, None]),
            ],
        )
        .unwrap();
        let summary = describe(&table);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, 5);
        assert_eq!(summary.missing, vec![(1997, 1), (1998, 2)]);
        assert_eq!(
            summary.to_string(),
            "housing: 2 rows x 5 columns, years 1997-1998, 3 missing values (1997: 1, 1998: 2)"
        );
    }

    #[test]
    fn describe_lists_only_years_with_missing_cells() {
        let table = RawTable::from_records(
            "waiting",
            header(&["Code", "CurrentCode", "Area", "2001", "2002", "2003"]),
            vec![record(&[None, Some("E09000007"), Some("Camden"), Some("5000"), None, Some("5200")])],
        )
        .unwrap();
        assert_eq!(
            describe(&table).to_string(),
            "waiting: 1 rows x 6 columns, years 2001-2003, 1 missing values (2002: 1)"
        );

        let complete = RawTable::from_records(
            "waiting",
            header(&["Code", "CurrentCode", "Area", "2001"]),
            vec![record(&[None, Some("E09000007"), Some("Camden"), Some("5000")])],
        )
        .unwrap();
        assert_eq!(describe(&complete).to_string(), "waiting: 1 rows x 4 columns, years 2001-2001, 0 missing values");
    }
}
