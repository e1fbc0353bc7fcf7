//! # Persistence
//!
//! Stores the dimensions and both fact tables in a DuckDB database. Every
//! load replaces the previous contents inside a single transaction, so a
//! failed run leaves the store as it was.
use crate::error::HousingEtlError;
use crate::transform::Dimensions;
use crate::transform::Metric;
use crate::transform::Observations;
use duckdb::params;
use duckdb::Connection;
use duckdb::Transaction;
use std::path::Path;
use tracing::debug;
use tracing::info;

mod schema;

/// The database connection held for one pipeline run.
pub struct Store {
    connection: Connection,
}

impl Store {
    /// Opens the database file at `path`, creating it when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Store, HousingEtlError> {
        let connection = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened database");
        Ok(Store { connection })
    }

    pub fn open_in_memory() -> Result<Store, HousingEtlError> {
        Ok(Store {
            connection: Connection::open_in_memory()?,
        })
    }

    /// Creates the relations that do not exist yet. Safe to call repeatedly.
    pub fn create_schema(&self) -> Result<(), HousingEtlError> {
        self.connection.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(())
    }

    /// Replaces the contents of all four relations.
    ///
    /// Dimensions are written before the fact tables that reference them. The
    /// observations go to the fact table of their own metric, whichever
    /// argument they are passed in.
    pub fn replace(
        &mut self,
        dimensions: &Dimensions,
        housing: &Observations,
        waiting: &Observations,
    ) -> Result<(), HousingEtlError> {
        let transaction = self.connection.transaction()?;
        transaction.execute_batch(schema::DROP_SCHEMA)?;
        transaction.execute_batch(schema::CREATE_SCHEMA)?;

        insert_dimensions(&transaction, dimensions)?;
        insert_observations(&transaction, housing)?;
        insert_observations(&transaction, waiting)?;

        transaction.commit()?;
        info!(
            areas = dimensions.areas.len(),
            years = dimensions.years.len(),
            housing = housing.len(),
            waiting = waiting.len(),
            "replaced store contents"
        );
        Ok(())
    }

    /// Number of rows in the fact table of `metric`.
    pub fn count(&self, metric: Metric) -> Result<usize, HousingEtlError> {
        self.count_rows(metric.table_name())
    }

    pub fn count_areas(&self) -> Result<usize, HousingEtlError> {
        self.count_rows("AREA")
    }

    pub fn count_years(&self) -> Result<usize, HousingEtlError> {
        self.count_rows("YEAR")
    }

    fn count_rows(&self, table: &str) -> Result<usize, HousingEtlError> {
        let sql = format!(r#"SELECT COUNT(*) FROM "{table}""#);
        let count: i64 = self.connection.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Releases the connection, surfacing any error raised while closing.
    pub fn close(self) -> Result<(), HousingEtlError> {
        self.connection.close().map_err(|(_, error)| error)?;
        Ok(())
    }
}

fn insert_dimensions(transaction: &Transaction<'_>, dimensions: &Dimensions) -> Result<(), HousingEtlError> {
    let mut appender = transaction.appender("AREA")?;
    for area in &dimensions.areas {
        appender.append_row(params![area.code, area.name])?;
    }
    appender.flush()?;

    let mut appender = transaction.appender("YEAR")?;
    for year in &dimensions.years {
        appender.append_row(params![*year])?;
    }
    appender.flush()?;
    Ok(())
}

fn insert_observations(transaction: &Transaction<'_>, observations: &Observations) -> Result<(), HousingEtlError> {
    let metric = observations.metric;
    let sql = format!(
        r#"INSERT INTO "{}" ("year", "areaCode", "{}") VALUES (?, ?, ?)"#,
        metric.table_name(),
        metric.value_column()
    );
    let mut statement = transaction.prepare(&sql)?;
    for observation in observations.iter() {
        statement.execute(params![observation.year, observation.area_code, observation.value])?;
    }
    debug!(table = metric.table_name(), rows = observations.len(), "inserted observations");
    Ok(())
}
