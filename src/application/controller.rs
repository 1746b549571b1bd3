//! Import, export and summary routines bound to one configuration.
//!
//! The controller owns no open resources: each call goes through the table
//! store, which opens and closes its own connection.

use crate::domain::{compute_summary, DataError, DataResult, Histogram, SummaryResult, Table, WriteMode};
use crate::infrastructure::{Config, SpreadsheetCodec, TableStore};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct DataController {
    config: Config,
    store: TableStore,
}

impl DataController {
    pub fn new(config: Config) -> Self {
        let store = TableStore::new(config.database_file.clone());
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn list_tables(&self) -> DataResult<Vec<String>> {
        self.store.list_tables().inspect_err(|e| warn!(error = %e, "listing tables failed"))
    }

    pub fn load_table(&self, name: &str) -> DataResult<Table> {
        self.store
            .load_table(name)
            .inspect_err(|e| warn!(table = name, error = %e, "loading table failed"))
    }

    /// Reads the spreadsheet at `path` and writes it into `table` using `mode`.
    ///
    /// Returns the number of rows read from the file. Column names are not
    /// checked against the stored table except by the append column check.
    pub fn import_spreadsheet(&self, path: &Path, table: &str, mode: WriteMode) -> DataResult<usize> {
        let result = SpreadsheetCodec::read(path).and_then(|sheet| {
            self.store.write_table(table, &sheet, mode)?;
            Ok(sheet.row_count())
        });

        match &result {
            Ok(rows) => info!(file = %path.display(), table, %mode, rows, "imported spreadsheet"),
            Err(e) => warn!(file = %path.display(), table, %mode, error = %e, "import failed"),
        }
        result
    }

    /// Writes `table` to `path`. An absent or row-less table is rejected
    /// before anything touches the filesystem.
    pub fn export_spreadsheet(&self, table: Option<&Table>, path: &Path) -> DataResult<()> {
        let table = match table {
            Some(t) if !t.is_empty() => t,
            _ => {
                warn!(file = %path.display(), "export requested without data");
                return Err(DataError::EmptyInput);
            }
        };

        SpreadsheetCodec::write(table, path)
            .inspect(|_| info!(file = %path.display(), rows = table.row_count(), "exported spreadsheet"))
            .inspect_err(|e| warn!(file = %path.display(), error = %e, "export failed"))
    }

    /// Loads the stored table `name` and exports it. Returns the row count written.
    pub fn export_table(&self, name: &str, path: &Path) -> DataResult<usize> {
        let table = self.load_table(name)?;
        self.export_spreadsheet(Some(&table), path)?;
        Ok(table.row_count())
    }

    pub fn summarize(&self, table: Option<&Table>) -> SummaryResult {
        compute_summary(table, &self.config.target_column)
    }

    pub fn histogram(&self, table: &Table) -> Option<Histogram> {
        Histogram::from_column(table, &self.config.target_column, self.config.histogram_bins)
    }
}
