use thiserror::Error;

/// Failure kinds surfaced by the store, the spreadsheet codec and the config loader.
///
/// Every message is written to be shown verbatim in the status line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// Opening, querying or writing the table store failed.
    #[error("{0}")]
    Store(String),
    /// The spreadsheet could not be read or is malformed.
    #[error("{0}")]
    Parse(String),
    /// Export was requested without any rows to write.
    #[error("No data to export.")]
    EmptyInput,
    /// The destination file could not be written.
    #[error("{0}")]
    Write(String),
    /// Append was attempted with a column set that differs from the stored table.
    #[error("Columns of table '{table}' ({expected}) do not match the imported columns ({found})")]
    SchemaMismatch {
        table: String,
        expected: String,
        found: String,
    },
    /// The configuration file exists but could not be used.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DataError {
    pub fn schema_mismatch(table: &str, expected: &[String], found: &[String]) -> Self {
        DataError::SchemaMismatch {
            table: table.to_string(),
            expected: expected.join(", "),
            found: found.join(", "),
        }
    }
}

pub type DataResult<T> = Result<T, DataError>;
