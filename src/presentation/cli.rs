//! Command-line arguments and the headless subcommands.
//!
//! Without a subcommand the binary starts the terminal dashboard:
//! - xldash                            # Terminal UI
//! - xldash tables                     # List stored tables
//! - xldash import data.xlsx --mode append
//! - xldash export out.csv --table inventory
//! - xldash summary --column amount
//! - xldash save-config --database other.db

use crate::application::DataController;
use crate::domain::{DataError, DataResult, WriteMode};
use crate::infrastructure::{Config, DEFAULT_CONFIG_FILE};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "xldash")]
#[command(about = "Excel dashboard - import spreadsheets into SQLite and summarize them")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// SQLite database file (overrides the configuration)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Table to work on (overrides the configured default table)
    #[arg(long, global = true)]
    pub table: Option<String>,

    /// Column to sum and plot (overrides the configuration)
    #[arg(long, global = true)]
    pub column: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the tables in the database
    Tables,
    /// Import a spreadsheet into a table
    Import {
        /// Spreadsheet to read (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
        file: PathBuf,
        /// Replace the table or append to it
        #[arg(long, value_enum, default_value = "replace")]
        mode: ModeArg,
    },
    /// Export a table to a spreadsheet (.xlsx or .csv)
    Export {
        file: PathBuf,
    },
    /// Print the record count and the column sum of a table
    Summary,
    /// Write the effective configuration, overrides included, to the config file
    SaveConfig,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Replace,
    Append,
}

impl From<ModeArg> for WriteMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Replace => WriteMode::Replace,
            ModeArg::Append => WriteMode::Append,
        }
    }
}

impl Cli {
    /// Applies the command-line overrides on top of `config`.
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(database) = &self.database {
            config.database_file = database.clone();
        }
        if let Some(table) = &self.table {
            config.default_table = table.clone();
        }
        if let Some(column) = &self.column {
            config.target_column = column.clone();
        }
        config
    }
}

/// Runs a headless subcommand and returns the text to print.
///
/// `config_path` is where `save-config` writes.
pub fn run_command(
    controller: &DataController,
    command: &Commands,
    config_path: &Path,
) -> DataResult<String> {
    let store = controller.store();
    let table = controller.config().default_table.as_str();
    match command {
        Commands::Tables => {
            let tables = controller.list_tables()?;
            if tables.is_empty() {
                return Ok(format!("No tables found in {}.", store.path().display()));
            }
            let mut lines = Vec::with_capacity(tables.len());
            for name in &tables {
                lines.push(format!("{} ({} rows)", name, store.row_count(name)?));
            }
            Ok(lines.join("\n"))
        }
        Commands::Import { file, mode } => {
            let mode = WriteMode::from(*mode);
            let rows = controller.import_spreadsheet(file, table, mode)?;
            Ok(format!(
                "Data {} to '{}' successfully ({} rows read).",
                mode.past_tense(),
                table,
                rows
            ))
        }
        Commands::Export { file } => {
            let rows = controller.export_table(table, file)?;
            Ok(format!(
                "Data successfully exported to {} ({} rows).",
                file.display(),
                rows
            ))
        }
        Commands::Summary => {
            if !store.table_exists(table)? {
                return Err(DataError::Store(format!(
                    "No database found or table '{}' missing. Please import data.",
                    table
                )));
            }
            let loaded = controller.load_table(table)?;
            let summary = controller.summarize(Some(&loaded));
            Ok(format!("{}\n{}", summary.record_count, summary.column_sum))
        }
        Commands::SaveConfig => {
            controller.config().save(config_path)?;
            Ok(format!("Configuration written to {}", config_path.display()))
        }
    }
}
