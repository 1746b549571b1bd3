use crate::domain::{DataError, DataResult, DEFAULT_BINS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "xldash.json";

/// Startup settings. Read once and never changed while the program runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the tables.
    pub database_file: PathBuf,
    /// Table shown on the dashboard and targeted by the main import.
    pub default_table: String,
    /// Column summed on the dashboard and drawn as a histogram.
    pub target_column: String,
    pub histogram_bins: usize,
    /// Log destination for the terminal UI; logging is off when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: PathBuf::from("dashboard.db"),
            default_table: "sales".to_string(),
            target_column: "amount".to_string(),
            histogram_bins: DEFAULT_BINS,
            log_file: None,
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> DataResult<Config> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(DataError::Config(format!("{}: {}", path.display(), e))),
        };

        serde_json::from_str::<Config>(&content)
            .map_err(|e| DataError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> DataResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DataError::Config(format!("Serialization failed: {}", e)))?;
        fs::write(path, json).map_err(|e| DataError::Write(format!("{}: {}", path.display(), e)))
    }
}
