//! User intents and their handlers.
//!
//! Every user action becomes a [`Command`]. [`App::dispatch`] runs the
//! matching handler synchronously and reports whether the store changed;
//! [`App::execute`] is the usual entry point and refreshes the dashboard when
//! it did.

use super::state::App;
use crate::domain::WriteMode;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Import a file into the default table.
    Import { file: PathBuf, mode: WriteMode },
    /// Export the working table.
    Export { file: PathBuf },
    /// List the store's tables in the table manager.
    ShowTables,
    /// Make a stored table the working table.
    SelectTable(String),
    /// Import a file into a table chosen in the table manager.
    ImportToTable { table: String, file: PathBuf, mode: WriteMode },
    /// Export a stored table chosen in the table manager.
    ExportFromTable { table: String, file: PathBuf },
    /// Reload the default table.
    Reload,
}

/// Whether a command modified the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    DataChanged,
}

impl App {
    /// Runs `command` and, when the store changed, reloads the default table.
    ///
    /// The handler's message survives the reload unless the reload itself
    /// has something to report.
    pub fn execute(&mut self, command: Command) -> Outcome {
        let outcome = self.dispatch(command);
        if outcome == Outcome::DataChanged {
            let notice = self.info_message.clone();
            if self.reload_dashboard() {
                self.info_message = notice;
            }
        }
        outcome
    }

    /// Runs the handler for `command` without any follow-up.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        match command {
            Command::Import { file, mode } => self.handle_import(file, mode),
            Command::Export { file } => self.handle_export(file),
            Command::ShowTables => self.handle_show_tables(),
            Command::SelectTable(table) => self.handle_select_table(table),
            Command::ImportToTable { table, file, mode } => {
                self.handle_import_to_table(table, file, mode)
            }
            Command::ExportFromTable { table, file } => self.handle_export_from_table(table, file),
            Command::Reload => {
                self.reload_dashboard();
                Outcome::Unchanged
            }
        }
    }

    fn handle_import(&mut self, file: PathBuf, mode: WriteMode) -> Outcome {
        let table = self.config().default_table.clone();
        match self.controller.import_spreadsheet(&file, &table, mode) {
            Ok(_) => {
                self.info_message = format!("Data {} successfully.", mode.past_tense());
                Outcome::DataChanged
            }
            Err(e) => {
                self.info_message = format!("Import Error: {}", e);
                Outcome::Unchanged
            }
        }
    }

    fn handle_export(&mut self, file: PathBuf) -> Outcome {
        self.info_message = match self
            .controller
            .export_spreadsheet(self.working_table.as_ref(), &file)
        {
            Ok(()) => format!("Data successfully exported to {}", file.display()),
            Err(e) => format!("Export error: {}", e),
        };
        Outcome::Unchanged
    }

    fn handle_show_tables(&mut self) -> Outcome {
        match self.controller.list_tables() {
            Ok(tables) => {
                self.manager.tables = tables;
                self.manager.selected = None;
                self.manager.status = "Tables loaded.".to_string();
            }
            Err(e) => {
                self.manager.status = format!("Error loading tables: {}", e);
            }
        }
        Outcome::Unchanged
    }

    fn handle_select_table(&mut self, table: String) -> Outcome {
        match self.controller.load_table(&table) {
            Ok(loaded) => {
                self.set_working_table(&table, loaded);
                self.info_message = format!("Showing table '{}'.", table);
            }
            Err(e) => {
                self.info_message = format!("Error loading table '{}': {}", table, e);
            }
        }
        Outcome::Unchanged
    }

    fn handle_import_to_table(&mut self, table: String, file: PathBuf, mode: WriteMode) -> Outcome {
        match self.controller.import_spreadsheet(&file, &table, mode) {
            Ok(_) => {
                self.manager.status =
                    format!("Data {} to '{}' successfully.", mode.past_tense(), table);
                Outcome::DataChanged
            }
            Err(e) => {
                self.manager.status = format!("Import error: {}", e);
                Outcome::Unchanged
            }
        }
    }

    fn handle_export_from_table(&mut self, table: String, file: PathBuf) -> Outcome {
        self.manager.status = match self.controller.export_table(&table, &file) {
            Ok(_) => format!("Table '{}' exported successfully.", table),
            Err(e) => format!("Export error: {}", e),
        };
        Outcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::Config;
    use std::fs;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        App::new(Config {
            database_file: dir.path().join("dash.db"),
            target_column: "age".to_string(),
            ..Config::default()
        })
    }

    fn csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_import_reports_data_changed() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let file = csv(&dir, "a.csv", "name,age\na,10\nb,20\n");

        let outcome = app.dispatch(Command::Import { file, mode: WriteMode::Replace });
        assert_eq!(outcome, Outcome::DataChanged);
        // dispatch alone does not refresh the working table
        assert!(app.working_table.is_none());
    }

    #[test]
    fn test_execute_append_refreshes_dashboard() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let first = csv(&dir, "a.csv", "name,age\na,10\nb,20\n");
        let second = csv(&dir, "b.csv", "name,age\nc,1\nd,2\ne,3\n");

        app.execute(Command::Import { file: first, mode: WriteMode::Replace });
        app.execute(Command::Import { file: second, mode: WriteMode::Append });

        assert_eq!(app.info_message, "Data appended successfully.");
        assert_eq!(app.summary.record_count, "Total Records: 5");
        assert_eq!(app.summary.column_sum, "Sum of 'age': 36.00");
    }

    #[test]
    fn test_append_with_other_columns_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let first = csv(&dir, "a.csv", "name,age\na,10\n");
        let other = csv(&dir, "b.csv", "city\nParis\n");

        app.execute(Command::Import { file: first, mode: WriteMode::Replace });
        let outcome = app.execute(Command::Import { file: other, mode: WriteMode::Append });

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(app.info_message.starts_with("Import Error: Columns of table 'sales'"));
        assert_eq!(app.summary.record_count, "Total Records: 1");
    }

    #[test]
    fn test_export_without_working_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let file = dir.path().join("out.xlsx");

        app.execute(Command::Export { file: file.clone() });
        assert_eq!(app.info_message, "Export error: No data to export.");
        assert!(!file.exists());
    }

    #[test]
    fn test_export_working_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let source = csv(&dir, "a.csv", "name,age\na,10\n");
        app.execute(Command::Import { file: source, mode: WriteMode::Replace });

        let file = dir.path().join("out.xlsx");
        app.execute(Command::Export { file: file.clone() });
        assert_eq!(
            app.info_message,
            format!("Data successfully exported to {}", file.display())
        );
        assert!(file.exists());
    }

    #[test]
    fn test_import_to_table_updates_manager_and_reloads_default() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let sales = csv(&dir, "sales.csv", "name,age\na,10\n");
        let extra = csv(&dir, "extra.csv", "name,age\nz,99\n");
        app.execute(Command::Import { file: sales, mode: WriteMode::Replace });
        app.execute(Command::SelectTable("sales".to_string()));

        let outcome = app.execute(Command::ImportToTable {
            table: "extra".to_string(),
            file: extra,
            mode: WriteMode::Replace,
        });

        assert_eq!(outcome, Outcome::DataChanged);
        assert_eq!(app.manager.status, "Data replaced to 'extra' successfully.");
        assert_eq!(app.working_table_name.as_deref(), Some("sales"));
        app.execute(Command::ShowTables);
        assert_eq!(app.manager.tables, vec!["extra", "sales"]);
    }

    #[test]
    fn test_export_from_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let sales = csv(&dir, "sales.csv", "name,age\na,10\n");
        app.execute(Command::Import { file: sales, mode: WriteMode::Replace });

        let file = dir.path().join("sales_export.xlsx");
        app.execute(Command::ExportFromTable { table: "sales".to_string(), file: file.clone() });
        assert_eq!(app.manager.status, "Table 'sales' exported successfully.");
        assert!(file.exists());

        app.execute(Command::ExportFromTable {
            table: "ghost".to_string(),
            file: dir.path().join("ghost.xlsx"),
        });
        assert_eq!(app.manager.status, "Export error: no such table: ghost");
    }

    #[test]
    fn test_select_missing_table_keeps_working_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let sales = csv(&dir, "sales.csv", "name,age\na,10\n");
        app.execute(Command::Import { file: sales, mode: WriteMode::Replace });
        let before = app.working_table.clone();

        app.execute(Command::SelectTable("ghost".to_string()));
        assert!(app.info_message.starts_with("Error loading table 'ghost'"));
        assert_eq!(app.working_table, before);
        assert_eq!(app.working_table_name.as_deref(), Some("sales"));
    }

    #[test]
    fn test_show_tables_on_unopenable_store() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(Config {
            database_file: dir.path().join("missing/dir/dash.db"),
            ..Config::default()
        });

        app.execute(Command::ShowTables);
        assert!(app.manager.status.starts_with("Error loading tables: "));
    }
}
