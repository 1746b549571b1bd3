//! Application state management for the terminal dashboard.
//!
//! This module contains the main application state and mode management
//! for the terminal user interface.

use super::commands::Command;
use super::controller::DataController;
use crate::domain::{Histogram, SummaryResult, Table, WriteMode};
use crate::infrastructure::Config;
use std::path::PathBuf;

/// Where an import lands or an export comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The dashboard: imports go to the default table, exports write the working table.
    Dashboard,
    /// A table picked in the table manager.
    Table(String),
}

impl Target {
    fn return_mode(&self) -> AppMode {
        match self {
            Target::Dashboard => AppMode::Normal,
            Target::Table(_) => AppMode::TableManager,
        }
    }
}

/// What the file name prompt is collecting a path for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    Import(Target),
    Export(Target),
}

/// Represents the current mode of the application.
///
/// The mode decides how key presses are interpreted and which popups are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    /// Grid navigation and dashboard shortcuts
    Normal,
    /// Help screen is displayed
    Help,
    /// The status bar is collecting a file path
    FileInput(FileAction),
    /// Replace / append / cancel choice for a pending import
    ConfirmImport { target: Target, file: PathBuf },
    /// Table manager popup is open
    TableManager,
}

/// State of the table manager popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableManager {
    /// Table names as last listed from the store
    pub tables: Vec<String>,
    /// Highlighted entry, if any
    pub selected: Option<usize>,
    /// Status line shown at the bottom of the popup
    pub status: String,
}

impl Default for TableManager {
    fn default() -> Self {
        Self {
            tables: Vec::new(),
            selected: None,
            status: "Please select a table.".to_string(),
        }
    }
}

/// Main application state: the working table, its derived statistics and UI state.
///
/// # Examples
///
/// ```
/// use xldash::application::{App, AppMode};
/// use xldash::infrastructure::Config;
///
/// let app = App::new(Config::default());
/// assert!(app.working_table.is_none());
/// assert_eq!(app.mode, AppMode::Normal);
/// ```
#[derive(Debug)]
pub struct App {
    /// Import/export routines and the store they write to
    pub controller: DataController,
    /// Most recent successfully loaded table
    pub working_table: Option<Table>,
    /// Store name of the working table
    pub working_table_name: Option<String>,
    /// Dashboard statistics of the working table
    pub summary: SummaryResult,
    /// Histogram of the target column, when it is numeric
    pub histogram: Option<Histogram>,
    /// Message line shown under the title
    pub info_message: String,
    /// Current application mode
    pub mode: AppMode,
    /// Highlighted row of the grid (zero-based)
    pub selected_row: usize,
    /// Highlighted column of the grid (zero-based)
    pub selected_col: usize,
    /// Top row visible in the viewport
    pub scroll_row: usize,
    /// Left-most column visible in the viewport
    pub scroll_col: usize,
    /// Viewport height in rows
    pub viewport_rows: usize,
    /// Viewport width in columns
    pub viewport_cols: usize,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Input buffer for file path entry
    pub filename_input: String,
    /// Cursor position within the input buffer
    pub cursor_position: usize,
    /// Table manager popup state
    pub manager: TableManager,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            controller: DataController::new(config),
            working_table: None,
            working_table_name: None,
            summary: SummaryResult::default(),
            histogram: None,
            info_message: "Loading data...".to_string(),
            mode: AppMode::Normal,
            selected_row: 0,
            selected_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            viewport_rows: 20,
            viewport_cols: 8,
            help_scroll: 0,
            filename_input: String::new(),
            cursor_position: 0,
            manager: TableManager::default(),
        }
    }

    pub fn config(&self) -> &Config {
        self.controller.config()
    }

    /// Installs `table` as the working table and recomputes everything derived from it.
    pub(crate) fn set_working_table(&mut self, name: &str, table: Table) {
        self.summary = self.controller.summarize(Some(&table));
        self.histogram = self.controller.histogram(&table);
        self.working_table = Some(table);
        self.working_table_name = Some(name.to_string());
        self.selected_row = 0;
        self.selected_col = 0;
        self.scroll_row = 0;
        self.scroll_col = 0;
    }

    /// Loads the default table. Returns `true` when it held at least one row.
    ///
    /// A missing table leaves the current working table in place.
    pub fn reload_dashboard(&mut self) -> bool {
        let name = self.config().default_table.clone();
        match self.controller.load_table(&name) {
            Err(_) => {
                self.info_message = format!(
                    "No database found or table '{}' missing. Please import data.",
                    name
                );
                false
            }
            Ok(table) if table.is_empty() => {
                self.set_working_table(&name, table);
                self.info_message = "Database is empty. Please import an Excel file.".to_string();
                false
            }
            Ok(table) => {
                self.set_working_table(&name, table);
                self.info_message = "Data loaded from database.".to_string();
                true
            }
        }
    }

    // --- file path prompt -------------------------------------------------

    /// Opens the path prompt for importing into `target`.
    pub fn start_import(&mut self, target: Target) {
        self.filename_input = "data.xlsx".to_string();
        self.cursor_position = self.filename_input.len();
        self.mode = AppMode::FileInput(FileAction::Import(target));
    }

    /// Opens the path prompt for exporting `target`.
    pub fn start_export(&mut self, target: Target) {
        self.filename_input = match &target {
            Target::Dashboard => "export.xlsx".to_string(),
            Target::Table(name) => format!("{}_export.xlsx", name),
        };
        self.cursor_position = self.filename_input.len();
        self.mode = AppMode::FileInput(FileAction::Export(target));
    }

    /// Returns the entered path, or the prompt's default when the input is blank.
    pub fn entered_path(&self) -> PathBuf {
        let trimmed = self.filename_input.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
        match &self.mode {
            AppMode::FileInput(FileAction::Export(Target::Table(name))) => {
                PathBuf::from(format!("{}_export.xlsx", name))
            }
            AppMode::FileInput(FileAction::Export(Target::Dashboard)) => PathBuf::from("export.xlsx"),
            _ => PathBuf::from("data.xlsx"),
        }
    }

    /// Accepts the path prompt: imports move on to the mode choice, exports run at once.
    pub fn submit_filename(&mut self) {
        let AppMode::FileInput(action) = self.mode.clone() else {
            return;
        };
        let file = self.entered_path();
        self.clear_filename_input();

        match action {
            FileAction::Import(target) => {
                self.mode = AppMode::ConfirmImport { target, file };
            }
            FileAction::Export(target) => {
                self.mode = target.return_mode();
                let command = match target {
                    Target::Dashboard => Command::Export { file },
                    Target::Table(table) => Command::ExportFromTable { table, file },
                };
                self.execute(command);
            }
        }
    }

    /// Cancels the path prompt and returns to the view that opened it.
    pub fn cancel_filename_input(&mut self) {
        let origin = match &self.mode {
            AppMode::FileInput(FileAction::Import(target) | FileAction::Export(target)) => {
                Some(target.return_mode())
            }
            _ => None,
        };
        if let Some(mode) = origin {
            self.mode = mode;
        }
        self.clear_filename_input();
    }

    fn clear_filename_input(&mut self) {
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// Resolves the replace / append / cancel choice of a pending import.
    pub fn choose_import_mode(&mut self, mode: Option<WriteMode>) {
        let AppMode::ConfirmImport { target, file } = self.mode.clone() else {
            return;
        };
        self.mode = target.return_mode();

        let Some(mode) = mode else {
            match target {
                Target::Dashboard => self.info_message = "Import cancelled.".to_string(),
                Target::Table(_) => self.manager.status = "Import cancelled.".to_string(),
            }
            return;
        };

        let command = match target {
            Target::Dashboard => Command::Import { file, mode },
            Target::Table(table) => Command::ImportToTable { table, file, mode },
        };
        self.execute(command);
    }

    // --- table manager ----------------------------------------------------

    pub fn open_table_manager(&mut self) {
        self.manager = TableManager::default();
        self.mode = AppMode::TableManager;
        self.execute(Command::ShowTables);
    }

    pub fn close_table_manager(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn manager_next(&mut self) {
        if self.manager.tables.is_empty() {
            return;
        }
        let last = self.manager.tables.len() - 1;
        self.manager.selected = Some(match self.manager.selected {
            Some(idx) => (idx + 1).min(last),
            None => 0,
        });
        self.manager.status = "Ready.".to_string();
    }

    pub fn manager_previous(&mut self) {
        if self.manager.tables.is_empty() {
            return;
        }
        self.manager.selected = Some(match self.manager.selected {
            Some(idx) => idx.saturating_sub(1),
            None => 0,
        });
        self.manager.status = "Ready.".to_string();
    }

    /// The highlighted table, or `None` with an error in the manager status.
    pub fn manager_selected_table(&mut self) -> Option<String> {
        let table = self
            .manager
            .selected
            .and_then(|idx| self.manager.tables.get(idx))
            .cloned();
        if table.is_none() {
            self.manager.status = "Error: No table selected!".to_string();
        }
        table
    }

    pub fn manager_import(&mut self) {
        if let Some(table) = self.manager_selected_table() {
            self.start_import(Target::Table(table));
        }
    }

    pub fn manager_export(&mut self) {
        if let Some(table) = self.manager_selected_table() {
            self.start_export(Target::Table(table));
        }
    }

    /// Shows the highlighted table on the dashboard and closes the manager.
    pub fn manager_show_selected(&mut self) {
        if let Some(table) = self.manager_selected_table() {
            self.execute(Command::SelectTable(table));
            self.mode = AppMode::Normal;
        }
    }

    // --- grid navigation --------------------------------------------------

    fn row_count(&self) -> usize {
        self.working_table.as_ref().map(Table::row_count).unwrap_or(0)
    }

    fn column_count(&self) -> usize {
        self.working_table.as_ref().map(Table::column_count).unwrap_or(0)
    }

    pub fn move_up(&mut self, amount: usize) {
        self.selected_row = self.selected_row.saturating_sub(amount);
        self.ensure_cursor_visible();
    }

    pub fn move_down(&mut self, amount: usize) {
        let last = self.row_count().saturating_sub(1);
        self.selected_row = (self.selected_row + amount).min(last);
        self.ensure_cursor_visible();
    }

    pub fn move_left(&mut self) {
        self.selected_col = self.selected_col.saturating_sub(1);
        self.ensure_cursor_visible();
    }

    pub fn move_right(&mut self) {
        let last = self.column_count().saturating_sub(1);
        self.selected_col = (self.selected_col + 1).min(last);
        self.ensure_cursor_visible();
    }

    pub fn move_home(&mut self) {
        self.selected_row = 0;
        self.selected_col = 0;
        self.ensure_cursor_visible();
    }

    pub fn update_viewport_size(&mut self, rows: usize, cols: usize) {
        self.viewport_rows = rows.max(1);
        self.viewport_cols = cols.max(1);
        self.ensure_cursor_visible();
    }

    /// Scrolls so that the highlighted cell is inside the viewport.
    pub fn ensure_cursor_visible(&mut self) {
        if self.selected_row < self.scroll_row {
            self.scroll_row = self.selected_row;
        } else if self.selected_row >= self.scroll_row + self.viewport_rows {
            self.scroll_row = self.selected_row + 1 - self.viewport_rows;
        }

        if self.selected_col < self.scroll_col {
            self.scroll_col = self.selected_col;
        } else if self.selected_col >= self.scroll_col + self.viewport_cols {
            self.scroll_col = self.selected_col + 1 - self.viewport_cols;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use std::fs;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        App::new(Config {
            database_file: dir.path().join("dash.db"),
            target_column: "age".to_string(),
            ..Config::default()
        })
    }

    fn seed(app: &App, dir: &TempDir, table: &str, csv: &str) {
        let path = dir.path().join(format!("{}.csv", table));
        fs::write(&path, csv).unwrap();
        app.controller
            .import_spreadsheet(&path, table, WriteMode::Replace)
            .unwrap();
    }

    #[test]
    fn test_app_new() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.working_table.is_none());
        assert_eq!(app.summary.record_count, "N/A");
        assert_eq!(app.info_message, "Loading data...");
    }

    #[test]
    fn test_reload_missing_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        assert!(!app.reload_dashboard());
        assert_eq!(
            app.info_message,
            "No database found or table 'sales' missing. Please import data."
        );
        assert!(app.working_table.is_none());
    }

    #[test]
    fn test_reload_loads_default_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        seed(&app, &dir, "sales", "name,age\na,10\nb,20\n");

        assert!(app.reload_dashboard());
        assert_eq!(app.info_message, "Data loaded from database.");
        assert_eq!(app.summary.record_count, "Total Records: 2");
        assert_eq!(app.summary.column_sum, "Sum of 'age': 30.00");
        assert!(app.histogram.is_some());
        assert_eq!(app.working_table_name.as_deref(), Some("sales"));
    }

    #[test]
    fn test_failed_reload_keeps_working_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        seed(&app, &dir, "sales", "name,age\na,10\n");
        app.reload_dashboard();
        let before = app.working_table.clone();

        fs::remove_file(dir.path().join("dash.db")).unwrap();
        assert!(!app.reload_dashboard());

        assert_eq!(app.working_table, before);
        assert_eq!(app.summary.record_count, "Total Records: 1");
    }

    #[test]
    fn test_empty_table_becomes_working_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        seed(&app, &dir, "sales", "name,age\n");

        assert!(!app.reload_dashboard());
        assert_eq!(app.info_message, "Database is empty. Please import an Excel file.");
        assert_eq!(app.summary, SummaryResult::default());
        assert!(app.working_table.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_export_prompt_defaults() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        app.start_export(Target::Dashboard);
        assert_eq!(app.filename_input, "export.xlsx");
        assert_eq!(app.cursor_position, "export.xlsx".len());

        app.start_export(Target::Table("sales".to_string()));
        assert_eq!(app.filename_input, "sales_export.xlsx");
        app.filename_input.clear();
        assert_eq!(app.entered_path(), PathBuf::from("sales_export.xlsx"));
    }

    #[test]
    fn test_cancel_prompt_returns_to_origin() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        app.start_import(Target::Dashboard);
        app.cancel_filename_input();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.filename_input.is_empty());

        app.start_import(Target::Table("t".to_string()));
        app.cancel_filename_input();
        assert_eq!(app.mode, AppMode::TableManager);
    }

    #[test]
    fn test_import_flow_cancelled_at_mode_choice() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        app.start_import(Target::Dashboard);
        app.filename_input = "people.csv".to_string();
        app.submit_filename();
        assert_eq!(
            app.mode,
            AppMode::ConfirmImport {
                target: Target::Dashboard,
                file: PathBuf::from("people.csv"),
            }
        );

        app.choose_import_mode(None);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.info_message, "Import cancelled.");
    }

    #[test]
    fn test_import_flow_replace() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let file = dir.path().join("people.csv");
        fs::write(&file, "name,age\na,1\nb,2\nc,3\n").unwrap();

        app.start_import(Target::Dashboard);
        app.filename_input = file.display().to_string();
        app.submit_filename();
        app.choose_import_mode(Some(WriteMode::Replace));

        assert_eq!(app.info_message, "Data replaced successfully.");
        assert_eq!(app.summary.record_count, "Total Records: 3");
        assert_eq!(app.summary.column_sum, "Sum of 'age': 6.00");
    }

    #[test]
    fn test_failed_import_keeps_working_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        seed(&app, &dir, "sales", "name,age\na,10\n");
        app.reload_dashboard();
        let before = app.working_table.clone();

        app.mode = AppMode::ConfirmImport {
            target: Target::Dashboard,
            file: dir.path().join("absent.xlsx"),
        };
        app.choose_import_mode(Some(WriteMode::Append));

        assert!(app.info_message.starts_with("Import Error: "));
        assert_eq!(app.working_table, before);
    }

    #[test]
    fn test_manager_selection() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        seed(&app, &dir, "alpha", "name,age\na,1\n");
        seed(&app, &dir, "beta", "name,age\nb,2\nc,3\n");

        app.open_table_manager();
        assert_eq!(app.mode, AppMode::TableManager);
        assert_eq!(app.manager.tables, vec!["alpha", "beta"]);
        assert_eq!(app.manager.status, "Tables loaded.");

        app.manager_export();
        assert_eq!(app.manager.status, "Error: No table selected!");
        assert_eq!(app.mode, AppMode::TableManager);

        app.manager_next();
        app.manager_next();
        app.manager_next();
        assert_eq!(app.manager.selected, Some(1));
        assert_eq!(app.manager.status, "Ready.");
        app.manager_previous();
        assert_eq!(app.manager.selected, Some(0));
    }

    #[test]
    fn test_manager_show_selected_replaces_working_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        seed(&app, &dir, "beta", "name,age\nb,2\nc,3\n");

        app.open_table_manager();
        app.manager_next();
        app.manager_show_selected();

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.working_table_name.as_deref(), Some("beta"));
        assert_eq!(app.summary.column_sum, "Sum of 'age': 5.00");
    }

    #[test]
    fn test_navigation_clamps_to_table() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        for i in 0..50 {
            table.push_row(vec![Value::Integer(i), Value::Integer(i)]);
        }
        app.set_working_table("sales", table);
        app.update_viewport_size(10, 1);

        app.move_down(100);
        assert_eq!(app.selected_row, 49);
        assert_eq!(app.scroll_row, 40);

        app.move_right();
        app.move_right();
        assert_eq!(app.selected_col, 1);
        assert_eq!(app.scroll_col, 1);

        app.move_home();
        assert_eq!((app.selected_row, app.selected_col), (0, 0));
        assert_eq!((app.scroll_row, app.scroll_col), (0, 0));
    }
}
