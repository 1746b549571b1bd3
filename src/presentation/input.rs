use crate::application::{App, AppMode, Command, Target};
use crate::domain::WriteMode;
use crossterm::event::{KeyCode, KeyModifiers};

/// Rows moved by PageUp / PageDown in the grid.
const PAGE_ROWS: usize = 10;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::FileInput(_) => Self::handle_filename_input_mode(app, key),
            AppMode::ConfirmImport { .. } => Self::handle_confirm_import_mode(app, key),
            AppMode::TableManager => Self::handle_table_manager_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.move_up(1),
            KeyCode::Down | KeyCode::Char('j') => app.move_down(1),
            KeyCode::Left | KeyCode::Char('h') => app.move_left(),
            KeyCode::Right | KeyCode::Char('l') => app.move_right(),
            KeyCode::PageUp => app.move_up(PAGE_ROWS),
            KeyCode::PageDown => app.move_down(PAGE_ROWS),
            KeyCode::Home => app.move_home(),
            KeyCode::Char('i') => app.start_import(Target::Dashboard),
            KeyCode::Char('e') => app.start_export(Target::Dashboard),
            KeyCode::Char('t') => app.open_table_manager(),
            KeyCode::Char('r') => {
                app.execute(Command::Reload);
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.submit_filename(),
            KeyCode::Esc => app.cancel_filename_input(),
            KeyCode::Backspace => {
                if let Some(c) = app.filename_input[..app.cursor_position].chars().next_back() {
                    app.cursor_position -= c.len_utf8();
                    app.filename_input.remove(app.cursor_position);
                }
            }
            KeyCode::Delete => {
                if app.cursor_position < app.filename_input.len() {
                    app.filename_input.remove(app.cursor_position);
                }
            }
            KeyCode::Left => {
                if let Some(c) = app.filename_input[..app.cursor_position].chars().next_back() {
                    app.cursor_position -= c.len_utf8();
                }
            }
            KeyCode::Right => {
                if let Some(c) = app.filename_input[app.cursor_position..].chars().next() {
                    app.cursor_position += c.len_utf8();
                }
            }
            KeyCode::Home => {
                app.cursor_position = 0;
            }
            KeyCode::End => {
                app.cursor_position = app.filename_input.len();
            }
            KeyCode::Char(c) => {
                app.filename_input.insert(app.cursor_position, c);
                app.cursor_position += c.len_utf8();
            }
            _ => {}
        }
    }

    fn handle_confirm_import_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('r') | KeyCode::Char('R') => app.choose_import_mode(Some(WriteMode::Replace)),
            KeyCode::Char('a') | KeyCode::Char('A') => app.choose_import_mode(Some(WriteMode::Append)),
            KeyCode::Esc | KeyCode::Char('c') => app.choose_import_mode(None),
            _ => {}
        }
    }

    fn handle_table_manager_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => app.manager_previous(),
            KeyCode::Down | KeyCode::Char('j') => app.manager_next(),
            KeyCode::Enter => app.manager_show_selected(),
            KeyCode::Char('i') => app.manager_import(),
            KeyCode::Char('e') => app.manager_export(),
            KeyCode::Char('r') => {
                app.execute(Command::ShowTables);
            }
            KeyCode::Esc | KeyCode::Char('q') => app.close_table_manager(),
            _ => {}
        }
    }
}
