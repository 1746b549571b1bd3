//! XLDASH - Excel Dashboard
//!
//! Imports Excel and CSV files into a SQLite database and shows the stored
//! data in a terminal dashboard: the table itself, its record count, the sum
//! of a configured column and a histogram of that column. The same import,
//! export and summary routines are available as headless subcommands.

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use tracing_subscriber::EnvFilter;

use xldash::application::{App, AppMode, Command, DataController};
use xldash::infrastructure::Config;
use xldash::presentation::{grid_viewport, render_ui, run_command, Cli, InputHandler};

/// Entry point for the dashboard.
///
/// Loads the configuration, then either runs a headless subcommand or sets up
/// the terminal interface and runs the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the configuration is malformed, if a headless
/// subcommand fails, or if terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.apply_overrides(Config::load(&cli.config)?);

    if let Some(command) = &cli.command {
        init_logging(LogTarget::Stderr)?;
        let controller = DataController::new(config);
        match run_command(&controller, command, &cli.config) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    if let Some(path) = &config.log_file {
        init_logging(LogTarget::File(path))?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    app.execute(Command::Reload);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

enum LogTarget<'a> {
    Stderr,
    File(&'a std::path::Path),
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
fn init_logging(target: LogTarget) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
    }
    Ok(())
}

/// Main application event loop.
///
/// Keeps the grid viewport in step with the terminal size, renders the
/// dashboard and dispatches key presses. Continues running until the user
/// presses 'q' in normal mode.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        let size = terminal.size()?;
        let (rows, cols) = grid_viewport(Rect::new(0, 0, size.width, size.height), app);
        app.update_viewport_size(rows, cols);

        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
