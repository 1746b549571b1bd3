//! Presentation layer handling terminal UI, user input and the command line.
//!
//! This module manages the terminal user interface using ratatui,
//! handles keyboard input, renders the dashboard and parses CLI arguments.

pub mod cli;
pub mod ui;
pub mod input;

pub use cli::*;
pub use ui::*;
pub use input::*;
