//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! managing application state, user commands, and the import/export routines.

pub mod commands;
pub mod controller;
pub mod state;

pub use commands::*;
pub use controller::*;
pub use state::*;
