//! Infrastructure layer providing external service integrations.
//!
//! This module contains the SQLite table store, the spreadsheet file codec
//! and configuration loading.

pub mod config;
pub mod spreadsheet;
pub mod store;

pub use config::*;
pub use spreadsheet::*;
pub use store::*;
