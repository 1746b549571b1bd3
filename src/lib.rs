//! XLDASH - Excel Dashboard Library
//!
//! Imports spreadsheets into a SQLite database, exports tables back out, and
//! summarizes a configured numeric column as a record count, a sum and a histogram.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
