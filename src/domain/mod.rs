pub mod models;
pub mod summary;
pub mod histogram;
pub mod errors;

pub use models::*;
pub use summary::*;
pub use histogram::*;
pub use errors::*;
