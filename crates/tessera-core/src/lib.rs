//! Tessera Core — domain models, error taxonomy, and the repository /
//! counter-store trait definitions shared across all crates.

pub mod error;
pub mod models;
pub mod quota;
pub mod repository;

pub use error::{TesseraError, TesseraResult};
