//! Tessera Database — SurrealDB connection management, schema
//! migrations, and repository / counter-store implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations for the `tessera-core` traits
//! - [`repository::SurrealQuotaStore`], the shared usage-counter store
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
