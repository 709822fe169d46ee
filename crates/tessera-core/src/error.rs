//! Error types for the Tessera system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TesseraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Quota exceeded: {reason}")]
    QuotaExceeded { reason: String },

    #[error("Payment required: {reason}")]
    PaymentRequired { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Counter store error: {0}")]
    CounterStore(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TesseraResult<T> = Result<T, TesseraError>;
