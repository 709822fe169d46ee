//! Billing error types.

use tessera_core::error::TesseraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("no checkout session id was provided")]
    MissingSession,

    #[error("checkout session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("checkout session is not paid: {session_id}")]
    PaymentNotCompleted { session_id: String },

    #[error("no subject: not authenticated and no reference embedded in the session")]
    MissingSubject,

    #[error("payment provider error: {0}")]
    Provider(String),
}

impl From<BillingError> for TesseraError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::MissingSession | BillingError::MissingSubject => {
                TesseraError::Validation {
                    message: err.to_string(),
                }
            }
            BillingError::SessionNotFound { session_id } => TesseraError::NotFound {
                entity: "checkout session".into(),
                id: session_id,
            },
            BillingError::PaymentNotCompleted { .. } => TesseraError::PaymentRequired {
                reason: err.to_string(),
            },
            BillingError::Provider(msg) => TesseraError::Internal(msg),
        }
    }
}
