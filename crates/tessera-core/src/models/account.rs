//! Account domain model.
//!
//! An account is the durable record for an authenticated member. Its id
//! is the member UUID issued by the external identity provider; the
//! email carries a unique index and acts as the merge key when payment
//! reconciliation encounters a duplicate identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::PlanId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Member UUID from the external identity provider.
    pub id: Uuid,
    /// Unique across all accounts — the reconciliation merge key.
    pub email: String,
    pub name: Option<String>,
    /// Set on first completed checkout.
    pub is_member: bool,
    pub plan: PlanId,
    /// Payment-provider customer id, once known.
    pub stripe_customer_id: Option<String>,
    /// Signals the client to upload its guest snapshot for migration.
    pub migration_needed: bool,
    /// Caller-side idempotency guard: set after the first successful
    /// migration run so retries do not duplicate data.
    pub migration_completed: bool,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Externally-issued member UUID.
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub plan: PlanId,
    pub stripe_customer_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Fields that can be updated on an existing account.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub is_member: Option<bool>,
    pub plan: Option<PlanId>,
    /// `Some(Some(v))` = set, `Some(None)` = clear, `None` = no change.
    pub stripe_customer_id: Option<Option<String>>,
    pub migration_needed: Option<bool>,
    pub migration_completed: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}
