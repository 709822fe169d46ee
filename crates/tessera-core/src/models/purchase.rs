//! Purchase ledger model.
//!
//! The ledger is append-only: one record per completed checkout,
//! deduplicated by the provider session id before insertion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::PlanId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Payment-provider checkout session id (unique).
    pub session_id: String,
    pub customer_id: String,
    /// Amount in the currency's minor units.
    pub amount: i64,
    pub currency: String,
    pub plan: PlanId,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to append a ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchase {
    pub account_id: Uuid,
    pub session_id: String,
    pub customer_id: String,
    pub amount: i64,
    pub currency: String,
    pub plan: PlanId,
    pub status: String,
}
