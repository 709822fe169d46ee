//! Payment provider contract.
//!
//! The provider integration is deliberately narrow: checkout produces a
//! paid session carrying a plan and a customer identifier. Everything
//! else about the provider's wire protocol stays behind this trait.

use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// Payment state of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    /// Zero-amount checkouts (e.g. a 100% discount) complete without a
    /// payment and still grant the plan.
    NoPaymentRequired,
}

impl PaymentStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::NoPaymentRequired)
    }
}

/// A resolved checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub payment_status: PaymentStatus,
    /// Provider customer id (`cus_…`).
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    /// Subject reference embedded at checkout-creation time; supports
    /// pay-before-sign-up flows where no session cookie exists yet.
    pub client_reference_id: Option<String>,
    /// Price the customer paid for (`price_…`).
    pub price_id: Option<String>,
    /// Explicit plan override from checkout metadata.
    pub plan_override: Option<String>,
    /// Amount in the currency's minor units.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

/// Resolves checkout sessions from the payment provider.
pub trait PaymentProvider: Send + Sync {
    /// Fetch a checkout session by id. `Ok(None)` means the provider
    /// does not know the session.
    fn fetch_checkout_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<CheckoutSession>, BillingError>> + Send;
}
