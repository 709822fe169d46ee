//! Plan registry — fixed quota ceilings per plan tier.
//!
//! Plan limits are compiled-in reference data. Only the assignment of a
//! plan to an account changes at runtime (on payment); the guest path
//! never depends on durable storage.

use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::plan::{PlanId, PlanLimits};
use tessera_core::models::subject::Subject;
use tessera_core::repository::AccountRepository;

/// Ceilings for anonymous guests.
pub const GUEST_LIMITS: PlanLimits = PlanLimits {
    companies_count: 2,
    contacts_count: 25,
    notes_count: 25,
    tiles_count: 10,
    tile_chats_count: 20,
    contact_chats_count: 20,
    regenerations_count: 5,
    assets_count: 10,
    tokens_used: 100_000,
};

pub const MEMBER_LIMITS: PlanLimits = PlanLimits {
    companies_count: 10,
    contacts_count: 500,
    notes_count: 500,
    tiles_count: 100,
    tile_chats_count: 500,
    contact_chats_count: 500,
    regenerations_count: 50,
    assets_count: 100,
    tokens_used: 2_000_000,
};

pub const BUSINESS_LIMITS: PlanLimits = PlanLimits {
    companies_count: 50,
    contacts_count: 5_000,
    notes_count: 5_000,
    tiles_count: 1_000,
    tile_chats_count: 5_000,
    contact_chats_count: 5_000,
    regenerations_count: 500,
    assets_count: 1_000,
    tokens_used: 20_000_000,
};

/// Quota ceilings for a plan.
pub fn limits_for(plan: PlanId) -> PlanLimits {
    match plan {
        PlanId::Guest => GUEST_LIMITS,
        PlanId::Member => MEMBER_LIMITS,
        PlanId::Business => BUSINESS_LIMITS,
    }
}

/// Resolves which plan a subject currently has.
#[derive(Clone)]
pub struct PlanRegistry<A: AccountRepository> {
    accounts: A,
}

impl<A: AccountRepository> PlanRegistry<A> {
    pub fn new(accounts: A) -> Self {
        Self { accounts }
    }

    /// The subject's current plan.
    ///
    /// Guests always get `PlanId::Guest` without any storage lookup.
    /// A member without an account record defaults to `PlanId::Member` —
    /// an authenticated identity is never treated as guest-tier.
    pub async fn plan_for(&self, subject: &Subject) -> TesseraResult<PlanId> {
        match subject {
            Subject::Guest { .. } => Ok(PlanId::Guest),
            Subject::Member { member_id } => match self.accounts.get_by_id(*member_id).await {
                Ok(account) => Ok(account.plan),
                Err(TesseraError::NotFound { .. }) => Ok(PlanId::Member),
                Err(e) => Err(e),
            },
        }
    }

    /// Convenience: the ceilings for the subject's current plan.
    pub async fn limits_for_subject(&self, subject: &Subject) -> TesseraResult<PlanLimits> {
        Ok(limits_for(self.plan_for(subject).await?))
    }
}
