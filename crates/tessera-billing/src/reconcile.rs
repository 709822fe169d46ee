//! Payment-to-account reconciliation.
//!
//! Consumes a completed checkout session and durably links it to a
//! member account: upserts the account (merging by email when the
//! provider customer's email already belongs to a different record),
//! grants the purchased plan, flags the client-side migration, and
//! appends a purchase ledger entry.

use serde::{Deserialize, Serialize};
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::account::{Account, CreateAccount, UpdateAccount};
use tessera_core::models::plan::{PlanId, PlanLimits};
use tessera_core::models::purchase::CreatePurchase;
use tessera_core::repository::{AccountRepository, PurchaseRepository};
use tessera_limits::plan::limits_for;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::BillingError;
use crate::provider::{CheckoutSession, PaymentProvider};

/// Billing configuration: how checkout prices map onto plans.
#[derive(Debug, Clone, Default)]
pub struct BillingConfig {
    /// Price id granting the `member` plan.
    pub member_price_id: String,
    /// Price id granting the `business` plan, if sold.
    pub business_price_id: Option<String>,
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub member_id: Uuid,
    pub plan: PlanId,
    pub limits: PlanLimits,
}

/// Links completed checkouts to durable accounts.
pub struct ReconciliationService<P, A, L>
where
    P: PaymentProvider,
    A: AccountRepository,
    L: PurchaseRepository,
{
    provider: P,
    accounts: A,
    purchases: L,
    config: BillingConfig,
}

impl<P, A, L> ReconciliationService<P, A, L>
where
    P: PaymentProvider,
    A: AccountRepository,
    L: PurchaseRepository,
{
    pub fn new(provider: P, accounts: A, purchases: L, config: BillingConfig) -> Self {
        Self {
            provider,
            accounts,
            purchases,
            config,
        }
    }

    /// Reconcile a checkout session with the account store.
    ///
    /// `authenticated` is the currently signed-in member, if any; a
    /// session reference embedded at checkout-creation time serves as
    /// the fallback for pay-before-sign-up flows.
    pub async fn reconcile(
        &self,
        session_id: Option<&str>,
        authenticated: Option<Uuid>,
    ) -> TesseraResult<ReconcileOutcome> {
        // 1. A session reference is required.
        let session_id = session_id
            .filter(|id| !id.is_empty())
            .ok_or(BillingError::MissingSession)?;

        // 2. Resolve the session and require a completed payment.
        let session = self
            .provider
            .fetch_checkout_session(session_id)
            .await
            .map_err(TesseraError::from)?
            .ok_or_else(|| BillingError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;

        if !session.payment_status.is_complete() {
            return Err(BillingError::PaymentNotCompleted {
                session_id: session_id.to_string(),
            }
            .into());
        }

        // 3. Target subject: the authenticated identity wins, else the
        //    reference embedded in the session.
        let target = authenticated
            .or_else(|| {
                session
                    .client_reference_id
                    .as_deref()
                    .and_then(|reference| Uuid::parse_str(reference).ok())
            })
            .ok_or(BillingError::MissingSubject)?;

        // 4. Which plan did the customer buy?
        let plan = self.plan_from_session(&session);

        // 5. Upsert the account, merging by email on conflict.
        let account = self.upsert_account(target, &session, plan).await?;

        // 6. Ledger entry — best effort, never fails the reconciliation.
        self.record_purchase(&account, &session, plan).await;

        Ok(ReconcileOutcome {
            member_id: account.id,
            plan,
            limits: limits_for(plan),
        })
    }

    /// Derive the granted plan: explicit metadata override first, then
    /// price-id match, defaulting to the basic member tier.
    fn plan_from_session(&self, session: &CheckoutSession) -> PlanId {
        if let Some(plan) = session.plan_override.as_deref().and_then(PlanId::parse) {
            if plan != PlanId::Guest {
                return plan;
            }
        }

        if let Some(price_id) = &session.price_id {
            if self.config.business_price_id.as_deref() == Some(price_id.as_str()) {
                return PlanId::Business;
            }
            if *price_id == self.config.member_price_id {
                return PlanId::Member;
            }
        }

        PlanId::Member
    }

    async fn upsert_account(
        &self,
        target: Uuid,
        session: &CheckoutSession,
        plan: PlanId,
    ) -> TesseraResult<Account> {
        let membership = UpdateAccount {
            is_member: Some(true),
            plan: Some(plan),
            stripe_customer_id: session.customer_id.clone().map(Some),
            migration_needed: Some(true),
            ..Default::default()
        };

        match self.accounts.get_by_id(target).await {
            Ok(_) => self.accounts.update(target, membership).await,
            Err(TesseraError::NotFound { .. }) => {
                // New account from the session's customer details. The
                // email is required — it carries the unique index.
                let email = session.customer_email.clone().ok_or_else(|| {
                    BillingError::Provider("checkout session has no customer email".into())
                })?;

                match self
                    .accounts
                    .create(CreateAccount {
                        id: target,
                        email: email.clone(),
                        name: None,
                        plan,
                        stripe_customer_id: session.customer_id.clone(),
                        metadata: None,
                    })
                    .await
                {
                    Ok(created) => self.accounts.update(created.id, membership).await,
                    Err(TesseraError::AlreadyExists { .. }) => {
                        // The email already belongs to a different
                        // account — merge into it instead of creating a
                        // duplicate identity.
                        let existing = self.accounts.get_by_email(&email).await?;
                        debug!(
                            target = %target,
                            existing = %existing.id,
                            "duplicate email — merging membership into existing account"
                        );
                        self.accounts.update(existing.id, membership).await
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Append a ledger entry unless one already exists for this
    /// session. Ledger failures log and are otherwise ignored.
    async fn record_purchase(&self, account: &Account, session: &CheckoutSession, plan: PlanId) {
        match self.purchases.get_by_session_id(&session.id).await {
            Ok(_) => {
                debug!(session = %session.id, "purchase already recorded");
                return;
            }
            Err(TesseraError::NotFound { .. }) => {}
            Err(e) => {
                warn!(session = %session.id, error = %e, "purchase ledger lookup failed");
                return;
            }
        }

        let entry = CreatePurchase {
            account_id: account.id,
            session_id: session.id.clone(),
            customer_id: session.customer_id.clone().unwrap_or_default(),
            amount: session.amount_total.unwrap_or(0),
            currency: session.currency.clone().unwrap_or_else(|| "usd".into()),
            plan,
            status: "complete".into(),
        };

        if let Err(e) = self.purchases.append(entry).await {
            warn!(session = %session.id, error = %e, "failed to record purchase");
        }
    }
}
