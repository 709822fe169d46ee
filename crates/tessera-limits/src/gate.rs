//! Usage enforcement gate.
//!
//! The policy layer: given a subject and a quota kind, decides
//! allow/deny by comparing current usage (counter store) against the
//! plan ceiling (plan registry), and performs the post-action
//! increment.
//!
//! `check_limit` and `increment_usage` are separate calls: the check
//! happens before a potentially expensive, fallible action (an LLM
//! call), the increment only after that action succeeds. Two concurrent
//! requests from the same subject can therefore both pass the check
//! before either increments — a bounded, accepted overshoot.
//! `try_reserve` is the stricter atomic alternative for cheap actions.

use serde::{Deserialize, Serialize};
use tessera_core::error::TesseraResult;
use tessera_core::models::plan::{PlanId, PlanLimits, QuotaKind};
use tessera_core::models::subject::Subject;
use tessera_core::quota::{QuotaStore, guest_ip_usage_key, guest_usage_key, member_usage_key};
use tessera_core::repository::AccountRepository;
use tracing::warn;

use crate::config::LimitsConfig;
use crate::cookie::SetCookie;
use crate::identity::GuestIdentity;
use crate::plan::{GUEST_LIMITS, PlanRegistry, limits_for};

/// Outcome of a limit check. "Limit reached" is a normal, expected
/// outcome, not an error.
#[derive(Debug, Clone)]
pub struct LimitCheck {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl LimitCheck {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Outcome of a guest limit check, carrying the "must set cookie"
/// side-effect instruction through to the caller.
#[derive(Debug, Clone)]
pub struct GuestLimitCheck {
    pub allowed: bool,
    pub reason: Option<String>,
    pub set_cookie: Option<SetCookie>,
}

/// The usage inspection payload: current usage next to the ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub usage: PlanLimits,
    pub limits: PlanLimits,
    pub plan: PlanId,
    pub is_member: bool,
}

fn deny_reason(kind: QuotaKind, used: u64, requested: u64, maximum: u64) -> String {
    format!("{kind} limit reached: used {used} of {maximum} (requested {requested})")
}

/// The usage enforcement gate.
pub struct UsageGate<Q: QuotaStore, A: AccountRepository> {
    store: Q,
    registry: PlanRegistry<A>,
    config: LimitsConfig,
}

impl<Q: QuotaStore, A: AccountRepository> UsageGate<Q, A> {
    pub fn new(store: Q, registry: PlanRegistry<A>, config: LimitsConfig) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    /// Check whether the subject may perform one action of `kind`.
    ///
    /// Counter-store failures fail open for guests unconditionally; for
    /// members the behavior follows `LimitsConfig::fail_open`.
    pub async fn check_limit(&self, subject: &Subject, kind: QuotaKind) -> TesseraResult<LimitCheck> {
        match subject {
            Subject::Guest { guest_id, ip } => {
                let ceiling = GUEST_LIMITS.ceiling(kind);
                let current = match self.guest_effective_usage(guest_id, ip, kind).await {
                    Some(current) => current,
                    // Store unreachable — guests fail open.
                    None => return Ok(LimitCheck::allow()),
                };
                if current + 1 <= ceiling {
                    Ok(LimitCheck::allow())
                } else {
                    Ok(LimitCheck::deny(deny_reason(kind, current, 1, ceiling)))
                }
            }
            Subject::Member { member_id } => {
                let ceiling = self.registry.limits_for_subject(subject).await?.ceiling(kind);
                let key = member_usage_key(*member_id, kind);
                let current = match self.store.get(&key).await {
                    Ok(value) => value.unwrap_or(0),
                    Err(e) if self.config.fail_open => {
                        warn!(
                            subject = %subject.id_string(),
                            kind = %kind,
                            error = %e,
                            "counter store unavailable — failing open"
                        );
                        return Ok(LimitCheck::allow());
                    }
                    Err(e) => return Err(e),
                };
                if current + 1 <= ceiling {
                    Ok(LimitCheck::allow())
                } else {
                    Ok(LimitCheck::deny(deny_reason(kind, current, 1, ceiling)))
                }
            }
        }
    }

    /// Check a guest action against the dual cookie/IP counters.
    ///
    /// Structurally separate from [`check_limit`](Self::check_limit):
    /// it takes the resolved guest identity directly, accepts an
    /// explicit `requested` amount so batch operations can pre-check a
    /// bulk-sized increment in one call, and carries the set-cookie
    /// instruction through. Never fails — store outages fail open.
    pub async fn check_guest_limit(
        &self,
        guest: &GuestIdentity,
        kind: QuotaKind,
        requested: u64,
    ) -> GuestLimitCheck {
        let ceiling = GUEST_LIMITS.ceiling(kind);
        let set_cookie = guest.set_cookie.clone();

        let effective = match self
            .guest_effective_usage(&guest.guest_id, &guest.ip, kind)
            .await
        {
            Some(effective) => effective,
            None => {
                return GuestLimitCheck {
                    allowed: true,
                    reason: None,
                    set_cookie,
                };
            }
        };

        if effective + requested <= ceiling {
            GuestLimitCheck {
                allowed: true,
                reason: None,
                set_cookie,
            }
        } else {
            GuestLimitCheck {
                allowed: false,
                reason: Some(deny_reason(kind, effective, requested, ceiling)),
                set_cookie,
            }
        }
    }

    /// Record usage after the action succeeded.
    ///
    /// Guests write both the cookie-identity counter and the IP shadow
    /// counter, then re-arm the retention window on each.
    pub async fn increment_usage(
        &self,
        subject: &Subject,
        kind: QuotaKind,
        amount: u64,
    ) -> TesseraResult<()> {
        match subject {
            Subject::Member { member_id } => {
                let key = member_usage_key(*member_id, kind);
                match self.store.increment(&key, amount as i64).await {
                    Ok(_) => Ok(()),
                    Err(e) if self.config.fail_open => {
                        warn!(
                            subject = %subject.id_string(),
                            kind = %kind,
                            error = %e,
                            "counter store unavailable — usage not recorded"
                        );
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Subject::Guest { guest_id, ip } => {
                let cookie_key = guest_usage_key(guest_id, kind);
                let ip_key = guest_ip_usage_key(ip, kind);
                for key in [&cookie_key, &ip_key] {
                    if let Err(e) = self.store.increment(key, amount as i64).await {
                        warn!(
                            subject = %guest_id,
                            kind = %kind,
                            error = %e,
                            "counter store unavailable — guest usage not recorded"
                        );
                        return Ok(());
                    }
                    if let Err(e) = self.store.expire(key, self.config.guest_retention_secs).await {
                        warn!(
                            subject = %guest_id,
                            kind = %kind,
                            error = %e,
                            "failed to re-arm guest counter retention"
                        );
                    }
                }
                Ok(())
            }
        }
    }

    /// Atomic conditional increment: reserve `amount` up front, and
    /// roll the increment back if it overshot the ceiling.
    ///
    /// Unlike the check/increment pair this cannot overshoot under
    /// concurrency, so it is the right call for cheap actions (entity
    /// creation) where no expensive step sits between check and commit.
    pub async fn try_reserve(
        &self,
        subject: &Subject,
        kind: QuotaKind,
        amount: u64,
    ) -> TesseraResult<LimitCheck> {
        let ceiling = self.registry.limits_for_subject(subject).await?.ceiling(kind);

        match subject {
            Subject::Member { member_id } => {
                let key = member_usage_key(*member_id, kind);
                let new = match self.store.increment(&key, amount as i64).await {
                    Ok(new) => new,
                    Err(e) if self.config.fail_open => {
                        warn!(
                            subject = %subject.id_string(),
                            kind = %kind,
                            error = %e,
                            "counter store unavailable — failing open"
                        );
                        return Ok(LimitCheck::allow());
                    }
                    Err(e) => return Err(e),
                };

                if new > ceiling {
                    self.rollback(&key, amount).await;
                    Ok(LimitCheck::deny(deny_reason(
                        kind,
                        new - amount,
                        amount,
                        ceiling,
                    )))
                } else {
                    Ok(LimitCheck::allow())
                }
            }
            Subject::Guest { guest_id, ip } => {
                let cookie_key = guest_usage_key(guest_id, kind);
                let ip_key = guest_ip_usage_key(ip, kind);

                let (new_cookie, new_ip) = match (
                    self.store.increment(&cookie_key, amount as i64).await,
                    self.store.increment(&ip_key, amount as i64).await,
                ) {
                    (Ok(a), Ok(b)) => (a, b),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!(
                            subject = %guest_id,
                            kind = %kind,
                            error = %e,
                            "counter store unavailable — failing open"
                        );
                        return Ok(LimitCheck::allow());
                    }
                };

                let effective = new_cookie.max(new_ip);
                if effective > ceiling {
                    self.rollback(&cookie_key, amount).await;
                    self.rollback(&ip_key, amount).await;
                    Ok(LimitCheck::deny(deny_reason(
                        kind,
                        effective.saturating_sub(amount),
                        amount,
                        ceiling,
                    )))
                } else {
                    for key in [&cookie_key, &ip_key] {
                        if let Err(e) =
                            self.store.expire(key, self.config.guest_retention_secs).await
                        {
                            warn!(error = %e, "failed to re-arm guest counter retention");
                        }
                    }
                    Ok(LimitCheck::allow())
                }
            }
        }
    }

    /// Current usage, ceilings, and plan for the subject.
    pub async fn usage_snapshot(&self, subject: &Subject) -> TesseraResult<UsageSnapshot> {
        let plan = self.registry.plan_for(subject).await?;
        let limits = limits_for(plan);

        let mut usage = PlanLimits::default();
        for kind in QuotaKind::ALL {
            let value = match subject {
                Subject::Guest { guest_id, ip } => self
                    .guest_effective_usage(guest_id, ip, kind)
                    .await
                    .unwrap_or(0),
                Subject::Member { member_id } => {
                    match self.store.get(&member_usage_key(*member_id, kind)).await {
                        Ok(value) => value.unwrap_or(0),
                        Err(e) if self.config.fail_open => {
                            warn!(
                                subject = %subject.id_string(),
                                kind = %kind,
                                error = %e,
                                "counter store unavailable — reporting zero usage"
                            );
                            0
                        }
                        Err(e) => return Err(e),
                    }
                }
            };
            usage.set(kind, value);
        }

        Ok(UsageSnapshot {
            usage,
            limits,
            plan,
            is_member: subject.is_member(),
        })
    }

    /// Effective guest usage: the max of the cookie-identity and IP
    /// counters, so discarding the cookie alone cannot reset usage.
    /// `None` means the store was unreachable (callers fail open).
    async fn guest_effective_usage(
        &self,
        guest_id: &str,
        ip: &str,
        kind: QuotaKind,
    ) -> Option<u64> {
        let cookie_key = guest_usage_key(guest_id, kind);
        let ip_key = guest_ip_usage_key(ip, kind);

        match (
            self.store.get(&cookie_key).await,
            self.store.get(&ip_key).await,
        ) {
            (Ok(cookie_count), Ok(ip_count)) => {
                Some(cookie_count.unwrap_or(0).max(ip_count.unwrap_or(0)))
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    subject = %guest_id,
                    kind = %kind,
                    error = %e,
                    "counter store unavailable — failing open for guest"
                );
                None
            }
        }
    }

    async fn rollback(&self, key: &str, amount: u64) {
        if let Err(e) = self.store.increment(key, -(amount as i64)).await {
            warn!(key, error = %e, "failed to roll back rejected reservation");
        }
    }
}
