//! Counter-store contract and quota key builders.
//!
//! Counters live in a shared, network-accessible store so multiple
//! server instances observe consistent counts. Keys are namespaced
//! strings composed of subject kind, subject id, and quota kind.

use uuid::Uuid;

use crate::error::TesseraResult;
use crate::models::plan::QuotaKind;

/// A shared counter store with atomic increment and key expiry.
pub trait QuotaStore: Send + Sync {
    /// Current value, or `None` if the key is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = TesseraResult<Option<u64>>> + Send;

    /// Atomically add `amount` (which may be negative) and return the
    /// new value. Values are clamped at zero.
    fn increment(&self, key: &str, amount: i64) -> impl Future<Output = TesseraResult<u64>> + Send;

    /// Set the key to expire `ttl_secs` from now. Re-arming on every
    /// write gives "expires N seconds after last write" semantics.
    fn expire(&self, key: &str, ttl_secs: u64) -> impl Future<Output = TesseraResult<()>> + Send;
}

/// Counter key for a guest's cookie identity.
pub fn guest_usage_key(guest_id: &str, kind: QuotaKind) -> String {
    format!("guest:{guest_id}:usage:{}", kind.as_str())
}

/// Shadow counter key for a guest's source IP. Effective guest usage is
/// the max of the cookie-identity and IP counters, so discarding the
/// cookie alone does not reset usage.
pub fn guest_ip_usage_key(ip: &str, kind: QuotaKind) -> String {
    format!("guest_ip:{ip}:usage:{}", kind.as_str())
}

/// Counter key for a member's persistent usage.
pub fn member_usage_key(member_id: Uuid, kind: QuotaKind) -> String {
    format!("member:{member_id}:usage:{}", kind.as_str())
}
