//! Subject — the identity a request acts as.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The resolved identity of the current caller.
///
/// A member is an authenticated user with a stable UUID issued by the
/// external identity provider. A guest is identified only by a signed
/// cookie token plus the request's source IP; the IP is carried so that
/// enforcement can correlate usage across cookie resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Member { member_id: Uuid },
    Guest { guest_id: String, ip: String },
}

impl Subject {
    pub fn is_member(&self) -> bool {
        matches!(self, Subject::Member { .. })
    }

    /// Stable string form used in log context.
    pub fn id_string(&self) -> String {
        match self {
            Subject::Member { member_id } => member_id.to_string(),
            Subject::Guest { guest_id, .. } => guest_id.clone(),
        }
    }
}
