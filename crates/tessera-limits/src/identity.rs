//! Identity resolution.
//!
//! Determines whether the current caller is an authenticated member
//! (stable user id from the external identity provider) or an anonymous
//! guest (derived from the signed cookie token, correlated with the
//! client IP).

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tessera_core::models::subject::Subject;
use uuid::Uuid;

use crate::config::LimitsConfig;
use crate::cookie::{self, SetCookie};

/// The request-level inputs identity resolution needs.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// Bearer session token from the identity provider, if present.
    pub session_token: Option<&'a str>,
    /// Raw value of the guest cookie, if present.
    pub guest_cookie: Option<&'a str>,
    /// Client source IP.
    pub ip: &'a str,
}

/// A resolved guest, with the optional "must set cookie" instruction.
#[derive(Debug, Clone)]
pub struct GuestIdentity {
    pub guest_id: String,
    pub ip: String,
    /// Present when a fresh guest id was minted; the caller must attach
    /// the Set-Cookie header to its response.
    pub set_cookie: Option<SetCookie>,
}

/// The resolved identity of the current caller.
#[derive(Debug, Clone)]
pub enum Identity {
    Member { member_id: Uuid },
    Guest(GuestIdentity),
}

impl Identity {
    pub fn subject(&self) -> Subject {
        match self {
            Identity::Member { member_id } => Subject::Member {
                member_id: *member_id,
            },
            Identity::Guest(guest) => Subject::Guest {
                guest_id: guest.guest_id.clone(),
                ip: guest.ip.clone(),
            },
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self, Identity::Member { .. })
    }
}

/// Session claims issued by the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    /// Subject — member ID (UUID string).
    sub: String,
    /// Issuer.
    iss: String,
    /// Issued-at (Unix timestamp).
    iat: i64,
    /// Expiration (Unix timestamp).
    exp: i64,
}

/// Resolves the caller's identity from request inputs.
///
/// Resolution never fails: a missing or invalid session falls through
/// to the guest path, and a missing or tampered guest cookie mints a
/// fresh guest id. Signature mismatches are treated exactly like an
/// absent cookie so the resolver cannot be used as a forgery oracle.
pub struct IdentityResolver {
    config: LimitsConfig,
}

impl IdentityResolver {
    pub fn new(config: LimitsConfig) -> Self {
        Self { config }
    }

    /// Resolve the caller to a member or guest identity.
    pub fn resolve(&self, request: &RequestContext<'_>) -> Identity {
        if let Some(token) = request.session_token {
            if let Some(member_id) = self.verify_member_session(token) {
                return Identity::Member { member_id };
            }
        }

        Identity::Guest(self.resolve_guest(request.guest_cookie, request.ip))
    }

    /// Verify a session token from the identity provider. Any failure
    /// (bad signature, expiry, wrong issuer, non-UUID subject) yields
    /// `None` and the caller falls through to the guest path.
    fn verify_member_session(&self, token: &str) -> Option<Uuid> {
        let key = DecodingKey::from_secret(self.config.idp_shared_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.idp_issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        let claims = jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
            .map(|data| data.claims)
            .ok()?;

        Uuid::parse_str(&claims.sub).ok()
    }

    fn resolve_guest(&self, guest_cookie: Option<&str>, ip: &str) -> GuestIdentity {
        if let Some(raw) = guest_cookie {
            if let Some(guest_id) = cookie::verify_guest_token(&self.config.cookie_secret, raw) {
                return GuestIdentity {
                    guest_id,
                    ip: ip.to_string(),
                    set_cookie: None,
                };
            }
        }

        let (guest_id, token) = cookie::mint_guest_token(&self.config.cookie_secret);
        GuestIdentity {
            guest_id,
            ip: ip.to_string(),
            set_cookie: Some(SetCookie {
                name: self.config.cookie_name.clone(),
                value: token,
                max_age_secs: self.config.guest_retention_secs,
                secure: self.config.secure_cookies,
            }),
        }
    }
}
