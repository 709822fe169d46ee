//! Limits configuration.

/// Configuration for identity resolution and usage enforcement.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// HMAC-SHA256 secret for signing the guest cookie token.
    pub cookie_secret: String,
    /// Guest cookie name (default: `guest_token`).
    pub cookie_name: String,
    /// Guest counter retention window in seconds, re-armed on every
    /// write (default: 2_592_000 = 30 days). Also the cookie max-age.
    pub guest_retention_secs: u64,
    /// Emit the `Secure` cookie attribute (enable in production).
    pub secure_cookies: bool,
    /// Counter-store outage policy: `true` allows the action and logs
    /// the incident; `false` surfaces the infrastructure error to
    /// members. Guest paths stay fail-open regardless.
    pub fail_open: bool,
    /// Shared secret for verifying session tokens issued by the
    /// external identity provider (HS256).
    pub idp_shared_secret: String,
    /// Expected issuer (`iss` claim) of identity-provider sessions.
    pub idp_issuer: String,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            cookie_secret: String::new(),
            cookie_name: "guest_token".into(),
            guest_retention_secs: 2_592_000,
            secure_cookies: false,
            fail_open: true,
            idp_shared_secret: String::new(),
            idp_issuer: "tessera".into(),
        }
    }
}
