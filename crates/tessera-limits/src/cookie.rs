//! Signed guest cookie tokens.
//!
//! The cookie value has the shape `value.signature` where
//! `signature = hex(HMAC-SHA256(secret, value))`. The server can verify
//! authenticity without any server-side session storage.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// A Set-Cookie instruction returned to the caller.
///
/// The resolver never touches the response itself; the caller attaches
/// the header, which keeps the resolver composable with differing
/// response-construction styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl SetCookie {
    /// Render the full `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, self.value, self.max_age_secs
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

fn mac_for(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length.
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

/// Sign a guest id, producing the full cookie token `id.signature`.
pub fn sign_guest_token(secret: &str, guest_id: &str) -> String {
    let mut mac = mac_for(secret);
    mac.update(guest_id.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("{guest_id}.{signature}")
}

/// Mint a fresh random guest id (128 bits, hex) and its signed token.
pub fn mint_guest_token(secret: &str) -> (String, String) {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rand::Rng::random(&mut rng);
    let guest_id = hex::encode(bytes);
    let token = sign_guest_token(secret, &guest_id);
    (guest_id, token)
}

/// Verify a cookie token and return the embedded guest id.
///
/// Returns `None` for any malformation or signature mismatch — callers
/// treat that as "no prior identity", never as an error. The signature
/// comparison runs in constant time (`Mac::verify_slice`).
pub fn verify_guest_token(secret: &str, token: &str) -> Option<String> {
    let (guest_id, signature_hex) = token.split_once('.')?;
    if guest_id.is_empty() {
        return None;
    }

    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = mac_for(secret);
    mac.update(guest_id.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(guest_id.to_string())
}
