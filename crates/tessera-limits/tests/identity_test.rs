//! Integration tests for identity resolution.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use tessera_limits::config::LimitsConfig;
use tessera_limits::identity::{Identity, IdentityResolver, RequestContext};
use uuid::Uuid;

const COOKIE_SECRET: &str = "test-cookie-secret";
const IDP_SECRET: &str = "test-idp-secret";

fn test_config() -> LimitsConfig {
    LimitsConfig {
        cookie_secret: COOKIE_SECRET.into(),
        idp_shared_secret: IDP_SECRET.into(),
        idp_issuer: "idp-test".into(),
        ..LimitsConfig::default()
    }
}

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
}

fn sign_session(member_id: Uuid, issuer: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = TestClaims {
        sub: member_id.to_string(),
        iss: issuer.into(),
        iat: now - 10,
        exp: now + exp_offset_secs,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(IDP_SECRET.as_bytes()),
    )
    .unwrap()
}

fn guest_of(identity: Identity) -> tessera_limits::identity::GuestIdentity {
    match identity {
        Identity::Guest(guest) => guest,
        Identity::Member { member_id } => panic!("expected guest, got member {member_id}"),
    }
}

// -----------------------------------------------------------------------
// Guest cookie path
// -----------------------------------------------------------------------

#[tokio::test]
async fn absent_cookie_mints_fresh_guest() {
    let resolver = IdentityResolver::new(test_config());

    let guest = guest_of(resolver.resolve(&RequestContext {
        session_token: None,
        guest_cookie: None,
        ip: "203.0.113.9",
    }));

    assert!(!guest.guest_id.is_empty());
    assert_eq!(guest.ip, "203.0.113.9");

    // A fresh id means the caller must set the cookie.
    let cookie = guest.set_cookie.expect("fresh guest needs a Set-Cookie");
    assert_eq!(cookie.name, "guest_token");
    assert!(cookie.value.starts_with(&guest.guest_id));
    assert!(cookie.header_value().contains("SameSite=Lax"));
}

#[tokio::test]
async fn valid_cookie_preserves_guest_id() {
    let resolver = IdentityResolver::new(test_config());

    let first = guest_of(resolver.resolve(&RequestContext {
        session_token: None,
        guest_cookie: None,
        ip: "203.0.113.9",
    }));
    let token = first.set_cookie.unwrap().value;

    let second = guest_of(resolver.resolve(&RequestContext {
        session_token: None,
        guest_cookie: Some(&token),
        ip: "203.0.113.9",
    }));

    assert_eq!(second.guest_id, first.guest_id);
    // No re-set needed for a valid cookie.
    assert!(second.set_cookie.is_none());
}

#[tokio::test]
async fn tampered_signature_mints_new_identity() {
    let resolver = IdentityResolver::new(test_config());

    let first = guest_of(resolver.resolve(&RequestContext {
        session_token: None,
        guest_cookie: None,
        ip: "203.0.113.9",
    }));
    let token = first.set_cookie.unwrap().value;

    // Flip the final signature character.
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });

    let second = guest_of(resolver.resolve(&RequestContext {
        session_token: None,
        guest_cookie: Some(&tampered),
        ip: "203.0.113.9",
    }));

    // Treated as no prior identity: new id, new cookie. Never an error.
    assert_ne!(second.guest_id, first.guest_id);
    assert!(second.set_cookie.is_some());
}

#[tokio::test]
async fn malformed_cookie_is_treated_as_absent() {
    let resolver = IdentityResolver::new(test_config());

    for raw in ["", "garbage", "no.hex!chars", "a.b.c"] {
        let guest = guest_of(resolver.resolve(&RequestContext {
            session_token: None,
            guest_cookie: Some(raw),
            ip: "203.0.113.9",
        }));
        assert!(guest.set_cookie.is_some(), "cookie {raw:?} should re-mint");
    }
}

// -----------------------------------------------------------------------
// Member session path
// -----------------------------------------------------------------------

#[tokio::test]
async fn valid_session_resolves_member() {
    let resolver = IdentityResolver::new(test_config());
    let member_id = Uuid::new_v4();
    let token = sign_session(member_id, "idp-test", 900);

    let identity = resolver.resolve(&RequestContext {
        session_token: Some(&token),
        guest_cookie: None,
        ip: "203.0.113.9",
    });

    match identity {
        Identity::Member { member_id: got } => assert_eq!(got, member_id),
        Identity::Guest(_) => panic!("expected member"),
    }
}

#[tokio::test]
async fn expired_session_falls_through_to_guest() {
    let resolver = IdentityResolver::new(test_config());
    let token = sign_session(Uuid::new_v4(), "idp-test", -3600);

    let guest = guest_of(resolver.resolve(&RequestContext {
        session_token: Some(&token),
        guest_cookie: None,
        ip: "203.0.113.9",
    }));
    assert!(guest.set_cookie.is_some());
}

#[tokio::test]
async fn wrong_issuer_falls_through_to_guest() {
    let resolver = IdentityResolver::new(test_config());
    let token = sign_session(Uuid::new_v4(), "someone-else", 900);

    let identity = resolver.resolve(&RequestContext {
        session_token: Some(&token),
        guest_cookie: None,
        ip: "203.0.113.9",
    });
    assert!(!identity.is_member());
}

#[tokio::test]
async fn garbage_session_with_valid_cookie_keeps_guest_id() {
    let resolver = IdentityResolver::new(test_config());

    let first = guest_of(resolver.resolve(&RequestContext {
        session_token: None,
        guest_cookie: None,
        ip: "203.0.113.9",
    }));
    let token = first.set_cookie.unwrap().value;

    // An invalid session must not cost the caller its guest identity.
    let second = guest_of(resolver.resolve(&RequestContext {
        session_token: Some("not-a-jwt"),
        guest_cookie: Some(&token),
        ip: "203.0.113.9",
    }));
    assert_eq!(second.guest_id, first.guest_id);
}
