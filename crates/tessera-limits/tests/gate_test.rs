//! Integration tests for the usage enforcement gate, using the
//! SurrealDB in-memory counter store.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::account::CreateAccount;
use tessera_core::models::plan::{PlanId, QuotaKind};
use tessera_core::models::subject::Subject;
use tessera_core::quota::{QuotaStore, guest_ip_usage_key, guest_usage_key, member_usage_key};
use tessera_core::repository::AccountRepository;
use tessera_db::repository::{SurrealAccountRepository, SurrealQuotaStore};
use tessera_limits::config::LimitsConfig;
use tessera_limits::gate::UsageGate;
use tessera_limits::identity::GuestIdentity;
use tessera_limits::plan::{GUEST_LIMITS, MEMBER_LIMITS, PlanRegistry};
use uuid::Uuid;

type MemDb = surrealdb::engine::local::Db;

async fn setup() -> (
    UsageGate<SurrealQuotaStore<MemDb>, SurrealAccountRepository<MemDb>>,
    SurrealQuotaStore<MemDb>,
    SurrealAccountRepository<MemDb>,
) {
    setup_with_config(LimitsConfig::default()).await
}

async fn setup_with_config(
    config: LimitsConfig,
) -> (
    UsageGate<SurrealQuotaStore<MemDb>, SurrealAccountRepository<MemDb>>,
    SurrealQuotaStore<MemDb>,
    SurrealAccountRepository<MemDb>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tessera_db::run_migrations(&db).await.unwrap();

    let store = SurrealQuotaStore::new(db.clone());
    let accounts = SurrealAccountRepository::new(db.clone());
    let gate = UsageGate::new(
        SurrealQuotaStore::new(db.clone()),
        PlanRegistry::new(SurrealAccountRepository::new(db)),
        config,
    );
    (gate, store, accounts)
}

fn guest(guest_id: &str, ip: &str) -> GuestIdentity {
    GuestIdentity {
        guest_id: guest_id.into(),
        ip: ip.into(),
        set_cookie: None,
    }
}

fn guest_subject(guest_id: &str, ip: &str) -> Subject {
    Subject::Guest {
        guest_id: guest_id.into(),
        ip: ip.into(),
    }
}

// -----------------------------------------------------------------------
// Ceiling respect
// -----------------------------------------------------------------------

#[tokio::test]
async fn member_at_ceiling_is_denied() {
    let (gate, store, _) = setup().await;
    let member_id = Uuid::new_v4();
    let subject = Subject::Member { member_id };
    let ceiling = MEMBER_LIMITS.ceiling(QuotaKind::Tiles);

    // Fill usage exactly to the ceiling.
    store
        .increment(&member_usage_key(member_id, QuotaKind::Tiles), ceiling as i64)
        .await
        .unwrap();

    let check = gate.check_limit(&subject, QuotaKind::Tiles).await.unwrap();
    assert!(!check.allowed);
    let reason = check.reason.unwrap();
    assert!(reason.contains(&ceiling.to_string()), "reason: {reason}");
}

#[tokio::test]
async fn member_one_below_ceiling_is_allowed() {
    let (gate, store, _) = setup().await;
    let member_id = Uuid::new_v4();
    let subject = Subject::Member { member_id };
    let ceiling = MEMBER_LIMITS.ceiling(QuotaKind::Tiles);

    store
        .increment(
            &member_usage_key(member_id, QuotaKind::Tiles),
            (ceiling - 1) as i64,
        )
        .await
        .unwrap();

    let check = gate.check_limit(&subject, QuotaKind::Tiles).await.unwrap();
    assert!(check.allowed);
}

#[tokio::test]
async fn guest_bulk_precheck_respects_requested_amount() {
    let (gate, store, _) = setup().await;
    let ceiling = GUEST_LIMITS.ceiling(QuotaKind::Tiles);

    // One below the ceiling: a single action fits, two do not.
    store
        .increment(
            &guest_usage_key("g-bulk", QuotaKind::Tiles),
            (ceiling - 1) as i64,
        )
        .await
        .unwrap();

    let g = guest("g-bulk", "198.51.100.4");
    let one = gate.check_guest_limit(&g, QuotaKind::Tiles, 1).await;
    assert!(one.allowed);

    let two = gate.check_guest_limit(&g, QuotaKind::Tiles, 2).await;
    assert!(!two.allowed);
    let reason = two.reason.unwrap();
    assert!(reason.contains("requested 2"), "reason: {reason}");
}

// -----------------------------------------------------------------------
// Guest dual counters
// -----------------------------------------------------------------------

#[tokio::test]
async fn guest_effective_usage_is_max_of_cookie_and_ip() {
    let (gate, store, _) = setup().await;

    // Regenerations has a guest ceiling of 5. Cookie counter at 3,
    // IP shadow counter at 5: the max (5) governs, so the request is
    // denied even though the cookie counter alone would allow it.
    store
        .increment(&guest_usage_key("g-max", QuotaKind::Regenerations), 3)
        .await
        .unwrap();
    store
        .increment(
            &guest_ip_usage_key("198.51.100.7", QuotaKind::Regenerations),
            5,
        )
        .await
        .unwrap();
    assert_eq!(GUEST_LIMITS.ceiling(QuotaKind::Regenerations), 5);

    let g = guest("g-max", "198.51.100.7");
    let check = gate.check_guest_limit(&g, QuotaKind::Regenerations, 1).await;
    assert!(!check.allowed);
    let reason = check.reason.unwrap();
    assert!(reason.contains("used 5 of 5"), "reason: {reason}");

    // The same cookie identity from a clean IP is still capped by the
    // cookie counter only (3 of 5).
    let g2 = guest("g-max", "198.51.100.99");
    let check2 = gate.check_guest_limit(&g2, QuotaKind::Regenerations, 1).await;
    assert!(check2.allowed);
}

#[tokio::test]
async fn guest_increment_writes_both_counters() {
    let (gate, store, _) = setup().await;
    let subject = guest_subject("g-both", "198.51.100.8");

    gate.increment_usage(&subject, QuotaKind::Notes, 2)
        .await
        .unwrap();

    assert_eq!(
        store
            .get(&guest_usage_key("g-both", QuotaKind::Notes))
            .await
            .unwrap(),
        Some(2)
    );
    assert_eq!(
        store
            .get(&guest_ip_usage_key("198.51.100.8", QuotaKind::Notes))
            .await
            .unwrap(),
        Some(2)
    );
}

// -----------------------------------------------------------------------
// Monotonicity
// -----------------------------------------------------------------------

#[tokio::test]
async fn usage_counts_exactly_n_increments() {
    let (gate, store, _) = setup().await;
    let member_id = Uuid::new_v4();
    let subject = Subject::Member { member_id };

    for _ in 0..4 {
        gate.increment_usage(&subject, QuotaKind::TileChats, 1)
            .await
            .unwrap();
    }

    assert_eq!(
        store
            .get(&member_usage_key(member_id, QuotaKind::TileChats))
            .await
            .unwrap(),
        Some(4)
    );

    let snapshot = gate.usage_snapshot(&subject).await.unwrap();
    assert_eq!(snapshot.usage.tile_chats_count, 4);
}

// -----------------------------------------------------------------------
// Plan resolution
// -----------------------------------------------------------------------

#[tokio::test]
async fn member_without_account_defaults_to_member_plan() {
    let (gate, _, _) = setup().await;
    let subject = Subject::Member {
        member_id: Uuid::new_v4(),
    };

    let snapshot = gate.usage_snapshot(&subject).await.unwrap();
    assert_eq!(snapshot.plan, PlanId::Member);
    assert!(snapshot.is_member);
    assert_eq!(snapshot.limits, MEMBER_LIMITS);
}

#[tokio::test]
async fn member_with_business_account_gets_business_limits() {
    let (gate, _, accounts) = setup().await;
    let member_id = Uuid::new_v4();

    accounts
        .create(CreateAccount {
            id: member_id,
            email: "biz@example.com".into(),
            name: None,
            plan: PlanId::Business,
            stripe_customer_id: None,
            metadata: None,
        })
        .await
        .unwrap();

    let subject = Subject::Member { member_id };
    let snapshot = gate.usage_snapshot(&subject).await.unwrap();
    assert_eq!(snapshot.plan, PlanId::Business);
    assert_eq!(
        snapshot.limits.ceiling(QuotaKind::Companies),
        tessera_limits::plan::BUSINESS_LIMITS.ceiling(QuotaKind::Companies)
    );
}

#[tokio::test]
async fn usage_snapshot_serializes_to_the_wire_shape() {
    let (gate, _, _) = setup().await;
    let subject = Subject::Member {
        member_id: Uuid::new_v4(),
    };

    gate.increment_usage(&subject, QuotaKind::TileChats, 3)
        .await
        .unwrap();

    let snapshot = gate.usage_snapshot(&subject).await.unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["isMember"], serde_json::json!(true));
    assert_eq!(json["plan"], serde_json::json!("member"));
    assert_eq!(json["usage"]["tileChatsCount"], serde_json::json!(3));
    assert_eq!(
        json["limits"]["tileChatsCount"],
        serde_json::json!(MEMBER_LIMITS.tile_chats_count)
    );
}

#[tokio::test]
async fn guest_snapshot_uses_guest_plan() {
    let (gate, _, _) = setup().await;
    let subject = guest_subject("g-snap", "198.51.100.2");

    let snapshot = gate.usage_snapshot(&subject).await.unwrap();
    assert_eq!(snapshot.plan, PlanId::Guest);
    assert!(!snapshot.is_member);
    assert_eq!(snapshot.limits, GUEST_LIMITS);
}

// -----------------------------------------------------------------------
// Atomic reservation
// -----------------------------------------------------------------------

#[tokio::test]
async fn try_reserve_rolls_back_on_overshoot() {
    let (gate, store, _) = setup().await;
    let member_id = Uuid::new_v4();
    let subject = Subject::Member { member_id };
    let ceiling = MEMBER_LIMITS.ceiling(QuotaKind::Tiles);
    let key = member_usage_key(member_id, QuotaKind::Tiles);

    // Reserve the whole ceiling in one call.
    let first = gate
        .try_reserve(&subject, QuotaKind::Tiles, ceiling)
        .await
        .unwrap();
    assert!(first.allowed);
    assert_eq!(store.get(&key).await.unwrap(), Some(ceiling));

    // The next reservation overshoots, is denied, and rolls back.
    let second = gate.try_reserve(&subject, QuotaKind::Tiles, 1).await.unwrap();
    assert!(!second.allowed);
    assert_eq!(store.get(&key).await.unwrap(), Some(ceiling));
}

#[tokio::test]
async fn guest_try_reserve_honors_ip_shadow_counter() {
    let (gate, store, _) = setup().await;

    // Exhaust the IP counter through a previous cookie identity.
    store
        .increment(
            &guest_ip_usage_key("198.51.100.50", QuotaKind::Regenerations),
            5,
        )
        .await
        .unwrap();

    // A brand-new cookie identity from the same IP is still denied,
    // and its own counter rolls back to zero.
    let subject = guest_subject("g-fresh", "198.51.100.50");
    let check = gate
        .try_reserve(&subject, QuotaKind::Regenerations, 1)
        .await
        .unwrap();
    assert!(!check.allowed);
    assert_eq!(
        store
            .get(&guest_usage_key("g-fresh", QuotaKind::Regenerations))
            .await
            .unwrap(),
        Some(0)
    );
}

// -----------------------------------------------------------------------
// End-to-end guest scenario
// -----------------------------------------------------------------------

#[tokio::test]
async fn guest_tile_chats_deny_on_twenty_first() {
    let (gate, _, _) = setup().await;
    let g = guest("g-e2e", "198.51.100.77");
    let subject = guest_subject("g-e2e", "198.51.100.77");

    // 20 tile-chat actions against the seeded guest ceiling of 20.
    for i in 0..20 {
        let check = gate.check_guest_limit(&g, QuotaKind::TileChats, 1).await;
        assert!(check.allowed, "action {i} should be allowed");
        gate.increment_usage(&subject, QuotaKind::TileChats, 1)
            .await
            .unwrap();
    }

    // The 21st within the window is denied with the counts in-band.
    let check = gate.check_guest_limit(&g, QuotaKind::TileChats, 1).await;
    assert!(!check.allowed);
    let reason = check.reason.unwrap();
    assert!(reason.contains("used 20 of 20"), "reason: {reason}");
    assert!(reason.contains("requested 1"), "reason: {reason}");
}

// -----------------------------------------------------------------------
// Fail-open policy
// -----------------------------------------------------------------------

/// A counter store whose backing service is unreachable.
struct UnreachableStore;

impl QuotaStore for UnreachableStore {
    async fn get(&self, _key: &str) -> TesseraResult<Option<u64>> {
        Err(TesseraError::CounterStore("connection refused".into()))
    }

    async fn increment(&self, _key: &str, _amount: i64) -> TesseraResult<u64> {
        Err(TesseraError::CounterStore("connection refused".into()))
    }

    async fn expire(&self, _key: &str, _ttl_secs: u64) -> TesseraResult<()> {
        Err(TesseraError::CounterStore("connection refused".into()))
    }
}

async fn broken_gate(
    fail_open: bool,
) -> UsageGate<UnreachableStore, SurrealAccountRepository<MemDb>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tessera_db::run_migrations(&db).await.unwrap();

    UsageGate::new(
        UnreachableStore,
        PlanRegistry::new(SurrealAccountRepository::new(db)),
        LimitsConfig {
            fail_open,
            ..LimitsConfig::default()
        },
    )
}

#[tokio::test]
async fn guest_fails_open_when_store_is_down() {
    let gate = broken_gate(false).await;
    let g = guest("g-down", "198.51.100.3");

    // Guests fail open regardless of the policy knob.
    let check = gate.check_guest_limit(&g, QuotaKind::TileChats, 1).await;
    assert!(check.allowed);

    let subject = guest_subject("g-down", "198.51.100.3");
    gate.increment_usage(&subject, QuotaKind::TileChats, 1)
        .await
        .unwrap();
}

#[tokio::test]
async fn member_fail_open_policy_is_configurable() {
    let subject = Subject::Member {
        member_id: Uuid::new_v4(),
    };

    // Reference behavior: fail open uniformly.
    let open = broken_gate(true).await;
    let check = open.check_limit(&subject, QuotaKind::Tiles).await.unwrap();
    assert!(check.allowed);
    open.increment_usage(&subject, QuotaKind::Tiles, 1)
        .await
        .unwrap();

    // Strict deployments surface the infrastructure failure.
    let closed = broken_gate(false).await;
    let err = closed.check_limit(&subject, QuotaKind::Tiles).await.unwrap_err();
    assert!(matches!(err, TesseraError::CounterStore(_)));
}
