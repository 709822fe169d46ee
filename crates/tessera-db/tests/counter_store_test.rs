//! Integration tests for the SurrealDB counter store.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tessera_core::quota::QuotaStore;
use tessera_db::repository::SurrealQuotaStore;

async fn setup() -> SurrealQuotaStore<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tessera_db::run_migrations(&db).await.unwrap();
    SurrealQuotaStore::new(db)
}

#[tokio::test]
async fn missing_key_reads_as_none() {
    let store = setup().await;
    assert_eq!(store.get("guest:nobody:usage:tiles").await.unwrap(), None);
}

#[tokio::test]
async fn increment_is_monotonic() {
    let store = setup().await;
    let key = "member:abc:usage:tile_chats";

    // N single increments leave the counter at exactly N.
    for expected in 1..=5u64 {
        let value = store.increment(key, 1).await.unwrap();
        assert_eq!(value, expected);
    }

    assert_eq!(store.get(key).await.unwrap(), Some(5));
}

#[tokio::test]
async fn increment_returns_new_value_for_bulk_amounts() {
    let store = setup().await;
    let key = "member:bulk:usage:tokens_used";

    assert_eq!(store.increment(key, 1200).await.unwrap(), 1200);
    assert_eq!(store.increment(key, 800).await.unwrap(), 2000);
}

#[tokio::test]
async fn negative_increment_clamps_at_zero() {
    let store = setup().await;
    let key = "member:clamp:usage:tiles";

    store.increment(key, 2).await.unwrap();
    // Rolling back more than was reserved cannot drive the value
    // below zero.
    assert_eq!(store.increment(key, -5).await.unwrap(), 0);
}

#[tokio::test]
async fn expired_key_reads_as_none_and_sweep_removes_it() {
    let store = setup().await;
    let key = "guest:g1:usage:notes";

    store.increment(key, 3).await.unwrap();
    assert_eq!(store.get(key).await.unwrap(), Some(3));

    // TTL of zero expires the key immediately.
    store.expire(key, 0).await.unwrap();
    assert_eq!(store.get(key).await.unwrap(), None);

    let removed = store.cleanup_expired().await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.get(key).await.unwrap(), None);
}

#[tokio::test]
async fn expire_rearms_retention_window() {
    let store = setup().await;
    let key = "guest:g2:usage:tiles";

    store.increment(key, 1).await.unwrap();
    store.expire(key, 3600).await.unwrap();

    // Still live inside the window.
    assert_eq!(store.get(key).await.unwrap(), Some(1));
    assert_eq!(store.cleanup_expired().await.unwrap(), 0);
}
