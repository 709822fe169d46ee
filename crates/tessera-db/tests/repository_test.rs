//! Integration tests for the Account and Purchase repository
//! implementations using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tessera_core::error::TesseraError;
use tessera_core::models::account::{CreateAccount, UpdateAccount};
use tessera_core::models::plan::PlanId;
use tessera_core::models::purchase::CreatePurchase;
use tessera_core::repository::{AccountRepository, PurchaseRepository};
use tessera_db::repository::{SurrealAccountRepository, SurrealPurchaseRepository};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tessera_db::run_migrations(&db).await.unwrap();
    db
}

fn create_input(email: &str) -> CreateAccount {
    CreateAccount {
        id: Uuid::new_v4(),
        email: email.into(),
        name: Some("Alice".into()),
        plan: PlanId::Member,
        stripe_customer_id: None,
        metadata: None,
    }
}

// -----------------------------------------------------------------------
// Account tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_account() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    let input = create_input("alice@example.com");
    let id = input.id;
    let account = repo.create(input).await.unwrap();

    assert_eq!(account.id, id);
    assert_eq!(account.email, "alice@example.com");
    assert_eq!(account.plan, PlanId::Member);
    assert!(!account.is_member);
    assert!(!account.migration_needed);
    assert!(!account.migration_completed);

    let fetched = repo.get_by_id(id).await.unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.email, "alice@example.com");
}

#[tokio::test]
async fn get_account_by_email() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    let created = repo.create(create_input("bob@example.com")).await.unwrap();

    let fetched = repo.get_by_email("bob@example.com").await.unwrap();
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    repo.create(create_input("dup@example.com")).await.unwrap();

    // Different member id, same email — the unique index must reject it.
    let err = repo
        .create(create_input("dup@example.com"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, TesseraError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn update_account_membership_fields() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    let account = repo.create(create_input("carol@example.com")).await.unwrap();

    let updated = repo
        .update(
            account.id,
            UpdateAccount {
                is_member: Some(true),
                plan: Some(PlanId::Business),
                stripe_customer_id: Some(Some("cus_123".into())),
                migration_needed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.is_member);
    assert_eq!(updated.plan, PlanId::Business);
    assert_eq!(updated.stripe_customer_id.as_deref(), Some("cus_123"));
    assert!(updated.migration_needed);
    assert_eq!(updated.email, "carol@example.com"); // unchanged
}

#[tokio::test]
async fn get_missing_account_fails() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, TesseraError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Purchase ledger tests
// -----------------------------------------------------------------------

fn purchase_input(account_id: Uuid, session_id: &str) -> CreatePurchase {
    CreatePurchase {
        account_id,
        session_id: session_id.into(),
        customer_id: "cus_456".into(),
        amount: 1900,
        currency: "usd".into(),
        plan: PlanId::Member,
        status: "complete".into(),
    }
}

#[tokio::test]
async fn append_and_get_purchase() {
    let db = setup().await;
    let repo = SurrealPurchaseRepository::new(db);
    let account_id = Uuid::new_v4();

    let record = repo
        .append(purchase_input(account_id, "cs_test_1"))
        .await
        .unwrap();

    assert_eq!(record.account_id, account_id);
    assert_eq!(record.amount, 1900);

    let fetched = repo.get_by_session_id("cs_test_1").await.unwrap();
    assert_eq!(fetched.id, record.id);
    assert_eq!(fetched.plan, PlanId::Member);
}

#[tokio::test]
async fn duplicate_session_id_is_rejected() {
    let db = setup().await;
    let repo = SurrealPurchaseRepository::new(db);

    repo.append(purchase_input(Uuid::new_v4(), "cs_test_dup"))
        .await
        .unwrap();

    let err = repo
        .append(purchase_input(Uuid::new_v4(), "cs_test_dup"))
        .await
        .unwrap_err();

    assert!(matches!(err, TesseraError::AlreadyExists { .. }));
}

#[tokio::test]
async fn list_purchases_by_account() {
    let db = setup().await;
    let repo = SurrealPurchaseRepository::new(db);
    let account_id = Uuid::new_v4();

    repo.append(purchase_input(account_id, "cs_a")).await.unwrap();
    repo.append(purchase_input(account_id, "cs_b")).await.unwrap();
    repo.append(purchase_input(Uuid::new_v4(), "cs_other"))
        .await
        .unwrap();

    let records = repo.list_by_account(account_id).await.unwrap();
    assert_eq!(records.len(), 2);
}
