//! SurrealDB implementation of [`PurchaseRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::plan::PlanId;
use tessera_core::models::purchase::{CreatePurchase, PurchaseRecord};
use tessera_core::repository::PurchaseRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PurchaseRow {
    account_id: String,
    session_id: String,
    customer_id: String,
    amount: i64,
    currency: String,
    plan: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PurchaseRowWithId {
    record_id: String,
    account_id: String,
    session_id: String,
    customer_id: String,
    amount: i64,
    currency: String,
    plan: String,
    status: String,
    created_at: DateTime<Utc>,
}

fn row_to_purchase(row: PurchaseRow, id: Uuid) -> Result<PurchaseRecord, DbError> {
    let account_id = Uuid::parse_str(&row.account_id)
        .map_err(|e| DbError::Migration(format!("invalid account UUID: {e}")))?;
    let plan =
        PlanId::parse(&row.plan).ok_or_else(|| DbError::Migration(format!("unknown plan: {}", row.plan)))?;
    Ok(PurchaseRecord {
        id,
        account_id,
        session_id: row.session_id,
        customer_id: row.customer_id,
        amount: row.amount,
        currency: row.currency,
        plan,
        status: row.status,
        created_at: row.created_at,
    })
}

/// SurrealDB implementation of the Purchase repository.
#[derive(Clone)]
pub struct SurrealPurchaseRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPurchaseRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PurchaseRepository for SurrealPurchaseRepository<C> {
    async fn append(&self, input: CreatePurchase) -> TesseraResult<PurchaseRecord> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('purchase', $id) SET \
                 account_id = $account_id, \
                 session_id = $session_id, \
                 customer_id = $customer_id, \
                 amount = $amount, \
                 currency = $currency, \
                 plan = $plan, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("account_id", input.account_id.to_string()))
            .bind(("session_id", input.session_id))
            .bind(("customer_id", input.customer_id))
            .bind(("amount", input.amount))
            .bind(("currency", input.currency))
            .bind(("plan", input.plan.as_str().to_string()))
            .bind(("status", input.status))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let msg = e.to_string();
            if msg.contains("idx_purchase_session") || msg.contains("already exists") {
                DbError::AlreadyExists {
                    entity: "purchase".into(),
                }
            } else {
                DbError::Migration(msg)
            }
        })?;

        let rows: Vec<PurchaseRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "purchase".into(),
            id: id_str,
        })?;

        Ok(row_to_purchase(row, id)?)
    }

    async fn get_by_session_id(&self, session_id: &str) -> TesseraResult<PurchaseRecord> {
        let session_id_owned = session_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM purchase \
                 WHERE session_id = $session_id",
            )
            .bind(("session_id", session_id_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PurchaseRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "purchase".into(),
            id: format!("session_id={session_id_owned}"),
        })?;

        let id = Uuid::parse_str(&row.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(row_to_purchase(
            PurchaseRow {
                account_id: row.account_id,
                session_id: row.session_id,
                customer_id: row.customer_id,
                amount: row.amount,
                currency: row.currency,
                plan: row.plan,
                status: row.status,
                created_at: row.created_at,
            },
            id,
        )?)
    }

    async fn list_by_account(&self, account_id: Uuid) -> TesseraResult<Vec<PurchaseRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM purchase \
                 WHERE account_id = $account_id \
                 ORDER BY created_at ASC",
            )
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PurchaseRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| {
                let id = Uuid::parse_str(&row.record_id)
                    .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
                row_to_purchase(
                    PurchaseRow {
                        account_id: row.account_id,
                        session_id: row.session_id,
                        customer_id: row.customer_id,
                        amount: row.amount,
                        currency: row.currency,
                        plan: row.plan,
                        status: row.status,
                        created_at: row.created_at,
                    },
                    id,
                )
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
