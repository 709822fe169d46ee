//! SurrealDB implementation of [`AccountRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::account::{Account, CreateAccount, UpdateAccount};
use tessera_core::models::plan::PlanId;
use tessera_core::repository::AccountRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    email: String,
    name: Option<String>,
    is_member: bool,
    plan: String,
    stripe_customer_id: Option<String>,
    migration_needed: bool,
    migration_completed: bool,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRowWithId {
    record_id: String,
    email: String,
    name: Option<String>,
    is_member: bool,
    plan: String,
    stripe_customer_id: Option<String>,
    migration_needed: bool,
    migration_completed: bool,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_plan(s: &str) -> Result<PlanId, DbError> {
    PlanId::parse(s).ok_or_else(|| DbError::Migration(format!("unknown plan: {s}")))
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Result<Account, DbError> {
        Ok(Account {
            id,
            email: self.email,
            name: self.name,
            is_member: self.is_member,
            plan: parse_plan(&self.plan)?,
            stripe_customer_id: self.stripe_customer_id,
            migration_needed: self.migration_needed,
            migration_completed: self.migration_completed,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AccountRowWithId {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Account {
            id,
            email: self.email,
            name: self.name,
            is_member: self.is_member,
            plan: parse_plan(&self.plan)?,
            stripe_customer_id: self.stripe_customer_id,
            migration_needed: self.migration_needed,
            migration_completed: self.migration_completed,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Account repository.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> TesseraResult<Account> {
        let id = input.id;
        let id_str = id.to_string();

        let metadata = input
            .metadata
            .unwrap_or(serde_json::Value::Object(Default::default()));

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 email = $email, \
                 name = $name, \
                 is_member = false, \
                 plan = $plan, \
                 stripe_customer_id = $stripe_customer_id, \
                 migration_needed = false, \
                 migration_completed = false, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("plan", input.plan.as_str().to_string()))
            .bind(("stripe_customer_id", input.stripe_customer_id))
            .bind(("metadata", metadata))
            .await
            .map_err(DbError::from)?;

        // Uniqueness violations (duplicate id or email) surface from
        // check() — the email case drives the reconciliation merge.
        let mut result = result.check().map_err(|e| {
            let msg = e.to_string();
            if msg.contains("idx_account_email") || msg.contains("already exists") {
                DbError::AlreadyExists {
                    entity: "account".into(),
                }
            } else {
                DbError::Migration(msg)
            }
        })?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> TesseraResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_by_email(&self, email: &str) -> TesseraResult<Account> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_account()?)
    }

    async fn update(&self, id: Uuid, input: UpdateAccount) -> TesseraResult<Account> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.is_member.is_some() {
            sets.push("is_member = $is_member");
        }
        if input.plan.is_some() {
            sets.push("plan = $plan");
        }
        if input.stripe_customer_id.is_some() {
            sets.push("stripe_customer_id = $stripe_customer_id");
        }
        if input.migration_needed.is_some() {
            sets.push("migration_needed = $migration_needed");
        }
        if input.migration_completed.is_some() {
            sets.push("migration_completed = $migration_completed");
        }
        if input.metadata.is_some() {
            sets.push("metadata = $metadata");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('account', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(is_member) = input.is_member {
            builder = builder.bind(("is_member", is_member));
        }
        if let Some(plan) = input.plan {
            builder = builder.bind(("plan", plan.as_str().to_string()));
        }
        if let Some(stripe_customer_id) = input.stripe_customer_id {
            // Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("stripe_customer_id", stripe_customer_id));
        }
        if let Some(migration_needed) = input.migration_needed {
            builder = builder.bind(("migration_needed", migration_needed));
        }
        if let Some(migration_completed) = input.migration_completed {
            builder = builder.bind(("migration_completed", migration_completed));
        }
        if let Some(metadata) = input.metadata {
            builder = builder.bind(("metadata", metadata));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }
}
