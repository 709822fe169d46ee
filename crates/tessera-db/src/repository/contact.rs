//! SurrealDB implementation of [`ContactRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::contact::{Contact, CreateContact};
use tessera_core::repository::ContactRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ContactRow {
    owner_id: String,
    workspace_id: String,
    dashboard_id: String,
    name: String,
    email: Option<String>,
    company: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ContactRowWithId {
    record_id: String,
    owner_id: String,
    workspace_id: String,
    dashboard_id: String,
    name: String,
    email: Option<String>,
    company: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_contact(row: ContactRow, id: Uuid) -> Result<Contact, DbError> {
    let owner_id = Uuid::parse_str(&row.owner_id)
        .map_err(|e| DbError::Migration(format!("invalid owner UUID: {e}")))?;
    let workspace_id = Uuid::parse_str(&row.workspace_id)
        .map_err(|e| DbError::Migration(format!("invalid workspace UUID: {e}")))?;
    let dashboard_id = Uuid::parse_str(&row.dashboard_id)
        .map_err(|e| DbError::Migration(format!("invalid dashboard UUID: {e}")))?;
    Ok(Contact {
        id,
        owner_id,
        workspace_id,
        dashboard_id,
        name: row.name,
        email: row.email,
        company: row.company,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// SurrealDB implementation of the Contact repository.
#[derive(Clone)]
pub struct SurrealContactRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealContactRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ContactRepository for SurrealContactRepository<C> {
    async fn create(&self, input: CreateContact) -> TesseraResult<Contact> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('contact', $id) SET \
                 owner_id = $owner_id, \
                 workspace_id = $workspace_id, \
                 dashboard_id = $dashboard_id, \
                 name = $name, \
                 email = $email, \
                 company = $company",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("workspace_id", input.workspace_id.to_string()))
            .bind(("dashboard_id", input.dashboard_id.to_string()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("company", input.company))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ContactRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "contact".into(),
            id: id_str,
        })?;

        Ok(row_to_contact(row, id)?)
    }

    async fn list_by_dashboard(
        &self,
        owner_id: Uuid,
        dashboard_id: Uuid,
    ) -> TesseraResult<Vec<Contact>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM contact \
                 WHERE owner_id = $owner_id AND dashboard_id = $dashboard_id \
                 ORDER BY created_at ASC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .bind(("dashboard_id", dashboard_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ContactRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| {
                let id = Uuid::parse_str(&row.record_id)
                    .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
                row_to_contact(
                    ContactRow {
                        owner_id: row.owner_id,
                        workspace_id: row.workspace_id,
                        dashboard_id: row.dashboard_id,
                        name: row.name,
                        email: row.email,
                        company: row.company,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    },
                    id,
                )
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
