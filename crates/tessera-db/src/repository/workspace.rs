//! SurrealDB implementation of [`WorkspaceRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::workspace::{CreateWorkspace, Workspace};
use tessera_core::repository::WorkspaceRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct WorkspaceRow {
    owner_id: String,
    name: String,
    website: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct WorkspaceRowWithId {
    record_id: String,
    owner_id: String,
    name: String,
    website: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_workspace(row: WorkspaceRow, id: Uuid) -> Result<Workspace, DbError> {
    let owner_id = Uuid::parse_str(&row.owner_id)
        .map_err(|e| DbError::Migration(format!("invalid owner UUID: {e}")))?;
    Ok(Workspace {
        id,
        owner_id,
        name: row.name,
        website: row.website,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl WorkspaceRowWithId {
    fn try_into_workspace(self) -> Result<Workspace, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        row_to_workspace(
            WorkspaceRow {
                owner_id: self.owner_id,
                name: self.name,
                website: self.website,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Workspace repository.
#[derive(Clone)]
pub struct SurrealWorkspaceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWorkspaceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> WorkspaceRepository for SurrealWorkspaceRepository<C> {
    async fn create(&self, input: CreateWorkspace) -> TesseraResult<Workspace> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('workspace', $id) SET \
                 owner_id = $owner_id, \
                 name = $name, \
                 website = $website",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("name", input.name))
            .bind(("website", input.website))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<WorkspaceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workspace".into(),
            id: id_str,
        })?;

        Ok(row_to_workspace(row, id)?)
    }

    async fn get_by_id(&self, owner_id: Uuid, id: Uuid) -> TesseraResult<Workspace> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('workspace', $id) \
                 WHERE owner_id = $owner_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkspaceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workspace".into(),
            id: id_str,
        })?;

        Ok(row_to_workspace(row, id)?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> TesseraResult<Vec<Workspace>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM workspace \
                 WHERE owner_id = $owner_id \
                 ORDER BY created_at ASC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkspaceRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_workspace())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
