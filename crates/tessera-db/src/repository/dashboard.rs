//! SurrealDB implementation of [`DashboardRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::dashboard::{CreateDashboard, Dashboard};
use tessera_core::repository::DashboardRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DashboardRow {
    owner_id: String,
    workspace_id: String,
    name: String,
    bg_color: Option<String>,
    template_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct DashboardRowWithId {
    record_id: String,
    owner_id: String,
    workspace_id: String,
    name: String,
    bg_color: Option<String>,
    template_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn row_to_dashboard(row: DashboardRow, id: Uuid) -> Result<Dashboard, DbError> {
    let owner_id = Uuid::parse_str(&row.owner_id)
        .map_err(|e| DbError::Migration(format!("invalid owner UUID: {e}")))?;
    let workspace_id = Uuid::parse_str(&row.workspace_id)
        .map_err(|e| DbError::Migration(format!("invalid workspace UUID: {e}")))?;
    Ok(Dashboard {
        id,
        owner_id,
        workspace_id,
        name: row.name,
        bg_color: row.bg_color,
        template_id: row.template_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl DashboardRowWithId {
    fn try_into_dashboard(self) -> Result<Dashboard, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        row_to_dashboard(
            DashboardRow {
                owner_id: self.owner_id,
                workspace_id: self.workspace_id,
                name: self.name,
                bg_color: self.bg_color,
                template_id: self.template_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

/// SurrealDB implementation of the Dashboard repository.
#[derive(Clone)]
pub struct SurrealDashboardRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDashboardRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DashboardRepository for SurrealDashboardRepository<C> {
    async fn create(&self, input: CreateDashboard) -> TesseraResult<Dashboard> {
        // Referential check: the owning workspace must exist for the
        // same owner. SurrealDB has no foreign keys; the small
        // check-then-create window is acceptable under last-write-wins.
        let mut ws_result = self
            .db
            .query(
                "SELECT count() AS total FROM type::record('workspace', $workspace_id) \
                 WHERE owner_id = $owner_id GROUP ALL",
            )
            .bind(("workspace_id", input.workspace_id.to_string()))
            .bind(("owner_id", input.owner_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let ws_rows: Vec<CountRow> = ws_result.take(0).map_err(DbError::from)?;
        if ws_rows.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(TesseraError::Validation {
                message: format!(
                    "workspace {} does not exist for this owner",
                    input.workspace_id
                ),
            });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('dashboard', $id) SET \
                 owner_id = $owner_id, \
                 workspace_id = $workspace_id, \
                 name = $name, \
                 bg_color = $bg_color, \
                 template_id = $template_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("workspace_id", input.workspace_id.to_string()))
            .bind(("name", input.name))
            .bind(("bg_color", input.bg_color))
            .bind(("template_id", input.template_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<DashboardRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "dashboard".into(),
            id: id_str,
        })?;

        Ok(row_to_dashboard(row, id)?)
    }

    async fn list_by_workspace(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
    ) -> TesseraResult<Vec<Dashboard>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM dashboard \
                 WHERE owner_id = $owner_id AND workspace_id = $workspace_id \
                 ORDER BY created_at ASC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .bind(("workspace_id", workspace_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DashboardRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_dashboard())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
