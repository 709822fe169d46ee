//! SurrealDB implementation of [`NoteRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tessera_core::error::TesseraResult;
use tessera_core::models::note::{CreateNote, Note};
use tessera_core::repository::NoteRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct NoteRow {
    owner_id: String,
    workspace_id: String,
    dashboard_id: String,
    title: Option<String>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct NoteRowWithId {
    record_id: String,
    owner_id: String,
    workspace_id: String,
    dashboard_id: String,
    title: Option<String>,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_note(row: NoteRow, id: Uuid) -> Result<Note, DbError> {
    let owner_id = Uuid::parse_str(&row.owner_id)
        .map_err(|e| DbError::Migration(format!("invalid owner UUID: {e}")))?;
    let workspace_id = Uuid::parse_str(&row.workspace_id)
        .map_err(|e| DbError::Migration(format!("invalid workspace UUID: {e}")))?;
    let dashboard_id = Uuid::parse_str(&row.dashboard_id)
        .map_err(|e| DbError::Migration(format!("invalid dashboard UUID: {e}")))?;
    Ok(Note {
        id,
        owner_id,
        workspace_id,
        dashboard_id,
        title: row.title,
        body: row.body,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// SurrealDB implementation of the Note repository.
#[derive(Clone)]
pub struct SurrealNoteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNoteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NoteRepository for SurrealNoteRepository<C> {
    async fn create(&self, input: CreateNote) -> TesseraResult<Note> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('note', $id) SET \
                 owner_id = $owner_id, \
                 workspace_id = $workspace_id, \
                 dashboard_id = $dashboard_id, \
                 title = $title, \
                 body = $body",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("workspace_id", input.workspace_id.to_string()))
            .bind(("dashboard_id", input.dashboard_id.to_string()))
            .bind(("title", input.title))
            .bind(("body", input.body))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<NoteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "note".into(),
            id: id_str,
        })?;

        Ok(row_to_note(row, id)?)
    }

    async fn list_by_dashboard(&self, owner_id: Uuid, dashboard_id: Uuid) -> TesseraResult<Vec<Note>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM note \
                 WHERE owner_id = $owner_id AND dashboard_id = $dashboard_id \
                 ORDER BY created_at ASC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .bind(("dashboard_id", dashboard_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoteRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| {
                let id = Uuid::parse_str(&row.record_id)
                    .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
                row_to_note(
                    NoteRow {
                        owner_id: row.owner_id,
                        workspace_id: row.workspace_id,
                        dashboard_id: row.dashboard_id,
                        title: row.title,
                        body: row.body,
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
