//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts (global scope; id = external member UUID)
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD email ON TABLE account TYPE string;
DEFINE FIELD name ON TABLE account TYPE option<string>;
DEFINE FIELD is_member ON TABLE account TYPE bool DEFAULT false;
DEFINE FIELD plan ON TABLE account TYPE string \
    ASSERT $value IN ['guest', 'member', 'business'];
DEFINE FIELD stripe_customer_id ON TABLE account TYPE option<string>;
DEFINE FIELD migration_needed ON TABLE account TYPE bool DEFAULT false;
DEFINE FIELD migration_completed ON TABLE account TYPE bool \
    DEFAULT false;
DEFINE FIELD metadata ON TABLE account TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_email ON TABLE account COLUMNS email UNIQUE;

-- =======================================================================
-- Workspaces (owner scope)
-- =======================================================================
DEFINE TABLE workspace SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE workspace TYPE string;
DEFINE FIELD name ON TABLE workspace TYPE string;
DEFINE FIELD website ON TABLE workspace TYPE option<string>;
DEFINE FIELD created_at ON TABLE workspace TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE workspace TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_workspace_owner ON TABLE workspace COLUMNS owner_id;

-- =======================================================================
-- Dashboards (owner scope, scoped to workspace)
-- =======================================================================
DEFINE TABLE dashboard SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE dashboard TYPE string;
DEFINE FIELD workspace_id ON TABLE dashboard TYPE string;
DEFINE FIELD name ON TABLE dashboard TYPE string;
DEFINE FIELD bg_color ON TABLE dashboard TYPE option<string>;
DEFINE FIELD template_id ON TABLE dashboard TYPE option<string>;
DEFINE FIELD created_at ON TABLE dashboard TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE dashboard TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_dashboard_owner_workspace ON TABLE dashboard \
    COLUMNS owner_id, workspace_id;

-- =======================================================================
-- Tiles (owner scope, exclusively owned by one dashboard)
-- =======================================================================
DEFINE TABLE tile SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE tile TYPE string;
DEFINE FIELD workspace_id ON TABLE tile TYPE string;
DEFINE FIELD dashboard_id ON TABLE tile TYPE string;
DEFINE FIELD title ON TABLE tile TYPE string;
DEFINE FIELD content ON TABLE tile TYPE string;
DEFINE FIELD created_at ON TABLE tile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tile_owner_dashboard ON TABLE tile \
    COLUMNS owner_id, dashboard_id;

-- =======================================================================
-- Contacts (owner scope, exclusively owned by one dashboard)
-- =======================================================================
DEFINE TABLE contact SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE contact TYPE string;
DEFINE FIELD workspace_id ON TABLE contact TYPE string;
DEFINE FIELD dashboard_id ON TABLE contact TYPE string;
DEFINE FIELD name ON TABLE contact TYPE string;
DEFINE FIELD email ON TABLE contact TYPE option<string>;
DEFINE FIELD company ON TABLE contact TYPE option<string>;
DEFINE FIELD created_at ON TABLE contact TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE contact TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_contact_owner_dashboard ON TABLE contact \
    COLUMNS owner_id, dashboard_id;

-- =======================================================================
-- Notes (owner scope, exclusively owned by one dashboard)
-- =======================================================================
DEFINE TABLE note SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE note TYPE string;
DEFINE FIELD workspace_id ON TABLE note TYPE string;
DEFINE FIELD dashboard_id ON TABLE note TYPE string;
DEFINE FIELD title ON TABLE note TYPE option<string>;
DEFINE FIELD body ON TABLE note TYPE string;
DEFINE FIELD created_at ON TABLE note TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE note TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_note_owner_dashboard ON TABLE note \
    COLUMNS owner_id, dashboard_id;

-- =======================================================================
-- Purchase ledger (append-only; deduplicated by session id)
-- =======================================================================
DEFINE TABLE purchase SCHEMAFULL;
DEFINE FIELD account_id ON TABLE purchase TYPE string;
DEFINE FIELD session_id ON TABLE purchase TYPE string;
DEFINE FIELD customer_id ON TABLE purchase TYPE string;
DEFINE FIELD amount ON TABLE purchase TYPE int;
DEFINE FIELD currency ON TABLE purchase TYPE string;
DEFINE FIELD plan ON TABLE purchase TYPE string \
    ASSERT $value IN ['guest', 'member', 'business'];
DEFINE FIELD status ON TABLE purchase TYPE string;
DEFINE FIELD created_at ON TABLE purchase TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_purchase_session ON TABLE purchase \
    COLUMNS session_id UNIQUE;

-- =======================================================================
-- Usage counters (record id = namespaced counter key)
-- =======================================================================
DEFINE TABLE counter SCHEMAFULL;
DEFINE FIELD value ON TABLE counter TYPE int DEFAULT 0;
DEFINE FIELD expires_at ON TABLE counter TYPE option<datetime>;
DEFINE FIELD updated_at ON TABLE counter TYPE datetime \
    DEFAULT time::now();
";

/// Apply all pending migrations.
///
/// Safe to run repeatedly: applied versions are recorded in the
/// `_migration` table and skipped on subsequent runs.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL).await?.check()?;

    let mut applied = db
        .query("SELECT version, name FROM _migration ORDER BY version ASC")
        .await?;
    let applied_rows: Vec<MigrationRecord> = applied.take(0)?;
    let applied_versions: Vec<u32> = applied_rows.iter().map(|r| r.version).collect();

    for migration in MIGRATIONS {
        if applied_versions.contains(&migration.version) {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "applying migration"
        );

        db.query(migration.sql)
            .await?
            .check()
            .map_err(|e| DbError::Migration(format!("{}: {e}", migration.name)))?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::Migration(format!("recording {}: {e}", migration.name)))?;
    }

    Ok(())
}
