//! Workspace domain model.
//!
//! A workspace (a "company" in quota terms) owns 1..N dashboards. All
//! content entities are scoped to the owning member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    /// Owning member.
    pub owner_id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkspace {
    pub owner_id: Uuid,
    pub name: String,
    pub website: Option<String>,
}
