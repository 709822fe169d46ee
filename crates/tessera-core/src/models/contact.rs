//! Contact domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub dashboard_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContact {
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub dashboard_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
}
