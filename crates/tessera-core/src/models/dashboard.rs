//! Dashboard domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dashboard exclusively owns its tiles, contacts, and notes; there is
/// no cross-dashboard sharing. Its `workspace_id` must refer to an
/// existing workspace owned by the same member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub bg_color: Option<String>,
    pub template_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDashboard {
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub bg_color: Option<String>,
    pub template_id: Option<String>,
}
