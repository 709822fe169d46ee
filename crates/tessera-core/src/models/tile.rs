//! Tile domain model — an AI-generated insight card on a dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub dashboard_id: Uuid,
    pub title: String,
    /// Generated insight body.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTile {
    pub owner_id: Uuid,
    pub workspace_id: Uuid,
    pub dashboard_id: Uuid,
    pub title: String,
    pub content: String,
}
