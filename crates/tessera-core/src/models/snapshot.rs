//! Guest snapshot DTOs.
//!
//! The shapes a guest client holds locally and uploads on upgrade.
//! Entity ids are opaque client-generated strings; durable UUIDs are
//! assigned only when the snapshot is migrated into member storage.

use serde::{Deserialize, Serialize};

/// Top-level migration request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    pub workspace_data: WorkspaceData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceData {
    pub workspaces: Vec<GuestWorkspace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestWorkspace {
    pub id: String,
    pub name: String,
    pub website: Option<String>,
    #[serde(default)]
    pub dashboards: Vec<GuestDashboard>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDashboard {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    pub bg_color: Option<String>,
    pub template_id: Option<String>,
    #[serde(default)]
    pub tiles: Vec<GuestTile>,
    #[serde(default)]
    pub contacts: Vec<GuestContact>,
    #[serde(default)]
    pub notes: Vec<GuestNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestTile {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestContact {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestNote {
    pub id: String,
    pub title: Option<String>,
    pub body: String,
}
