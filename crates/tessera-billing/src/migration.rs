//! Guest data migration engine.
//!
//! On upgrade, the client uploads its locally-held snapshot and the
//! engine persists it into the member's durable storage. Migration is
//! best-effort: each entity insertion is attempted independently, and a
//! failure appends to the in-band error list instead of aborting. The
//! engine never deletes existing member data.
//!
//! The engine does not track prior invocations. Callers guard retries
//! with the persisted `Account::migration_completed` flag.

use serde::{Deserialize, Serialize};
use tessera_core::error::{TesseraError, TesseraResult};
use tessera_core::models::contact::CreateContact;
use tessera_core::models::dashboard::CreateDashboard;
use tessera_core::models::note::CreateNote;
use tessera_core::models::snapshot::GuestWorkspace;
use tessera_core::models::tile::CreateTile;
use tessera_core::models::workspace::{CreateWorkspace, Workspace};
use tessera_core::repository::{
    ContactRepository, DashboardRepository, NoteRepository, TileRepository, WorkspaceRepository,
};
use tracing::info;
use uuid::Uuid;

/// Snapshot caps: bound the worst-case write volume of a single call.
pub const MAX_WORKSPACES: usize = 10;
pub const MAX_DASHBOARDS_PER_WORKSPACE: usize = 25;
pub const MAX_ITEMS_PER_DASHBOARD: usize = 200;

/// Per-entity migration counts plus the in-band error list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStats {
    pub workspaces_migrated: u32,
    pub dashboards_migrated: u32,
    pub tiles_migrated: u32,
    pub contacts_migrated: u32,
    pub notes_migrated: u32,
    pub errors: Vec<String>,
}

/// Validate snapshot shape and size bounds. Runs before any write; a
/// violation rejects the whole snapshot.
pub fn validate_snapshot(workspaces: &[GuestWorkspace]) -> TesseraResult<()> {
    if workspaces.len() > MAX_WORKSPACES {
        return Err(TesseraError::Validation {
            message: format!(
                "snapshot has {} workspaces (maximum {MAX_WORKSPACES})",
                workspaces.len()
            ),
        });
    }

    for workspace in workspaces {
        if workspace.dashboards.len() > MAX_DASHBOARDS_PER_WORKSPACE {
            return Err(TesseraError::Validation {
                message: format!(
                    "workspace '{}' has {} dashboards (maximum {MAX_DASHBOARDS_PER_WORKSPACE})",
                    workspace.name,
                    workspace.dashboards.len()
                ),
            });
        }
        for dashboard in &workspace.dashboards {
            let items = [
                ("tiles", dashboard.tiles.len()),
                ("contacts", dashboard.contacts.len()),
                ("notes", dashboard.notes.len()),
            ];
            for (label, count) in items {
                if count > MAX_ITEMS_PER_DASHBOARD {
                    return Err(TesseraError::Validation {
                        message: format!(
                            "dashboard '{}' has {count} {label} (maximum {MAX_ITEMS_PER_DASHBOARD})",
                            dashboard.name
                        ),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Migrates a validated guest snapshot into durable member storage.
pub struct MigrationEngine<W, D, T, C, N> {
    workspaces: W,
    dashboards: D,
    tiles: T,
    contacts: C,
    notes: N,
}

impl<W, D, T, C, N> MigrationEngine<W, D, T, C, N>
where
    W: WorkspaceRepository,
    D: DashboardRepository,
    T: TileRepository,
    C: ContactRepository,
    N: NoteRepository,
{
    pub fn new(workspaces: W, dashboards: D, tiles: T, contacts: C, notes: N) -> Self {
        Self {
            workspaces,
            dashboards,
            tiles,
            contacts,
            notes,
        }
    }

    /// Persist the snapshot under `member_id`, returning per-entity
    /// counts and the collected errors. Nothing rolls back on partial
    /// failure.
    pub async fn migrate(
        &self,
        member_id: Uuid,
        snapshot: &[GuestWorkspace],
    ) -> TesseraResult<MigrationStats> {
        // 1. Bounds check before any write.
        validate_snapshot(snapshot)?;

        let mut stats = MigrationStats::default();

        // 2. Existing workspaces are reused by name, which keeps repeat
        //    migrations workspace-stable.
        let mut existing: Vec<Workspace> = self.workspaces.list_by_owner(member_id).await?;

        for guest_workspace in snapshot {
            let workspace = match existing
                .iter()
                .find(|w| w.name == guest_workspace.name)
                .cloned()
            {
                Some(workspace) => workspace,
                None => {
                    match self
                        .workspaces
                        .create(CreateWorkspace {
                            owner_id: member_id,
                            name: guest_workspace.name.clone(),
                            website: guest_workspace.website.clone(),
                        })
                        .await
                    {
                        Ok(workspace) => {
                            existing.push(workspace.clone());
                            workspace
                        }
                        Err(e) => {
                            // The whole subtree is unreachable without
                            // its workspace; record one error and move
                            // on to the next workspace.
                            stats.errors.push(format!(
                                "workspace '{}': {e}",
                                guest_workspace.name
                            ));
                            continue;
                        }
                    }
                }
            };
            stats.workspaces_migrated += 1;

            // 3. Dashboards, then each dashboard's items.
            for guest_dashboard in &guest_workspace.dashboards {
                let dashboard = match self
                    .dashboards
                    .create(CreateDashboard {
                        owner_id: member_id,
                        workspace_id: workspace.id,
                        name: guest_dashboard.name.clone(),
                        bg_color: guest_dashboard.bg_color.clone(),
                        template_id: guest_dashboard.template_id.clone(),
                    })
                    .await
                {
                    Ok(dashboard) => dashboard,
                    Err(e) => {
                        stats
                            .errors
                            .push(format!("dashboard '{}': {e}", guest_dashboard.name));
                        continue;
                    }
                };
                stats.dashboards_migrated += 1;

                for tile in &guest_dashboard.tiles {
                    match self
                        .tiles
                        .create(CreateTile {
                            owner_id: member_id,
                            workspace_id: workspace.id,
                            dashboard_id: dashboard.id,
                            title: tile.title.clone(),
                            content: tile.content.clone(),
                        })
                        .await
                    {
                        Ok(_) => stats.tiles_migrated += 1,
                        Err(e) => stats.errors.push(format!("tile '{}': {e}", tile.title)),
                    }
                }

                for contact in &guest_dashboard.contacts {
                    match self
                        .contacts
                        .create(CreateContact {
                            owner_id: member_id,
                            workspace_id: workspace.id,
                            dashboard_id: dashboard.id,
                            name: contact.name.clone(),
                            email: contact.email.clone(),
                            company: contact.company.clone(),
                        })
                        .await
                    {
                        Ok(_) => stats.contacts_migrated += 1,
                        Err(e) => stats.errors.push(format!("contact '{}': {e}", contact.name)),
                    }
                }

                for note in &guest_dashboard.notes {
                    match self
                        .notes
                        .create(CreateNote {
                            owner_id: member_id,
                            workspace_id: workspace.id,
                            dashboard_id: dashboard.id,
                            title: note.title.clone(),
                            body: note.body.clone(),
                        })
                        .await
                    {
                        Ok(_) => stats.notes_migrated += 1,
                        Err(e) => stats.errors.push(format!("note '{}': {e}", note.id)),
                    }
                }
            }
        }

        info!(
            member = %member_id,
            workspaces = stats.workspaces_migrated,
            dashboards = stats.dashboards_migrated,
            tiles = stats.tiles_migrated,
            contacts = stats.contacts_migrated,
            notes = stats.notes_migrated,
            errors = stats.errors.len(),
            "guest snapshot migrated"
        );

        Ok(stats)
    }
}
