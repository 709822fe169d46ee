//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Content repositories require an
//! `owner_id` parameter to enforce per-member data isolation.

use uuid::Uuid;

use crate::error::TesseraResult;
use crate::models::{
    account::{Account, CreateAccount, UpdateAccount},
    contact::{Contact, CreateContact},
    dashboard::{CreateDashboard, Dashboard},
    note::{CreateNote, Note},
    purchase::{CreatePurchase, PurchaseRecord},
    tile::{CreateTile, Tile},
    workspace::{CreateWorkspace, Workspace},
};

// ---------------------------------------------------------------------------
// Accounts (global scope)
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    /// Create an account with the externally-issued member id.
    ///
    /// Fails with `AlreadyExists` when the id or the email is already
    /// taken — the email conflict drives the reconciliation merge.
    fn create(&self, input: CreateAccount) -> impl Future<Output = TesseraResult<Account>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TesseraResult<Account>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = TesseraResult<Account>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> impl Future<Output = TesseraResult<Account>> + Send;
}

// ---------------------------------------------------------------------------
// Content entities (owner-scoped)
// ---------------------------------------------------------------------------

pub trait WorkspaceRepository: Send + Sync {
    fn create(
        &self,
        input: CreateWorkspace,
    ) -> impl Future<Output = TesseraResult<Workspace>> + Send;
    fn get_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = TesseraResult<Workspace>> + Send;
    fn list_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Workspace>>> + Send;
}

pub trait DashboardRepository: Send + Sync {
    /// Create a dashboard. The owning workspace must already exist for
    /// the same owner; otherwise the call fails with `Validation`.
    fn create(
        &self,
        input: CreateDashboard,
    ) -> impl Future<Output = TesseraResult<Dashboard>> + Send;
    fn list_by_workspace(
        &self,
        owner_id: Uuid,
        workspace_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Dashboard>>> + Send;
}

pub trait TileRepository: Send + Sync {
    fn create(&self, input: CreateTile) -> impl Future<Output = TesseraResult<Tile>> + Send;
    fn list_by_dashboard(
        &self,
        owner_id: Uuid,
        dashboard_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Tile>>> + Send;
}

pub trait ContactRepository: Send + Sync {
    fn create(&self, input: CreateContact) -> impl Future<Output = TesseraResult<Contact>> + Send;
    fn list_by_dashboard(
        &self,
        owner_id: Uuid,
        dashboard_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Contact>>> + Send;
}

pub trait NoteRepository: Send + Sync {
    fn create(&self, input: CreateNote) -> impl Future<Output = TesseraResult<Note>> + Send;
    fn list_by_dashboard(
        &self,
        owner_id: Uuid,
        dashboard_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<Note>>> + Send;
}

// ---------------------------------------------------------------------------
// Purchase ledger (append-only)
// ---------------------------------------------------------------------------

pub trait PurchaseRepository: Send + Sync {
    /// Append a new ledger entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreatePurchase,
    ) -> impl Future<Output = TesseraResult<PurchaseRecord>> + Send;
    /// Look up an entry by provider session id — the de-duplication
    /// check performed before every insertion.
    fn get_by_session_id(
        &self,
        session_id: &str,
    ) -> impl Future<Output = TesseraResult<PurchaseRecord>> + Send;
    fn list_by_account(
        &self,
        account_id: Uuid,
    ) -> impl Future<Output = TesseraResult<Vec<PurchaseRecord>>> + Send;
}
