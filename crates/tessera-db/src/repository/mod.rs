//! SurrealDB repository and counter-store implementations.

mod account;
mod contact;
mod counter;
mod dashboard;
mod note;
mod purchase;
mod tile;
mod workspace;

pub use account::SurrealAccountRepository;
pub use contact::SurrealContactRepository;
pub use counter::SurrealQuotaStore;
pub use dashboard::SurrealDashboardRepository;
pub use note::SurrealNoteRepository;
pub use purchase::SurrealPurchaseRepository;
pub use tile::SurrealTileRepository;
pub use workspace::SurrealWorkspaceRepository;
