//! Tessera Limits — identity resolution, plan registry, and the usage
//! enforcement gate.

pub mod config;
pub mod cookie;
pub mod gate;
pub mod guest_store;
pub mod identity;
pub mod plan;

pub use config::LimitsConfig;
pub use cookie::SetCookie;
pub use gate::{GuestLimitCheck, LimitCheck, UsageGate, UsageSnapshot};
pub use guest_store::GuestWorkspaceCache;
pub use identity::{GuestIdentity, Identity, IdentityResolver, RequestContext};
pub use plan::{PlanRegistry, limits_for};
