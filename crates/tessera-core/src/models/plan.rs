//! Plans and quota kinds.
//!
//! A plan is an identifier plus a fixed mapping from quota kind to
//! integer ceiling. Plans are immutable reference data; only the
//! assignment of a plan to a subject changes (on payment).

use serde::{Deserialize, Serialize};

/// Plan tier identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Guest,
    Member,
    Business,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Guest => "guest",
            PlanId::Member => "member",
            PlanId::Business => "business",
        }
    }

    /// Parse a stored plan identifier. Unknown values are `None`.
    pub fn parse(s: &str) -> Option<PlanId> {
        match s {
            "guest" => Some(PlanId::Guest),
            "member" => Some(PlanId::Member),
            "business" => Some(PlanId::Business),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category of countable action or resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaKind {
    Companies,
    Contacts,
    Notes,
    Tiles,
    TileChats,
    ContactChats,
    Regenerations,
    Assets,
    TokensUsed,
}

impl QuotaKind {
    /// All kinds, in the order they appear in the limits payload.
    pub const ALL: [QuotaKind; 9] = [
        QuotaKind::Companies,
        QuotaKind::Contacts,
        QuotaKind::Notes,
        QuotaKind::Tiles,
        QuotaKind::TileChats,
        QuotaKind::ContactChats,
        QuotaKind::Regenerations,
        QuotaKind::Assets,
        QuotaKind::TokensUsed,
    ];

    /// Key segment used in counter-store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaKind::Companies => "companies",
            QuotaKind::Contacts => "contacts",
            QuotaKind::Notes => "notes",
            QuotaKind::Tiles => "tiles",
            QuotaKind::TileChats => "tile_chats",
            QuotaKind::ContactChats => "contact_chats",
            QuotaKind::Regenerations => "regenerations",
            QuotaKind::Assets => "assets",
            QuotaKind::TokensUsed => "tokens_used",
        }
    }
}

impl std::fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-plan quota ceilings. Also reused as the shape of a usage report,
/// which mirrors the limits payload field-for-field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub companies_count: u64,
    pub contacts_count: u64,
    pub notes_count: u64,
    pub tiles_count: u64,
    pub tile_chats_count: u64,
    pub contact_chats_count: u64,
    pub regenerations_count: u64,
    pub assets_count: u64,
    pub tokens_used: u64,
}

impl PlanLimits {
    pub fn ceiling(&self, kind: QuotaKind) -> u64 {
        match kind {
            QuotaKind::Companies => self.companies_count,
            QuotaKind::Contacts => self.contacts_count,
            QuotaKind::Notes => self.notes_count,
            QuotaKind::Tiles => self.tiles_count,
            QuotaKind::TileChats => self.tile_chats_count,
            QuotaKind::ContactChats => self.contact_chats_count,
            QuotaKind::Regenerations => self.regenerations_count,
            QuotaKind::Assets => self.assets_count,
            QuotaKind::TokensUsed => self.tokens_used,
        }
    }

    pub fn set(&mut self, kind: QuotaKind, value: u64) {
        match kind {
            QuotaKind::Companies => self.companies_count = value,
            QuotaKind::Contacts => self.contacts_count = value,
            QuotaKind::Notes => self.notes_count = value,
            QuotaKind::Tiles => self.tiles_count = value,
            QuotaKind::TileChats => self.tile_chats_count = value,
            QuotaKind::ContactChats => self.contact_chats_count = value,
            QuotaKind::Regenerations => self.regenerations_count = value,
            QuotaKind::Assets => self.assets_count = value,
            QuotaKind::TokensUsed => self.tokens_used = value,
        }
    }
}
