use async_trait::async_trait;
use chrono::NaiveDate;

use crate::foundation::error::MapleResult;

/// Stable character identifier issued by the game API (`ocid`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Basic character info at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AppearanceInfo {
    /// Name as displayed in game.
    pub display_name: String,
    /// Guild, when the character belongs to one.
    pub guild_name: Option<String>,
    /// Base URL of the rendered character sprite, without pose parameters.
    pub image_url: String,
}

/// Equipment state payload; compared structurally, never interpreted.
pub type EquipmentPayload = serde_json::Value;

/// Character data source consumed by search and history walks.
///
/// `date = None` asks for the current state.
#[async_trait]
pub trait CharacterLookupService: Send + Sync {
    /// Resolve a character name; fails with `NotFound` when no character matches.
    async fn resolve_identifier(&self, name: &str) -> MapleResult<Identifier>;

    /// Appearance of `id` on `date`.
    async fn appearance(&self, id: &Identifier, date: Option<NaiveDate>) -> MapleResult<AppearanceInfo>;

    /// Equipment of `id` on `date`.
    async fn equipment_state(
        &self,
        id: &Identifier,
        date: Option<NaiveDate>,
    ) -> MapleResult<EquipmentPayload>;
}
