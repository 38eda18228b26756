//! Character lookup: the service boundary, its HTTP implementation and one-shot search.

pub mod nexon;
pub mod pose;
pub mod service;

use tracing::info;

use crate::assets::fetch::ImageSource;
use crate::foundation::error::{MapleError, MapleResult};
use crate::lookup::pose::{Pose, SPRITE_HEIGHT, SPRITE_WIDTH, custom_image_url};
use crate::lookup::service::{AppearanceInfo, CharacterLookupService};
use crate::scene::model::CharacterAppearance;

/// Look a character up by name and build a ready-to-render appearance.
///
/// Uses the default face crop, a white background and shows the name. Every failure is
/// returned to the caller.
pub async fn search_character(
    service: &dyn CharacterLookupService,
    name: &str,
    pose: &Pose,
) -> MapleResult<CharacterAppearance> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MapleError::validation("character name must not be empty"));
    }
    pose.validate()?;
    let id = service.resolve_identifier(name).await?;
    let info = service.appearance(&id, None).await?;
    info!(name, %id, "character resolved");
    Ok(appearance_from_info(&info, pose))
}

/// Appearance for fetched character info rendered in `pose`.
pub fn appearance_from_info(info: &AppearanceInfo, pose: &Pose) -> CharacterAppearance {
    let url = custom_image_url(&info.image_url, pose, SPRITE_WIDTH, SPRITE_HEIGHT);
    let mut appearance = CharacterAppearance::new(info.display_name.clone(), ImageSource::Url(url));
    appearance.guild = info.guild_name.clone();
    appearance.show_guild = appearance.guild.is_some();
    appearance
}

#[cfg(test)]
#[path = "../../tests/unit/lookup/search.rs"]
mod tests;
