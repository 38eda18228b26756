use crate::assets::color::Color;
use crate::assets::fetch::ImageSource;
use crate::foundation::core::CropArea;
use crate::foundation::error::{MapleError, MapleResult};
use crate::lookup::pose::{validate_code, with_emotion};
use crate::scene::model::{CharacterAppearance, validate_name};

/// A single edit to a [`CharacterAppearance`], grouped by field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppearanceUpdate {
    /// Replace the crop rectangle.
    Crop {
        /// New crop.
        area: CropArea,
    },
    /// Set horizontal mirroring.
    Flip {
        /// Mirror when `true`.
        flip_horizontal: bool,
    },
    /// Show or hide the name label.
    NameVisibility {
        /// Visible when `true`.
        show: bool,
    },
    /// Show or hide the guild label.
    GuildVisibility {
        /// Visible when `true`.
        show: bool,
    },
    /// Change the background colour.
    Background {
        /// New colour.
        color: Color,
    },
    /// Change the facial expression on a renderer URL.
    Emotion {
        /// Expression code, `E00`..
        code: String,
    },
    /// Change the display name.
    Rename {
        /// New name.
        name: String,
    },
}

impl AppearanceUpdate {
    /// Check the update on its own, before it touches any appearance.
    pub fn validate(&self) -> MapleResult<()> {
        match self {
            Self::Crop { area } if area.is_empty() => Err(MapleError::validation(format!(
                "crop size must be positive, got {}x{}",
                area.width, area.height
            ))),
            Self::Emotion { code } => validate_code('E', code),
            Self::Rename { name } => validate_name(name),
            _ => Ok(()),
        }
    }
}

impl CharacterAppearance {
    /// Apply one validated update; the appearance is untouched when validation fails.
    pub fn apply(&mut self, update: AppearanceUpdate) -> MapleResult<()> {
        update.validate()?;
        match update {
            AppearanceUpdate::Crop { area } => self.crop = area,
            AppearanceUpdate::Flip { flip_horizontal } => self.flip_horizontal = flip_horizontal,
            AppearanceUpdate::NameVisibility { show } => self.show_name = show,
            AppearanceUpdate::GuildVisibility { show } => self.show_guild = show,
            AppearanceUpdate::Background { color } => self.background = color,
            AppearanceUpdate::Emotion { code } => {
                let ImageSource::Url(url) = &self.image else {
                    return Err(MapleError::validation(
                        "emotion can only be changed on renderer image urls",
                    ));
                };
                self.image = ImageSource::Url(with_emotion(url, &code));
            }
            AppearanceUpdate::Rename { name } => self.name = name,
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/update.rs"]
mod tests;
