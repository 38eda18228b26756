use crate::assets::color::Color;
use crate::assets::fetch::ImageSource;
use crate::assets::font::FontChoice;
use crate::foundation::core::CropArea;
use crate::foundation::error::{MapleError, MapleResult};
use crate::render::raster::MAX_RASTER_DIM;

/// Longest display name accepted at the boundary, in characters.
pub const MAX_NAME_CHARS: usize = 32;

/// Everything the compositor needs to draw one character.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CharacterAppearance {
    /// Display name.
    pub name: String,
    /// Full-body sprite, nominally 300x400.
    pub image: ImageSource,
    /// Region of the sprite shown, in unflipped source coordinates.
    #[serde(default)]
    pub crop: CropArea,
    /// Mirror the character horizontally.
    #[serde(default)]
    pub flip_horizontal: bool,
    /// Stamp `name` onto renders.
    #[serde(default = "default_true")]
    pub show_name: bool,
    /// Colour painted behind the sprite.
    #[serde(default = "default_background")]
    pub background: Color,
    /// Guild name, if the character has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild: Option<String>,
    /// Stamp the guild name in slot layouts.
    #[serde(default)]
    pub show_guild: bool,
}

fn default_true() -> bool {
    true
}

fn default_background() -> Color {
    Color::WHITE
}

impl CharacterAppearance {
    /// Appearance with the default face crop, name shown and a white background.
    pub fn new(name: impl Into<String>, image: ImageSource) -> Self {
        Self {
            name: name.into(),
            image,
            crop: CropArea::DEFAULT_FACE,
            flip_horizontal: false,
            show_name: true,
            background: Color::WHITE,
            guild: None,
            show_guild: false,
        }
    }

    /// Boundary checks for data coming from JSON or a UI.
    ///
    /// Out-of-range crop origins are left for the renderer to clamp; only sizes that can never
    /// select a pixel are rejected.
    pub fn validate(&self) -> MapleResult<()> {
        validate_name(&self.name)?;
        if self.crop.is_empty() {
            return Err(MapleError::validation(format!(
                "crop size must be positive, got {}x{}",
                self.crop.width, self.crop.height
            )));
        }
        Ok(())
    }
}

/// Reject names longer than [`MAX_NAME_CHARS`].
pub fn validate_name(name: &str) -> MapleResult<()> {
    let n = name.chars().count();
    if n > MAX_NAME_CHARS {
        return Err(MapleError::validation(format!(
            "name is {n} characters, max is {MAX_NAME_CHARS}"
        )));
    }
    Ok(())
}

/// Corner a pair layer is pinned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Flush with the left and bottom edges.
    BottomLeft,
    /// Flush with the right and bottom edges.
    BottomRight,
}

/// One character in a two-character frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositeLayer {
    /// Character to draw.
    pub appearance: CharacterAppearance,
    /// Draw this layer after the other one.
    #[serde(default)]
    pub on_top: bool,
    /// Placement corner; the name label follows the same corner.
    pub anchor: Anchor,
}

impl CompositeLayer {
    /// Layer pinned bottom-left.
    pub fn left(appearance: CharacterAppearance) -> Self {
        Self {
            appearance,
            on_top: false,
            anchor: Anchor::BottomLeft,
        }
    }

    /// Layer pinned bottom-right.
    pub fn right(appearance: CharacterAppearance) -> Self {
        Self {
            appearance,
            on_top: false,
            anchor: Anchor::BottomRight,
        }
    }

    /// Mark the layer as drawn last.
    pub fn on_top(mut self) -> Self {
        self.on_top = true;
        self
    }
}

/// How four pair tiles are arranged in a framed output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GridArrangement {
    /// Four tiles stacked vertically.
    #[default]
    #[serde(rename = "column", alias = "4x1")]
    Column,
    /// Two rows of two, row-major.
    #[serde(rename = "grid2x2", alias = "2x2")]
    Grid2x2,
}

/// Styling for caption text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Face to use.
    pub font: FontChoice,
    /// Fill colour; contrast colour of the background when unset.
    pub fill: Option<Color>,
    /// Outline colour; same as the fill when unset.
    pub stroke: Option<Color>,
    /// Outline width in pixels.
    pub stroke_width: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 36.0,
            font: FontChoice::Display,
            fill: None,
            stroke: None,
            stroke_width: 3.0,
        }
    }
}

/// Frame options for [`GridArrangement`] outputs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Tile arrangement.
    pub arrangement: GridArrangement,
    /// Frame fill.
    pub frame_color: Color,
    /// Height of the band above the tiles.
    pub top_margin: u32,
    /// Height of the band below the tiles.
    pub bottom_margin: u32,
    /// Caption centred in the top band.
    pub top_text: Option<String>,
    /// Caption centred in the bottom band.
    pub bottom_text: Option<String>,
    /// Caption styling.
    pub text_style: TextStyle,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            arrangement: GridArrangement::Column,
            frame_color: Color::WHITE,
            top_margin: 150,
            bottom_margin: 150,
            top_text: None,
            bottom_text: None,
            text_style: TextStyle::default(),
        }
    }
}

impl GridSpec {
    /// Reject margins taller than any raster can be.
    pub fn validate(&self) -> MapleResult<()> {
        for (band, margin) in [("top", self.top_margin), ("bottom", self.bottom_margin)] {
            if margin > MAX_RASTER_DIM {
                return Err(MapleError::validation(format!(
                    "{band}_margin must be at most {MAX_RASTER_DIM}, got {margin}"
                )));
            }
        }
        Ok(())
    }
}

/// Arrangement of full-body slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotLayout {
    /// One row.
    #[default]
    Horizontal,
    /// One column.
    Vertical,
    /// Two by two.
    Grid,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
