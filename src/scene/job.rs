use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::assets::color::Color;
use crate::assets::fetch::ImageSource;
use crate::foundation::error::{MapleError, MapleResult};
use crate::render::compositor::{Compositor, MAX_OUTPUT_SCALE, MAX_SLOTS};
use crate::render::raster::RasterImage;
use crate::scene::model::{CharacterAppearance, CompositeLayer, GridSpec, SlotLayout};

/// Which side of a pair frame is drawn last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left character overlaps the right one.
    Left,
    /// Right character overlaps the left one.
    #[default]
    Right,
}

/// Two characters sharing one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PairFrame {
    /// Character pinned bottom-left.
    pub left: CharacterAppearance,
    /// Character pinned bottom-right.
    pub right: CharacterAppearance,
    /// Frame background.
    #[serde(default = "white")]
    pub background: Color,
    /// Side drawn on top.
    #[serde(default)]
    pub on_top: Side,
}

fn white() -> Color {
    Color::WHITE
}

fn default_scale() -> u32 {
    4
}

impl PairFrame {
    /// The two compositor layers of this frame.
    pub fn layers(&self) -> (CompositeLayer, CompositeLayer) {
        let mut left = CompositeLayer::left(self.left.clone());
        let mut right = CompositeLayer::right(self.right.clone());
        match self.on_top {
            Side::Left => left.on_top = true,
            Side::Right => right.on_top = true,
        }
        (left, right)
    }

    fn validate(&self) -> MapleResult<()> {
        self.left.validate()?;
        self.right.validate()
    }
}

/// A render request read from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderJob {
    /// Magnified crop of one character.
    Single {
        /// Character to render.
        appearance: CharacterAppearance,
        /// Pixel magnification.
        #[serde(default = "default_scale")]
        output_scale: u32,
    },
    /// Two characters in a 600x400 frame.
    Pair(PairFrame),
    /// Four pair frames in a captioned frame.
    Grid {
        /// Exactly four frames, in placement order.
        frames: Vec<PairFrame>,
        /// Frame options.
        #[serde(default)]
        grid: GridSpec,
    },
    /// Full-body slots.
    Slots {
        /// One to four characters.
        slots: Vec<CharacterAppearance>,
        /// Arrangement.
        #[serde(default)]
        layout: SlotLayout,
    },
}

impl RenderJob {
    /// Parse a job from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> MapleResult<Self> {
        let job: RenderJob = serde_json::from_reader(r)
            .map_err(|e| MapleError::validation(format!("parse render job JSON: {e}")))?;
        job.validate()?;
        Ok(job)
    }

    /// Parse a job from a JSON file on disk.
    ///
    /// Relative image paths are taken relative to the job file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> MapleResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MapleError::validation(format!("open render job JSON '{}': {e}", path.display()))
        })?;
        let mut job = Self::from_reader(BufReader::new(f))?;
        if let Some(root) = path.parent() {
            job.resolve_paths(root);
        }
        Ok(job)
    }

    /// Prefix every relative [`ImageSource::Path`] with `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        for appearance in self.appearances_mut() {
            if let ImageSource::Path(p) = &mut appearance.image {
                if p.is_relative() {
                    *p = root.join(&*p);
                }
            }
        }
    }

    fn appearances_mut(&mut self) -> Vec<&mut CharacterAppearance> {
        match self {
            Self::Single { appearance, .. } => vec![appearance],
            Self::Pair(frame) => vec![&mut frame.left, &mut frame.right],
            Self::Grid { frames, .. } => frames
                .iter_mut()
                .flat_map(|f| [&mut f.left, &mut f.right])
                .collect(),
            Self::Slots { slots, .. } => slots.iter_mut().collect(),
        }
    }

    /// Boundary checks shared by every job kind.
    pub fn validate(&self) -> MapleResult<()> {
        match self {
            Self::Single {
                appearance,
                output_scale,
            } => {
                if *output_scale == 0 || *output_scale > MAX_OUTPUT_SCALE {
                    return Err(MapleError::validation(format!(
                        "output_scale must be in 1..={MAX_OUTPUT_SCALE}"
                    )));
                }
                appearance.validate()
            }
            Self::Pair(frame) => frame.validate(),
            Self::Grid { frames, grid } => {
                grid.validate()?;
                if frames.len() != 4 {
                    return Err(MapleError::validation(format!(
                        "grid jobs need exactly 4 frames, got {}",
                        frames.len()
                    )));
                }
                frames.iter().try_for_each(PairFrame::validate)
            }
            Self::Slots { slots, .. } => {
                if slots.is_empty() || slots.len() > MAX_SLOTS {
                    return Err(MapleError::validation(format!(
                        "slot jobs need 1..={MAX_SLOTS} slots, got {}",
                        slots.len()
                    )));
                }
                slots.iter().try_for_each(CharacterAppearance::validate)
            }
        }
    }

    /// Run the job.
    pub async fn render(&self, compositor: &Compositor) -> MapleResult<RasterImage> {
        match self {
            Self::Single {
                appearance,
                output_scale,
            } => compositor.render_single(appearance, *output_scale).await,
            Self::Pair(frame) => {
                let (l, r) = frame.layers();
                compositor.render_pair(&l, &r, frame.background).await
            }
            Self::Grid { frames, grid } => {
                let [a, b, c, d] = frames.as_slice() else {
                    return Err(MapleError::validation("grid jobs need exactly 4 frames"));
                };
                let (ta, tb, tc, td) = tokio::join!(
                    render_frame(compositor, a),
                    render_frame(compositor, b),
                    render_frame(compositor, c),
                    render_frame(compositor, d),
                );
                compositor.render_grid(&[ta?, tb?, tc?, td?], grid)
            }
            Self::Slots { slots, layout } => compositor.render_slots(slots, *layout).await,
        }
    }
}

async fn render_frame(compositor: &Compositor, frame: &PairFrame) -> MapleResult<RasterImage> {
    let (l, r) = frame.layers();
    compositor.render_pair(&l, &r, frame.background).await
}

#[cfg(test)]
#[path = "../../tests/unit/scene/job.rs"]
mod tests;
