//! Mapleframe crops, composes and exports pixel-art character sprites, and walks a character's
//! appearance history through the public game API.
//!
//! - Describe characters as [`CharacterAppearance`] values
//! - Render them with a [`Compositor`] (single, pair, 2x2/column grid, slot strip)
//! - Walk past appearances with a [`HistoryWalker`] into a [`SnapshotSink`]
#![forbid(unsafe_code)]

/// Image loading, decoding, fonts, colours and palette analysis.
pub mod assets;
pub mod config;
mod foundation;
/// Deduplicated appearance history walk.
pub mod history;
/// Character lookup service and its HTTP implementation.
pub mod lookup;
/// Same-origin image proxy endpoint.
pub mod proxy;
/// Compositing backend.
pub mod render;
/// Boundary scene model: appearances, layers, updates and render jobs.
pub mod scene;

pub use crate::foundation::core::{CropArea, Rgba8Premul};
pub use crate::foundation::error::{MapleError, MapleResult};

pub use crate::assets::color::Color;
pub use crate::assets::fetch::{HttpImageFetcher, ImageFetcher, ImageSource};
pub use crate::assets::font::{FontBook, FontChoice, FontFace, FontSource};
pub use crate::assets::palette::{ColorAnalysis, analyze_colors};
pub use crate::config::{Settings, WalkSettings};
pub use crate::history::fingerprint::{EquipmentFingerprint, fingerprint_equipment};
pub use crate::history::sink::{FnSink, InMemorySnapshotSink, SnapshotSink};
pub use crate::history::walker::{
    HistorySnapshot, HistoryWalker, WalkOptions, WalkOutcome, WalkReport,
};
pub use crate::lookup::nexon::NexonClient;
pub use crate::lookup::pose::Pose;
pub use crate::lookup::search_character;
pub use crate::lookup::service::{AppearanceInfo, CharacterLookupService, Identifier};
pub use crate::render::compositor::Compositor;
pub use crate::render::raster::RasterImage;
pub use crate::scene::job::{PairFrame, RenderJob, Side};
pub use crate::scene::model::{
    Anchor, CharacterAppearance, CompositeLayer, GridArrangement, GridSpec, SlotLayout, TextStyle,
};
pub use crate::scene::update::AppearanceUpdate;
