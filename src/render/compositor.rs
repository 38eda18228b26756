use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::assets::color::Color;
use crate::assets::fetch::{HttpImageFetcher, ImageFetcher, ImageSource};
use crate::assets::font::{FontBook, FontChoice, FontSource};
use crate::assets::palette::{ColorAnalysis, analyze_colors};
use crate::config::Settings;
use crate::foundation::core::{Affine, CropArea, Rect};
use crate::foundation::error::{MapleError, MapleResult};
use crate::lookup::pose::{SPRITE_HEIGHT, SPRITE_WIDTH};
use crate::render::blit::{draw_image_rect, flip_x_about};
use crate::render::placeholder::draw_placeholder;
use crate::render::raster::RasterImage;
use crate::render::text::{HAlign, TextPaint, TextPainter, VAlign};
use crate::scene::model::{
    Anchor, CharacterAppearance, CompositeLayer, GridArrangement, GridSpec, SlotLayout,
};

/// Two-character frame width.
pub const PAIR_WIDTH: u32 = 600;
/// Two-character frame height.
pub const PAIR_HEIGHT: u32 = 400;
/// Longest side of each character in a two-character frame.
pub const PAIR_MAX_SIZE: f64 = 360.0;
/// Distance of pair name labels from the frame corners.
pub const PAIR_NAME_MARGIN: f64 = 20.0;
/// Pair name label size.
pub const PAIR_NAME_SIZE_PX: f32 = 24.0;

/// Gap between grid tiles.
pub const GRID_GAP: u32 = 15;
/// Padding left and right of grid tiles.
pub const GRID_SIDE_PADDING: u32 = 20;

/// Slot width in slot layouts.
pub const SLOT_WIDTH: u32 = 300;
/// Slot height in slot layouts.
pub const SLOT_HEIGHT: u32 = 400;
/// Slots beyond this count are ignored.
pub const MAX_SLOTS: usize = 4;

/// Extra enlargement applied to single-render name labels for a chunky pixel look.
pub const NAME_TEXT_SCALE: f64 = 1.5;
/// Largest accepted `output_scale` for single renders.
pub const MAX_OUTPUT_SCALE: u32 = 64;

const OUTLINE: Color = Color::WHITE;
const INK: Color = Color::BLACK;

/// Deterministic rasterizer for character appearances.
///
/// Holds no per-render state: every call builds its own output raster and text painter, so one
/// compositor can serve concurrent renders.
#[derive(Clone)]
pub struct Compositor {
    fetcher: Arc<dyn ImageFetcher>,
    fonts: FontBook,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("fonts", &self.fonts)
            .finish_non_exhaustive()
    }
}

enum Loaded {
    Image(RasterImage),
    Failed,
}

impl Compositor {
    /// Compositor over an image fetcher and a font book.
    pub fn new(fetcher: Arc<dyn ImageFetcher>, fonts: FontBook) -> Self {
        Self { fetcher, fonts }
    }

    /// Build the HTTP fetcher (with proxy routing) and load fonts as configured.
    pub async fn from_settings(settings: &Settings) -> MapleResult<Self> {
        let mut fetcher = HttpImageFetcher::new(settings.request_timeout())?;
        if let Some(proxy) = &settings.proxy_base_url {
            fetcher = fetcher.with_proxy(proxy)?;
        }
        let font_client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| MapleError::service(format!("failed to build HTTP client: {e}")))?;
        let source = settings.display_font.as_deref().map(FontSource::parse);
        let fonts = FontBook::load(source.as_ref(), settings.font_load_timeout(), &font_client).await;
        Ok(Self::new(Arc::new(fetcher), fonts))
    }

    /// Fonts used for labels.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    async fn load(&self, source: &ImageSource) -> Loaded {
        match self.fetcher.load(source).await {
            Ok(img) => Loaded::Image(img),
            Err(e) => {
                warn!(source = %source.describe(), error = %e, "image unavailable, drawing placeholder");
                Loaded::Failed
            }
        }
    }

    /// Render the crop of one character magnified `output_scale` times.
    ///
    /// The output is `crop.width * output_scale` by `crop.height * output_scale` (after clamping
    /// the crop into the source, or into a 300x400 sprite when the image is unavailable). An
    /// unloadable image yields a placeholder, not an error.
    pub async fn render_single(
        &self,
        appearance: &CharacterAppearance,
        output_scale: u32,
    ) -> MapleResult<RasterImage> {
        if output_scale == 0 || output_scale > MAX_OUTPUT_SCALE {
            return Err(MapleError::validation(format!(
                "output_scale must be in 1..={MAX_OUTPUT_SCALE}, got {output_scale}"
            )));
        }
        let loaded = self.load(&appearance.image).await;
        self.paint_single(appearance, &loaded, output_scale)
    }

    fn paint_single(
        &self,
        appearance: &CharacterAppearance,
        loaded: &Loaded,
        output_scale: u32,
    ) -> MapleResult<RasterImage> {
        let sampling = match loaded {
            Loaded::Image(img) => {
                appearance
                    .crop
                    .sampling_rect(appearance.flip_horizontal, img.width, img.height)
            }
            // Source size is unknown; clamp against the nominal sprite.
            Loaded::Failed => appearance.crop.sampling_rect(
                appearance.flip_horizontal,
                SPRITE_WIDTH,
                SPRITE_HEIGHT,
            ),
        };
        let scale = i64::from(output_scale);
        let w = i64::from(sampling.width) * scale;
        let h = i64::from(sampling.height) * scale;
        let (w, h) = (
            u32::try_from(w).map_err(|_| MapleError::validation("output width overflow"))?,
            u32::try_from(h).map_err(|_| MapleError::validation("output height overflow"))?,
        );

        let mut out = RasterImage::filled(w, h, appearance.background)?;
        let canvas = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        let mut painter = TextPainter::new();

        match loaded {
            Loaded::Image(img) => {
                let transform = if appearance.flip_horizontal {
                    flip_x_about(canvas)
                } else {
                    Affine::IDENTITY
                };
                debug!(?sampling, output_scale, flip = appearance.flip_horizontal, "draw single");
                draw_image_rect(&mut out, img, sampling, canvas, transform);
            }
            Loaded::Failed => draw_placeholder(&mut out, canvas, &self.fonts, &mut painter),
        }

        if appearance.show_name {
            let scale = f64::from(output_scale);
            let paint = TextPaint {
                size_px: (4.0 * scale) as f32,
                fill: INK,
                stroke: Some((OUTLINE, (scale * 0.75) as f32)),
            };
            let margin = 2.0 * scale;
            self.stamp(
                &mut painter,
                &mut out,
                &appearance.name,
                FontChoice::Display,
                paint,
                NAME_TEXT_SCALE,
                (f64::from(w) - margin, f64::from(h) - margin),
                (HAlign::Right, VAlign::Baseline),
            );
        }
        Ok(out)
    }

    /// Render two characters into one 600x400 frame.
    ///
    /// Both images load concurrently; either side may degrade to a placeholder without
    /// affecting the other.
    pub async fn render_pair(
        &self,
        left: &CompositeLayer,
        right: &CompositeLayer,
        background: Color,
    ) -> MapleResult<RasterImage> {
        let (l, r) = tokio::join!(
            self.load(&left.appearance.image),
            self.load(&right.appearance.image)
        );
        self.paint_pair([(left, &l), (right, &r)], background)
    }

    fn paint_pair(
        &self,
        layers: [(&CompositeLayer, &Loaded); 2],
        background: Color,
    ) -> MapleResult<RasterImage> {
        let mut out = RasterImage::filled(PAIR_WIDTH, PAIR_HEIGHT, background)?;
        let mut painter = TextPainter::new();
        let (cw, ch) = (f64::from(PAIR_WIDTH), f64::from(PAIR_HEIGHT));

        let [first, second] = layers;
        let order = if first.0.on_top && !second.0.on_top {
            [second, first]
        } else {
            [first, second]
        };

        for (layer, loaded) in order {
            let a = &layer.appearance;
            let (sampling, size) = match loaded {
                Loaded::Image(img) => {
                    let s = a.crop.sampling_rect(a.flip_horizontal, img.width, img.height);
                    (Some(s), s.fit_within(PAIR_MAX_SIZE))
                }
                Loaded::Failed => (None, a.crop.fit_within(PAIR_MAX_SIZE)),
            };
            let x0 = match layer.anchor {
                Anchor::BottomLeft => 0.0,
                Anchor::BottomRight => cw - size.width,
            };
            let rect = Rect::new(x0, ch - size.height, x0 + size.width, ch);

            match (loaded, sampling) {
                (Loaded::Image(img), Some(sampling)) => {
                    let transform = if a.flip_horizontal {
                        flip_x_about(rect)
                    } else {
                        Affine::IDENTITY
                    };
                    debug!(name = %a.name, ?sampling, ?rect, flip = a.flip_horizontal, "draw pair layer");
                    draw_image_rect(&mut out, img, sampling, rect, transform);
                }
                _ => draw_placeholder(&mut out, rect, &self.fonts, &mut painter),
            }
        }

        for (layer, _) in layers {
            let a = &layer.appearance;
            if !a.show_name {
                continue;
            }
            let (x, h) = match layer.anchor {
                Anchor::BottomLeft => (PAIR_NAME_MARGIN, HAlign::Left),
                Anchor::BottomRight => (cw - PAIR_NAME_MARGIN, HAlign::Right),
            };
            let paint = TextPaint {
                size_px: PAIR_NAME_SIZE_PX,
                fill: INK,
                stroke: Some((OUTLINE, 4.0)),
            };
            self.stamp(
                &mut painter,
                &mut out,
                &a.name,
                FontChoice::Display,
                paint,
                1.0,
                (x, ch - PAIR_NAME_MARGIN),
                (h, VAlign::Baseline),
            );
        }
        Ok(out)
    }

    /// Frame four pre-rendered tiles with optional captions.
    ///
    /// Tile placement uses the first tile's size; captions are centred in the margin bands in
    /// a colour that contrasts with the frame.
    pub fn render_grid(&self, tiles: &[RasterImage; 4], spec: &GridSpec) -> MapleResult<RasterImage> {
        spec.validate()?;
        let (tw, th) = (tiles[0].width, tiles[0].height);
        let (gap, side) = (GRID_GAP, GRID_SIDE_PADDING);
        let (content_w, content_h) = match spec.arrangement {
            GridArrangement::Column => (u64::from(tw), 4 * u64::from(th) + 3 * u64::from(gap)),
            GridArrangement::Grid2x2 => (
                2 * u64::from(tw) + u64::from(gap),
                2 * u64::from(th) + u64::from(gap),
            ),
        };
        let w = content_w + 2 * u64::from(side);
        let h = content_h + u64::from(spec.top_margin) + u64::from(spec.bottom_margin);
        let (w, h) = match (u32::try_from(w), u32::try_from(h)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(MapleError::validation(format!(
                    "grid canvas too large: {w}x{h}"
                )));
            }
        };
        let mut out = RasterImage::filled(w, h, spec.frame_color)?;

        // `filled` bounds the canvas, so tile offsets below fit in u32.
        for (i, tile) in tiles.iter().enumerate() {
            let i = i as u32;
            let (x, y) = match spec.arrangement {
                GridArrangement::Column => (side, spec.top_margin + i * (th + gap)),
                GridArrangement::Grid2x2 => (
                    side + (i % 2) * (tw + gap),
                    spec.top_margin + (i / 2) * (th + gap),
                ),
            };
            out.composite_over(tile, i64::from(x), i64::from(y));
        }

        let style = &spec.text_style;
        let fill = style.fill.unwrap_or_else(|| spec.frame_color.contrast_text());
        let paint = TextPaint {
            size_px: style.font_size,
            fill,
            stroke: Some((style.stroke.unwrap_or(fill), style.stroke_width)),
        };
        let cx = f64::from(w) / 2.0;
        let half_font = f64::from(style.font_size) / 2.0;
        let mut painter = TextPainter::new();
        let captions = [
            (
                spec.top_text.as_deref(),
                f64::from(spec.top_margin) / 2.0 + half_font,
            ),
            (
                spec.bottom_text.as_deref(),
                f64::from(spec.top_margin)
                    + content_h as f64
                    + f64::from(spec.bottom_margin) / 2.0
                    + half_font,
            ),
        ];
        for (text, y) in captions {
            let Some(text) = text else {
                continue;
            };
            self.stamp(
                &mut painter,
                &mut out,
                text,
                style.font,
                paint,
                1.0,
                (cx, y),
                (HAlign::Center, VAlign::Middle),
            );
        }
        Ok(out)
    }

    /// Lay out up to four full-body characters in 300x400 slots.
    pub async fn render_slots(
        &self,
        slots: &[CharacterAppearance],
        layout: SlotLayout,
    ) -> MapleResult<RasterImage> {
        if slots.is_empty() {
            return Err(MapleError::validation("slot layout needs at least one slot"));
        }
        if slots.len() > MAX_SLOTS {
            warn!(count = slots.len(), "ignoring slots beyond {MAX_SLOTS}");
        }
        let slots = &slots[..slots.len().min(MAX_SLOTS)];

        let mut set = JoinSet::new();
        for (i, slot) in slots.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let source = slot.image.clone();
            set.spawn(async move { (i, fetcher.load(&source).await) });
        }
        let mut loaded: Vec<Loaded> = slots.iter().map(|_| Loaded::Failed).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((i, Ok(img))) => loaded[i] = Loaded::Image(img),
                Ok((i, Err(e))) => {
                    warn!(slot = i, error = %e, "image unavailable, drawing placeholder");
                }
                Err(e) => warn!(error = %e, "slot image task failed"),
            }
        }
        self.paint_slots(slots, &loaded, layout)
    }

    fn paint_slots(
        &self,
        slots: &[CharacterAppearance],
        loaded: &[Loaded],
        layout: SlotLayout,
    ) -> MapleResult<RasterImage> {
        let n = slots.len() as u32;
        let (w, h) = match layout {
            SlotLayout::Horizontal => (SLOT_WIDTH * n, SLOT_HEIGHT),
            SlotLayout::Vertical => (SLOT_WIDTH, SLOT_HEIGHT * n),
            SlotLayout::Grid => (SLOT_WIDTH * 2, SLOT_HEIGHT * 2),
        };
        let mut out = RasterImage::filled(w, h, Color::WHITE)?;
        let mut painter = TextPainter::new();
        let (sw, sh) = (f64::from(SLOT_WIDTH), f64::from(SLOT_HEIGHT));

        for (i, (slot, image)) in slots.iter().zip(loaded).enumerate() {
            let i = i as u32;
            let (x, y) = match layout {
                SlotLayout::Horizontal => (i * SLOT_WIDTH, 0),
                SlotLayout::Vertical => (0, i * SLOT_HEIGHT),
                SlotLayout::Grid => ((i % 2) * SLOT_WIDTH, (i / 2) * SLOT_HEIGHT),
            };
            let (x, y) = (f64::from(x), f64::from(y));
            let rect = Rect::new(x, y, x + sw, y + sh);
            out.fill_rect(x as i64, y as i64, SLOT_WIDTH, SLOT_HEIGHT, slot.background);

            match image {
                Loaded::Image(img) => {
                    let full = CropArea::new(0, 0, img.width as i32, img.height as i32);
                    let transform = if slot.flip_horizontal {
                        flip_x_about(rect)
                    } else {
                        Affine::IDENTITY
                    };
                    draw_image_rect(&mut out, img, full, rect, transform);
                }
                Loaded::Failed => draw_placeholder(&mut out, rect, &self.fonts, &mut painter),
            }

            let cx = x + sw / 2.0;
            if slot.show_name {
                let paint = TextPaint {
                    size_px: 16.0,
                    fill: INK,
                    stroke: Some((OUTLINE, 3.0)),
                };
                self.stamp(
                    &mut painter,
                    &mut out,
                    &slot.name,
                    FontChoice::Display,
                    paint,
                    1.0,
                    (cx, y + sh - 10.0),
                    (HAlign::Center, VAlign::Baseline),
                );
            }
            if let (true, Some(guild)) = (slot.show_guild, slot.guild.as_deref()) {
                let paint = TextPaint {
                    size_px: 12.0,
                    fill: INK,
                    stroke: Some((OUTLINE, 2.0)),
                };
                self.stamp(
                    &mut painter,
                    &mut out,
                    guild,
                    FontChoice::Display,
                    paint,
                    1.0,
                    (cx, y + sh - 30.0),
                    (HAlign::Center, VAlign::Baseline),
                );
            }
        }
        Ok(out)
    }

    /// Dominant colours of the character's crop and a matching background suggestion.
    ///
    /// Unlike the render operations this is a one-shot query, so load failures are returned.
    pub async fn analyze(&self, appearance: &CharacterAppearance) -> MapleResult<ColorAnalysis> {
        let img = self.fetcher.load(&appearance.image).await?;
        Ok(analyze_colors(&img, appearance.crop))
    }

    /// Draw a text label; missing fonts and layout failures only log.
    #[allow(clippy::too_many_arguments)]
    fn stamp(
        &self,
        painter: &mut TextPainter,
        out: &mut RasterImage,
        text: &str,
        font: FontChoice,
        paint: TextPaint,
        enlarge: f64,
        at: (f64, f64),
        align: (HAlign, VAlign),
    ) {
        if text.trim().is_empty() {
            return;
        }
        let Some(face) = self.fonts.face(font) else {
            warn!(text, "no font available, skipping label");
            return;
        };
        match painter.rasterize(text, face, paint) {
            Ok(Some(bitmap)) => {
                let bitmap = if enlarge == 1.0 {
                    bitmap
                } else {
                    bitmap.scaled(enlarge)
                };
                bitmap.draw(out, at.0, at.1, align.0, align.1);
            }
            Ok(None) => {}
            Err(e) => warn!(text, error = %e, "label failed to render"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
