use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::font::FontFace;
use crate::foundation::error::{MapleError, MapleResult};
use crate::render::blit::scale_nearest;
use crate::render::raster::RasterImage;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush colour used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        let [r, g, b, a] = c.to_rgba8();
        Self { r, g, b, a }
    }
}

/// Fill and optional outline for one text draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TextPaint {
    pub(crate) size_px: f32,
    pub(crate) fill: Color,
    pub(crate) stroke: Option<(Color, f32)>,
}

/// Horizontal anchor of a text draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical anchor of a text draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VAlign {
    /// `y` is the first line's baseline.
    Baseline,
    /// `y` is the vertical centre of the text box.
    Middle,
}

/// Rasterized text plus the metrics needed to anchor it.
#[derive(Clone, Debug)]
pub(crate) struct TextBitmap {
    pub(crate) image: RasterImage,
    /// Transparent border around the layout box (room for the outline).
    pub(crate) pad: f64,
    pub(crate) text_width: f64,
    pub(crate) text_height: f64,
    /// First baseline, measured from the top of the layout box.
    pub(crate) baseline: f64,
}

impl TextBitmap {
    /// Nearest-neighbour enlargement for a chunky bitmap-font look.
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            image: scale_nearest(&self.image, factor),
            pad: self.pad * factor,
            text_width: self.text_width * factor,
            text_height: self.text_height * factor,
            baseline: self.baseline * factor,
        }
    }

    /// Source-over onto `dst` with the anchor point at `(x, y)`.
    pub(crate) fn draw(&self, dst: &mut RasterImage, x: f64, y: f64, h: HAlign, v: VAlign) {
        let left = match h {
            HAlign::Left => x,
            HAlign::Center => x - self.text_width / 2.0,
            HAlign::Right => x - self.text_width,
        } - self.pad;
        let top = match v {
            VAlign::Baseline => y - self.baseline,
            VAlign::Middle => y - self.text_height / 2.0,
        } - self.pad;
        dst.composite_over(&self.image, left.round() as i64, top.round() as i64);
    }
}

/// Stateful helper for laying out and rasterizing short labels from raw font bytes.
pub(crate) struct TextPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: Vec<(Arc<Vec<u8>>, u32, String)>,
}

impl Default for TextPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPainter {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: Vec::new(),
        }
    }

    fn family_for(&mut self, face: &FontFace) -> MapleResult<String> {
        if let Some((_, _, name)) = self
            .registered
            .iter()
            .find(|(bytes, index, _)| Arc::ptr_eq(bytes, &face.bytes) && *index == face.index)
        {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .iter()
            .find(|(_, fonts)| fonts.iter().any(|f| f.index() == face.index))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| MapleError::validation("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MapleError::validation("registered font family has no name"))?
            .to_string();
        self.registered
            .push((face.bytes.clone(), face.index, name.clone()));
        Ok(name)
    }

    fn layout_plain(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> MapleResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MapleError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Lay out `text` and rasterize it outline first, then fill.
    ///
    /// Returns `None` for blank text.
    pub(crate) fn rasterize(
        &mut self,
        text: &str,
        face: &FontFace,
        paint: TextPaint,
    ) -> MapleResult<Option<TextBitmap>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let layout = self.layout_plain(text, face, paint.size_px, paint.fill.into())?;

        let text_width = f64::from(layout.width()).ceil().max(1.0);
        let text_height = f64::from(layout.height()).ceil().max(1.0);
        let baseline = layout
            .lines()
            .next()
            .map_or(text_height, |line| f64::from(line.metrics().baseline));
        let stroke_w = paint.stroke.map_or(0.0, |(_, w)| f64::from(w.max(0.0)));
        let pad = (stroke_w / 2.0).ceil() + 1.0;

        let w = (text_width + 2.0 * pad) as u32;
        let h = (text_height + 2.0 * pad) as u32;
        let w16: u16 = w
            .try_into()
            .map_err(|_| MapleError::validation("text raster width exceeds u16"))?;
        let h16: u16 = h
            .try_into()
            .map_err(|_| MapleError::validation("text raster height exceeds u16"))?;

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
            face.index,
        );
        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((pad, pad)));

        let passes = paint
            .stroke
            .map(|(color, width)| (color, Some(width)))
            .into_iter()
            .chain(std::iter::once((paint.fill, None)));
        for (color, stroke_width) in passes {
            let [r, g, b, a] = color.to_rgba8();
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            if let Some(sw) = stroke_width {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(sw)));
            }
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    let builder = ctx.glyph_run(&font).font_size(run.run().font_size());
                    if stroke_width.is_some() {
                        builder.stroke_glyphs(glyphs);
                    } else {
                        builder.fill_glyphs(glyphs);
                    }
                }
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let image = RasterImage::from_premul(w, h, pixmap.data_as_u8_slice().to_vec())?;

        Ok(Some(TextBitmap {
            image,
            pad,
            text_width,
            text_height,
            baseline,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
