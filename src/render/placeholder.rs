use tracing::warn;

use crate::assets::color::Color;
use crate::assets::decode::parse_svg;
use crate::assets::font::{FontBook, FontChoice};
use crate::assets::svg_raster::rasterize_svg;
use crate::foundation::core::Rect;
use crate::render::raster::RasterImage;
use crate::render::text::{HAlign, TextPaint, TextPainter, VAlign};

const ICON_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
  <rect x="3" y="3" width="18" height="18" rx="2" fill="none" stroke="#9ca3af" stroke-width="2"/>
  <circle cx="9" cy="9" r="2" fill="#9ca3af"/>
  <path d="M21 15l-5-5L5 21" fill="none" stroke="#9ca3af" stroke-width="2"/>
  <path d="M3 3l18 18" stroke="#ef4444" stroke-width="2"/>
</svg>"##;

const LABEL: &str = "image unavailable";

/// Paint the "image unavailable" marker into `area` of `dst`.
///
/// The area is tinted so the failed region stays visible on any background, then a crossed
/// picture icon is centred in it with a short label underneath when a font is available.
pub(crate) fn draw_placeholder(
    dst: &mut RasterImage,
    area: Rect,
    fonts: &FontBook,
    painter: &mut TextPainter,
) {
    let area = area.round();
    if area.width() < 1.0 || area.height() < 1.0 {
        return;
    }
    dst.fill_rect(
        area.x0 as i64,
        area.y0 as i64,
        area.width() as u32,
        area.height() as u32,
        Color::rgba(0.5, 0.5, 0.5, 0.15),
    );

    let icon = (area.width().min(area.height()) / 3.0).floor() as u32;
    let center = area.center();
    if icon >= 4 {
        match parse_svg(ICON_SVG).and_then(|tree| rasterize_svg(&tree, icon, icon)) {
            Ok(img) => {
                let half = f64::from(icon) / 2.0;
                dst.composite_over(
                    &img,
                    (center.x - half).round() as i64,
                    (center.y - half).round() as i64,
                );
            }
            Err(e) => warn!(error = %e, "placeholder icon failed to rasterize"),
        }
    }

    let Some(face) = fonts.face(FontChoice::Monospace) else {
        return;
    };
    let size = (area.width() / 14.0).clamp(8.0, 14.0) as f32;
    let paint = TextPaint {
        size_px: size,
        fill: Color::from_rgb8(0x6b, 0x72, 0x80),
        stroke: None,
    };
    match painter.rasterize(LABEL, face, paint) {
        Ok(Some(label)) if label.text_width <= area.width() => {
            let y = center.y + f64::from(icon) / 2.0 + f64::from(size);
            label.draw(dst, center.x, y, HAlign::Center, VAlign::Middle);
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "placeholder label failed to render"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/placeholder.rs"]
mod tests;
