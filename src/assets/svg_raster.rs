use crate::foundation::error::{MapleError, MapleResult};
use crate::render::raster::{MAX_RASTER_DIM, RasterImage};

/// Rasterize `tree` stretched to exactly `width x height` pixels.
pub(crate) fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> MapleResult<RasterImage> {
    if width == 0 || height == 0 || width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
        return Err(MapleError::validation(format!(
            "svg raster size out of range: {width}x{height}"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MapleError::validation("failed to allocate svg pixmap"))?;

    let size = tree.size();
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    // tiny-skia pixmaps are premultiplied RGBA8, same layout as RasterImage.
    RasterImage::from_premul(width, height, pixmap.take())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
