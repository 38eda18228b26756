//! Nearest-neighbour image drawing with an explicit transform.
//!
//! There is no drawing context with mutable state: every call receives the full
//! local-to-device [`Affine`] it should use, so a mirrored layer can never leak its transform
//! into the next draw.

use crate::foundation::core::{Affine, CropArea, Point, Rect};
use crate::render::raster::RasterImage;

/// Mirror transform around the vertical centre line of `rect`.
pub(crate) fn flip_x_about(rect: Rect) -> Affine {
    let cx2 = rect.x0 + rect.x1;
    Affine::new([-1.0, 0.0, 0.0, 1.0, cx2, 0.0])
}

/// Draw the `crop` region of `src`, stretched to `dst_rect`, onto `dst`.
///
/// `dst_rect` is in local space and is mapped to device pixels by `transform`. Sampling is
/// nearest-neighbour at pixel centres, so integer magnifications reproduce source pixels as
/// crisp blocks. `crop` must already be clamped to `src`.
pub(crate) fn draw_image_rect(
    dst: &mut RasterImage,
    src: &RasterImage,
    crop: CropArea,
    dst_rect: Rect,
    transform: Affine,
) {
    if crop.is_empty() || src.is_empty() || dst_rect.width() <= 0.0 || dst_rect.height() <= 0.0 {
        return;
    }
    let det = transform.determinant();
    if !det.is_finite() || det == 0.0 {
        return;
    }
    let inv = transform.inverse();

    let bbox = transform.transform_rect_bbox(dst_rect);
    let x_start = bbox.x0.floor().max(0.0) as u32;
    let y_start = bbox.y0.floor().max(0.0) as u32;
    let x_end = bbox.x1.ceil().clamp(0.0, f64::from(dst.width)) as u32;
    let y_end = bbox.y1.ceil().clamp(0.0, f64::from(dst.height)) as u32;

    let cw = f64::from(crop.width);
    let ch = f64::from(crop.height);
    let rw = dst_rect.width();
    let rh = dst_rect.height();

    for py in y_start..y_end {
        for px in x_start..x_end {
            let local = inv * Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
            if local.x < dst_rect.x0
                || local.x >= dst_rect.x1
                || local.y < dst_rect.y0
                || local.y >= dst_rect.y1
            {
                continue;
            }
            let u = ((local.x - dst_rect.x0) * cw / rw).floor() as i64;
            let v = ((local.y - dst_rect.y0) * ch / rh).floor() as i64;
            let sx = i64::from(crop.x) + u.clamp(0, i64::from(crop.width) - 1);
            let sy = i64::from(crop.y) + v.clamp(0, i64::from(crop.height) - 1);
            let sample = src.pixel(sx as u32, sy as u32);
            dst.blend_pixel(px, py, sample);
        }
    }
}

/// Nearest-neighbour rescale of a whole raster by `factor`.
pub(crate) fn scale_nearest(src: &RasterImage, factor: f64) -> RasterImage {
    let w = ((f64::from(src.width) * factor).round().max(1.0)) as u32;
    let h = ((f64::from(src.height) * factor).round().max(1.0)) as u32;
    let mut out = RasterImage {
        width: w,
        height: h,
        data: vec![0; (w as usize) * (h as usize) * 4],
    };
    let full = CropArea::new(0, 0, src.width as i32, src.height as i32);
    draw_image_rect(
        &mut out,
        src,
        full,
        Rect::new(0.0, 0.0, f64::from(w), f64::from(h)),
        Affine::IDENTITY,
    );
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/blit.rs"]
mod tests;
