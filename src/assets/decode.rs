use anyhow::Context;

use crate::foundation::error::{MapleError, MapleResult};
use crate::render::raster::RasterImage;

/// Decode PNG/JPEG bytes into a premultiplied raster.
pub fn decode_image(bytes: &[u8]) -> MapleResult<RasterImage> {
    if bytes.is_empty() {
        return Err(MapleError::image_unavailable("image payload is empty"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| MapleError::image_unavailable(format!("decode image from memory: {e}")))?;
    RasterImage::from_rgba_image(dyn_img.to_rgba8())
}

/// Parse an SVG document with default options.
pub fn parse_svg(bytes: &[u8]) -> MapleResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
