use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::assets::color::Color;
use crate::foundation::error::{MapleError, MapleResult};
use crate::foundation::math::{premul_over_px, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// Largest width or height accepted for any raster.
pub const MAX_RASTER_DIM: u32 = 16_384;

/// A raster surface as RGBA8 pixels.
///
/// Pixels are **premultiplied alpha**, tightly packed, row-major. Both decoded source sprites and
/// rendered outputs use this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Allocate a fully transparent raster.
    pub fn new(width: u32, height: u32) -> MapleResult<Self> {
        check_dims(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        })
    }

    /// Allocate a raster filled with `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> MapleResult<Self> {
        let mut out = Self::new(width, height)?;
        out.fill(color);
        Ok(out)
    }

    /// Wrap already-premultiplied bytes.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> MapleResult<Self> {
        check_dims(width, height)?;
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(MapleError::validation(format!(
                "raster byte len {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert a straight-alpha `image` buffer.
    pub fn from_rgba_image(img: image::RgbaImage) -> MapleResult<Self> {
        let (width, height) = img.dimensions();
        let mut data = img.into_raw();
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    /// Return `true` when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub(crate) fn put_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    pub(crate) fn blend_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        let dst = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
        self.data[i..i + 4].copy_from_slice(&premul_over_px(dst, px));
    }

    /// Replace every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let px = color.to_rgba8_premul().to_array();
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Source-over `color` into the rectangle, clipped to the raster.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Color) {
        let px = color.to_rgba8_premul().to_array();
        let x0 = x.clamp(0, i64::from(self.width)) as u32;
        let y0 = y.clamp(0, i64::from(self.height)) as u32;
        let x1 = (x + i64::from(width)).clamp(0, i64::from(self.width)) as u32;
        let y1 = (y + i64::from(height)).clamp(0, i64::from(self.height)) as u32;
        for yy in y0..y1 {
            for xx in x0..x1 {
                self.blend_pixel(xx, yy, px);
            }
        }
    }

    /// Source-over `src` with its top-left corner at `(x, y)`, clipped to the raster.
    pub fn composite_over(&mut self, src: &RasterImage, x: i64, y: i64) {
        for sy in 0..src.height {
            let dy = y + i64::from(sy);
            if dy < 0 || dy >= i64::from(self.height) {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + i64::from(sx);
                if dx < 0 || dx >= i64::from(self.width) {
                    continue;
                }
                self.blend_pixel(dx as u32, dy as u32, src.pixel(sx, sy));
            }
        }
    }

    /// Copy of the raster mirrored around its vertical centre line.
    pub fn mirrored_horizontal(&self) -> RasterImage {
        let mut out = self.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                out.put_pixel(self.width - 1 - x, y, self.pixel(x, y));
            }
        }
        out
    }

    /// Copy of a sub-rectangle, clipped to the raster.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> RasterImage {
        let x1 = x.saturating_add(width).min(self.width);
        let y1 = y.saturating_add(height).min(self.height);
        let w = x1.saturating_sub(x);
        let h = y1.saturating_sub(y);
        let mut data = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for yy in y..y.saturating_add(h) {
            for xx in x..x.saturating_add(w) {
                data.extend_from_slice(&self.pixel(xx, yy));
            }
        }
        RasterImage {
            width: w,
            height: h,
            data,
        }
    }

    /// Straight-alpha copy suitable for encoders.
    pub fn to_rgba_image(&self) -> MapleResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| MapleError::validation("raster buffer does not match its dimensions"))
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> MapleResult<Vec<u8>> {
        let img = self.to_rgba_image()?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    /// Encode as PNG and write to `path`, creating parent directories.
    pub fn save_png(&self, path: impl AsRef<Path>) -> MapleResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

fn check_dims(width: u32, height: u32) -> MapleResult<()> {
    if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
        return Err(MapleError::validation(format!(
            "raster size too large: {width}x{height} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
