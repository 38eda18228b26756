pub use kurbo::{Affine, Point, Rect, Size};

/// Crop rectangle in source-image pixel space.
///
/// Fields are signed so that out-of-range input coming from JSON or a UI drag survives
/// deserialization; every consumer goes through [`CropArea::clamp_to`] before sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CropArea {
    /// Left edge in source pixels.
    pub x: i32,
    /// Top edge in source pixels.
    pub y: i32,
    /// Width in source pixels.
    pub width: i32,
    /// Height in source pixels.
    pub height: i32,
}

impl CropArea {
    /// Face crop used for freshly looked-up characters on the 300x400 render.
    pub const DEFAULT_FACE: CropArea = CropArea {
        x: 115,
        y: 122,
        width: 60,
        height: 60,
    };

    /// Create a crop rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Mirror the rectangle's x coordinate against a source of width `source_width`.
    ///
    /// The mirrored rectangle selects the same pixels a viewer sees inside `self` after the
    /// source image is flipped horizontally.
    pub fn mirrored(self, source_width: u32) -> Self {
        let sw = i64::from(source_width);
        let x = sw - i64::from(self.x) - i64::from(self.width);
        Self {
            x: x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            ..self
        }
    }

    /// Clamp the rectangle into `[0, source_width) x [0, source_height)`.
    ///
    /// The origin is clamped first; width and height are then clamped to `[1, remaining]`.
    /// An empty source yields an empty rectangle at the origin.
    pub fn clamp_to(self, source_width: u32, source_height: u32) -> Self {
        if source_width == 0 || source_height == 0 {
            return Self::new(0, 0, 0, 0);
        }
        let sw = i64::from(source_width);
        let sh = i64::from(source_height);

        let x = i64::from(self.x).clamp(0, sw - 1);
        let y = i64::from(self.y).clamp(0, sh - 1);
        let w = i64::from(self.width).clamp(1, sw - x);
        let h = i64::from(self.height).clamp(1, sh - y);

        Self::new(x as i32, y as i32, w as i32, h as i32)
    }

    /// Apply the flip-aware adjustment used before sampling, then clamp into the source.
    pub fn sampling_rect(self, flip_horizontal: bool, source_width: u32, source_height: u32) -> Self {
        let base = if flip_horizontal {
            self.mirrored(source_width)
        } else {
            self
        };
        base.clamp_to(source_width, source_height)
    }

    /// Width divided by height; `1.0` for degenerate rectangles.
    pub fn aspect_ratio(self) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        f64::from(self.width) / f64::from(self.height)
    }

    /// Largest size with this rectangle's aspect ratio that fits a `max x max` square.
    pub fn fit_within(self, max: f64) -> Size {
        let ratio = self.aspect_ratio();
        if ratio > 1.0 {
            Size::new(max, max / ratio)
        } else {
            Size::new(max * ratio, max)
        }
    }

    /// Convert to a `kurbo` rectangle in source space.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.x) + f64::from(self.width),
            f64::from(self.y) + f64::from(self.height),
        )
    }
}

impl Default for CropArea {
    fn default() -> Self {
        Self::DEFAULT_FACE
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Byte layout used by raster buffers.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
