use std::collections::HashMap;

use crate::assets::color::Color;
use crate::foundation::core::CropArea;
use crate::render::raster::RasterImage;

/// Soft background colours offered when nothing better can be derived.
pub const PASTEL_PALETTE: [[u8; 3]; 12] = [
    [0xff, 0xf5, 0xf5],
    [0xf0, 0xf9, 0xff],
    [0xf0, 0xff, 0xf4],
    [0xff, 0xfb, 0xf0],
    [0xf5, 0xf0, 0xff],
    [0xff, 0xf0, 0xf6],
    [0xf0, 0xff, 0xff],
    [0xff, 0xf5, 0xee],
    [0xf9, 0xf0, 0xff],
    [0xf0, 0xff, 0xf0],
    [0xfe, 0xf7, 0xf0],
    [0xf0, 0xf8, 0xff],
];

const MAX_DOMINANT: usize = 5;
const SAMPLE_STRIDE: usize = 4;

/// Dominant colours of a crop and a background suggestion that complements them.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ColorAnalysis {
    /// Up to five most frequent colours, most frequent first.
    pub dominant: Vec<Color>,
    /// Pastel complementary background.
    pub recommended_background: Color,
}

/// Analyze the colours inside `crop` of `image`.
///
/// Every fourth pixel (row-major over the crop) is sampled; translucent, near-white and
/// near-black pixels are ignored.
pub fn analyze_colors(image: &RasterImage, crop: CropArea) -> ColorAnalysis {
    let crop = crop.clamp_to(image.width, image.height);
    let w = crop.width.max(0) as usize;
    let h = crop.height.max(0) as usize;

    let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
    for idx in (0..w * h).step_by(SAMPLE_STRIDE) {
        let x = crop.x as u32 + (idx % w) as u32;
        let y = crop.y as u32 + (idx / w) as u32;
        let [r, g, b, a] = straight(image.pixel(x, y));
        if a < 128 || (r > 240 && g > 240 && b > 240) || (r < 15 && g < 15 && b < 15) {
            continue;
        }
        *counts.entry([r, g, b]).or_default() += 1;
    }

    let mut ranked: Vec<([u8; 3], u32)> = counts.into_iter().collect();
    ranked.sort_by(|(ca, na), (cb, nb)| nb.cmp(na).then(ca.cmp(cb)));
    let dominant: Vec<Color> = ranked
        .into_iter()
        .take(MAX_DOMINANT)
        .map(|([r, g, b], _)| Color::from_rgb8(r, g, b))
        .collect();

    let recommended_background = recommend_background(&dominant);
    ColorAnalysis {
        dominant,
        recommended_background,
    }
}

/// Complementary pastel of the colours' average HSL.
pub fn recommend_background(colors: &[Color]) -> Color {
    if colors.is_empty() {
        let [r, g, b] = PASTEL_PALETTE[0];
        return Color::from_rgb8(r, g, b);
    }
    let n = colors.len() as f64;
    let (h, s, l) = colors.iter().fold((0.0, 0.0, 0.0), |(h, s, l), c| {
        let (ch, cs, cl) = c.to_hsl();
        (h + ch, s + cs, l + cl)
    });
    let (h, s, l) = (h / n, s / n, l / n);

    let saturation = (s * 0.3).min(20.0);
    let lightness = (l + 30.0).clamp(85.0, 95.0);
    let hue = (h + 180.0) % 360.0;
    let c = Color::from_hsl_percent(hue, saturation, lightness);
    // Quantize through 8-bit so the suggestion round-trips through hex unchanged.
    let [r, g, b, _] = c.to_rgba8();
    Color::from_rgb8(r, g, b)
}

fn straight(px: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = px;
    if a == 0 || a == 255 {
        return px;
    }
    let un = |c: u8| ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8;
    [un(r), un(g), un(b), a]
}

#[cfg(test)]
#[path = "../../tests/unit/assets/palette.rs"]
mod tests;
