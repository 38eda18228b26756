use super::*;

fn painted(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> RasterImage {
    let mut img = RasterImage::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x, y, f(x, y));
        }
    }
    img
}

#[test]
fn ranks_colours_by_frequency() {
    // Top three quarters red, bottom quarter blue.
    let img = painted(8, 8, |_, y| {
        if y < 6 {
            [200, 10, 10, 255]
        } else {
            [10, 10, 200, 255]
        }
    });
    let a = analyze_colors(&img, CropArea::new(0, 0, 8, 8));
    assert_eq!(a.dominant[0], Color::from_rgb8(200, 10, 10));
    assert!(a.dominant.contains(&Color::from_rgb8(10, 10, 200)));
    assert!(a.dominant.len() <= 5);
}

#[test]
fn ignores_transparent_white_and_black() {
    let img = painted(4, 4, |x, y| match (x + y) % 3 {
        0 => [0, 0, 0, 0],
        1 => [255, 255, 255, 255],
        _ => [3, 3, 3, 255],
    });
    let a = analyze_colors(&img, CropArea::new(0, 0, 4, 4));
    assert!(a.dominant.is_empty());
    let [r, g, b] = PASTEL_PALETTE[0];
    assert_eq!(a.recommended_background, Color::from_rgb8(r, g, b));
}

#[test]
fn recommendation_is_light_complementary_pastel() {
    let bg = recommend_background(&[Color::from_rgb8(255, 0, 0)]);
    let (h, s, l) = bg.to_hsl();
    assert!((h - 180.0).abs() < 2.0, "hue {h}");
    assert!(s <= 21.0, "saturation {s}");
    assert!((84.0..=96.0).contains(&l), "lightness {l}");
    assert!(!bg.is_dark());
}

#[test]
fn out_of_range_crop_is_clamped() {
    let img = painted(4, 4, |_, _| [10, 120, 30, 255]);
    let a = analyze_colors(&img, CropArea::new(-10, 2, 100, 100));
    assert_eq!(a.dominant, vec![Color::from_rgb8(10, 120, 30)]);
}
