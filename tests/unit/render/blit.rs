use super::*;
use crate::assets::color::Color;

fn checker(width: u32, height: u32) -> RasterImage {
    let mut img = RasterImage::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x, y, [(x * 10) as u8, (y * 10) as u8, 99, 255]);
        }
    }
    img
}

#[test]
fn integer_magnification_repeats_source_pixels() {
    let src = checker(8, 8);
    let mut dst = RasterImage::filled(8, 8, Color::WHITE).unwrap();
    draw_image_rect(
        &mut dst,
        &src,
        CropArea::new(2, 3, 2, 2),
        Rect::new(0.0, 0.0, 8.0, 8.0),
        Affine::IDENTITY,
    );
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(dst.pixel(x, y), src.pixel(2 + x / 4, 3 + y / 4), "at {x},{y}");
        }
    }
}

#[test]
fn flip_transform_mirrors_in_place() {
    let src = checker(6, 6);
    let rect = Rect::new(0.0, 0.0, 12.0, 12.0);
    let crop = CropArea::new(0, 0, 6, 6);

    let mut plain = RasterImage::new(12, 12).unwrap();
    draw_image_rect(&mut plain, &src, crop, rect, Affine::IDENTITY);

    let mut flipped = RasterImage::new(12, 12).unwrap();
    draw_image_rect(&mut flipped, &src, crop, rect, flip_x_about(rect));

    assert_eq!(flipped.mirrored_horizontal(), plain);
}

#[test]
fn flip_about_offset_rect_stays_inside_rect() {
    let src = checker(4, 4);
    let rect = Rect::new(10.0, 0.0, 14.0, 4.0);
    let mut dst = RasterImage::new(20, 4).unwrap();
    draw_image_rect(&mut dst, &src, CropArea::new(0, 0, 4, 4), rect, flip_x_about(rect));
    assert_eq!(dst.pixel(9, 0), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(14, 0), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(10, 0), src.pixel(3, 0));
    assert_eq!(dst.pixel(13, 2), src.pixel(0, 2));
}

#[test]
fn drawing_outside_destination_is_clipped() {
    let src = checker(4, 4);
    let mut dst = RasterImage::new(4, 4).unwrap();
    draw_image_rect(
        &mut dst,
        &src,
        CropArea::new(0, 0, 4, 4),
        Rect::new(-2.0, 2.0, 6.0, 10.0),
        Affine::IDENTITY,
    );
    assert_eq!(dst.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(0, 2), src.pixel(1, 0));
}

#[test]
fn scale_nearest_one_and_a_half() {
    let src = checker(2, 2);
    let out = scale_nearest(&src, 1.5);
    assert_eq!((out.width, out.height), (3, 3));
    assert_eq!(out.pixel(0, 0), src.pixel(0, 0));
    assert_eq!(out.pixel(2, 2), src.pixel(1, 1));
}
