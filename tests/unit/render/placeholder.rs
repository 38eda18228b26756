use super::*;

#[test]
fn placeholder_stays_inside_its_area() {
    let mut dst = RasterImage::filled(100, 60, Color::WHITE).unwrap();
    draw_placeholder(
        &mut dst,
        Rect::new(50.0, 0.0, 100.0, 60.0),
        &FontBook::empty(),
        &mut TextPainter::new(),
    );
    for y in 0..60 {
        for x in 0..50 {
            assert_eq!(dst.pixel(x, y), [255, 255, 255, 255], "leaked at {x},{y}");
        }
    }
    assert_ne!(dst.pixel(75, 30), [255, 255, 255, 255]);
}

#[test]
fn degenerate_area_is_ignored() {
    let mut dst = RasterImage::filled(10, 10, Color::WHITE).unwrap();
    let before = dst.clone();
    draw_placeholder(
        &mut dst,
        Rect::new(3.0, 3.0, 3.2, 9.0),
        &FontBook::empty(),
        &mut TextPainter::new(),
    );
    assert_eq!(dst, before);
}
