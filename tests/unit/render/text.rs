use super::*;
use crate::assets::font::system_monospace;

fn bitmap(w: u32, h: u32) -> TextBitmap {
    TextBitmap {
        image: RasterImage::filled(w, h, Color::BLACK).unwrap(),
        pad: 1.0,
        text_width: f64::from(w) - 2.0,
        text_height: f64::from(h) - 2.0,
        baseline: 6.0,
    }
}

#[test]
fn right_baseline_anchor_places_box_left_of_point() {
    let bm = bitmap(12, 10);
    let mut dst = RasterImage::filled(40, 40, Color::WHITE).unwrap();
    bm.draw(&mut dst, 30.0, 20.0, HAlign::Right, VAlign::Baseline);
    // Box spans x in [30 - 10 - 1, 30 + 1), y in [20 - 6 - 1, 20 - 6 - 1 + 10).
    assert_eq!(dst.pixel(19, 13), [0, 0, 0, 255]);
    assert_eq!(dst.pixel(30, 22), [0, 0, 0, 255]);
    assert_eq!(dst.pixel(18, 13), [255, 255, 255, 255]);
    assert_eq!(dst.pixel(31, 13), [255, 255, 255, 255]);
    assert_eq!(dst.pixel(19, 23), [255, 255, 255, 255]);
}

#[test]
fn center_middle_anchor_is_symmetric() {
    let bm = bitmap(10, 10);
    let mut dst = RasterImage::filled(30, 30, Color::WHITE).unwrap();
    bm.draw(&mut dst, 15.0, 15.0, HAlign::Center, VAlign::Middle);
    assert_eq!(dst.pixel(10, 10), [0, 0, 0, 255]);
    assert_eq!(dst.pixel(19, 19), [0, 0, 0, 255]);
    assert_eq!(dst.pixel(9, 10), [255, 255, 255, 255]);
    assert_eq!(dst.pixel(20, 19), [255, 255, 255, 255]);
}

#[test]
fn scaled_bitmap_scales_metrics() {
    let bm = bitmap(10, 8).scaled(1.5);
    assert_eq!((bm.image.width, bm.image.height), (15, 12));
    assert_eq!(bm.baseline, 9.0);
    assert_eq!(bm.pad, 1.5);
}

#[test]
fn blank_text_rasterizes_to_nothing() {
    let face = FontFace {
        bytes: Arc::new(Vec::new()),
        index: 0,
    };
    let paint = TextPaint {
        size_px: 12.0,
        fill: Color::BLACK,
        stroke: None,
    };
    assert!(TextPainter::new().rasterize("   ", &face, paint).unwrap().is_none());
}

#[test]
fn stroked_label_has_ink_in_both_colours() {
    let Some(face) = system_monospace() else {
        return;
    };
    let paint = TextPaint {
        size_px: 24.0,
        fill: Color::BLACK,
        stroke: Some((Color::WHITE, 4.0)),
    };
    let bm = TextPainter::new()
        .rasterize("Lumi", &face, paint)
        .unwrap()
        .unwrap();
    assert!(bm.text_width > 0.0);
    let px: Vec<[u8; 4]> = bm
        .image
        .data
        .chunks_exact(4)
        .map(|p| [p[0], p[1], p[2], p[3]])
        .collect();
    assert!(px.iter().any(|p| *p == [0, 0, 0, 255]));
    assert!(px.iter().any(|p| *p == [255, 255, 255, 255]));
}
