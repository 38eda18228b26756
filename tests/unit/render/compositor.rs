use std::collections::HashMap;

use async_trait::async_trait;

use super::*;

/// Serves rasters keyed by URL; every other source fails.
struct MapFetcher(HashMap<String, RasterImage>);

#[async_trait]
impl ImageFetcher for MapFetcher {
    async fn load(&self, source: &ImageSource) -> MapleResult<RasterImage> {
        match source {
            ImageSource::Url(u) => self
                .0
                .get(u)
                .cloned()
                .ok_or_else(|| MapleError::image_unavailable(u.clone())),
            _ => Err(MapleError::image_unavailable("unsupported")),
        }
    }
}

fn solid(w: u32, h: u32, rgb: [u8; 3]) -> RasterImage {
    RasterImage::filled(w, h, Color::from_rgb8(rgb[0], rgb[1], rgb[2])).unwrap()
}

fn compositor(images: &[(&str, RasterImage)]) -> Compositor {
    let map = images
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect();
    Compositor::new(Arc::new(MapFetcher(map)), FontBook::empty())
}

fn appearance(url: &str, crop: CropArea) -> CharacterAppearance {
    let mut a = CharacterAppearance::new("t", ImageSource::Url(url.to_owned()));
    a.crop = crop;
    a.show_name = false;
    a
}

#[tokio::test]
async fn zero_scale_is_rejected() {
    let c = compositor(&[]);
    let a = appearance("a", CropArea::new(0, 0, 4, 4));
    assert!(matches!(
        c.render_single(&a, 0).await,
        Err(MapleError::Validation(_))
    ));
}

#[tokio::test]
async fn out_of_range_crop_is_clamped_not_rejected() {
    let c = compositor(&[("a", solid(10, 10, [9, 9, 9]))]);
    let a = appearance("a", CropArea::new(8, -3, 50, 4));
    let out = c.render_single(&a, 2).await.unwrap();
    // x clamps to 8 leaving width 2; y clamps to 0 keeping height 4.
    assert_eq!((out.width, out.height), (4, 8));
    assert_eq!(out.pixel(0, 0), [9, 9, 9, 255]);
}

#[tokio::test]
async fn failed_single_uses_crop_size_and_background() {
    let c = compositor(&[]);
    let mut a = appearance("missing", CropArea::new(0, 0, 10, 5));
    a.background = Color::from_rgb8(0, 0, 255);
    let out = c.render_single(&a, 3).await.unwrap();
    assert_eq!((out.width, out.height), (30, 15));
    assert_eq!(out.pixel(0, 0)[2], out.pixel(29, 14)[2]);
}

#[tokio::test]
async fn failed_single_clamps_oversized_crop_to_sprite() {
    let c = compositor(&[]);
    let a = appearance("missing", CropArea::new(0, 0, 5000, 5000));
    let out = c.render_single(&a, 4).await.unwrap();
    assert_eq!((out.width, out.height), (300 * 4, 400 * 4));

    let a = appearance("missing", CropArea::new(250, 390, 100, 100));
    let out = c.render_single(&a, 2).await.unwrap();
    assert_eq!((out.width, out.height), (100, 20));
}

#[tokio::test]
async fn single_name_lands_in_bottom_right_corner() {
    let Some(face) = crate::assets::font::system_monospace() else {
        return;
    };
    let gray = [128, 128, 128, 255];
    let map = [("a".to_owned(), solid(300, 400, [128, 128, 128]))].into_iter().collect();
    let c = Compositor::new(Arc::new(MapFetcher(map)), FontBook::with_display(face));
    let mut a = appearance("a", CropArea::new(0, 0, 60, 60));
    a.name = "Lumi".into();
    a.show_name = true;

    let out = c.render_single(&a, 4).await.unwrap();
    assert_eq!((out.width, out.height), (240, 240));
    let inked = |x0: u32, y0: u32| {
        (y0..y0 + 120).any(|y| (x0..x0 + 120).any(|x| out.pixel(x, y) != gray))
    };
    assert!(inked(120, 120));
    assert!(!inked(0, 0));
}

#[tokio::test]
async fn pair_anchors_layers_to_bottom_corners() {
    let c = compositor(&[
        ("l", solid(300, 400, [255, 0, 0])),
        ("r", solid(300, 400, [0, 255, 0])),
    ]);
    let left = CompositeLayer::left(appearance("l", CropArea::new(0, 0, 60, 60)));
    let right = CompositeLayer::right(appearance("r", CropArea::new(0, 0, 120, 60)));
    let out = c.render_pair(&left, &right, Color::WHITE).await.unwrap();
    assert_eq!((out.width, out.height), (PAIR_WIDTH, PAIR_HEIGHT));

    // Left: square 360x360 at bottom-left.
    assert_eq!(out.pixel(0, 399), [255, 0, 0, 255]);
    assert_eq!(out.pixel(0, 40), [255, 0, 0, 255]);
    assert_eq!(out.pixel(0, 39), [255, 255, 255, 255]);
    // Right: 2:1 crop -> 360x180 at bottom-right, drawn over the left overlap.
    assert_eq!(out.pixel(599, 399), [0, 255, 0, 255]);
    assert_eq!(out.pixel(240, 399), [0, 255, 0, 255]);
    assert_eq!(out.pixel(239, 399), [255, 0, 0, 255]);
    assert_eq!(out.pixel(599, 219), [255, 255, 255, 255]);
}

#[tokio::test]
async fn on_top_flag_controls_overlap() {
    let c = compositor(&[
        ("l", solid(300, 400, [255, 0, 0])),
        ("r", solid(300, 400, [0, 255, 0])),
    ]);
    let left = CompositeLayer::left(appearance("l", CropArea::new(0, 0, 60, 60))).on_top();
    let right = CompositeLayer::right(appearance("r", CropArea::new(0, 0, 60, 60)));
    let out = c.render_pair(&left, &right, Color::WHITE).await.unwrap();
    // Overlap is x in [240, 360).
    assert_eq!(out.pixel(300, 399), [255, 0, 0, 255]);

    let plain_left = CompositeLayer::left(left.appearance.clone());
    let out = c.render_pair(&plain_left, &right, Color::WHITE).await.unwrap();
    assert_eq!(out.pixel(300, 399), [0, 255, 0, 255]);
}

#[tokio::test]
async fn pair_side_failure_is_contained() {
    let c = compositor(&[("l", solid(300, 400, [255, 0, 0]))]);
    let left = CompositeLayer::left(appearance("l", CropArea::new(0, 0, 60, 60)));
    let right = CompositeLayer::right(appearance("gone", CropArea::new(0, 0, 60, 60)));
    let out = c.render_pair(&left, &right, Color::WHITE).await.unwrap();
    assert_eq!(out.pixel(10, 390), [255, 0, 0, 255]);
    // Placeholder tint marks the failed right square.
    assert_ne!(out.pixel(590, 390), [255, 255, 255, 255]);
    assert_ne!(out.pixel(590, 390), [255, 0, 0, 255]);
}

#[test]
fn grid_canvas_sizes_follow_arrangement() {
    let c = compositor(&[]);
    let tile = solid(600, 400, [1, 2, 3]);
    let tiles = [tile.clone(), tile.clone(), tile.clone(), tile];

    let column = GridSpec::default();
    let out = c.render_grid(&tiles, &column).unwrap();
    assert_eq!((out.width, out.height), (640, 4 * 400 + 3 * 15 + 300));
    assert_eq!(out.pixel(20, 150), [1, 2, 3, 255]);
    assert_eq!(out.pixel(20, 150 + 400), [255, 255, 255, 255]);
    assert_eq!(out.pixel(20, 150 + 415), [1, 2, 3, 255]);

    let grid = GridSpec {
        arrangement: GridArrangement::Grid2x2,
        top_margin: 10,
        bottom_margin: 30,
        ..GridSpec::default()
    };
    let out = c.render_grid(&tiles, &grid).unwrap();
    assert_eq!((out.width, out.height), (2 * 600 + 15 + 40, 2 * 400 + 15 + 40));
    assert_eq!(out.pixel(19, 10), [255, 255, 255, 255]);
    assert_eq!(out.pixel(20 + 615, 10 + 415), [1, 2, 3, 255]);
}

#[test]
fn oversized_grid_margins_are_rejected() {
    let c = compositor(&[]);
    let tile = solid(600, 400, [1, 2, 3]);
    let tiles = [tile.clone(), tile.clone(), tile.clone(), tile];
    let spec = GridSpec {
        top_margin: u32::MAX - 10,
        ..GridSpec::default()
    };
    assert!(matches!(
        c.render_grid(&tiles, &spec),
        Err(MapleError::Validation(_))
    ));

    // Each margin is in range but the canvas is not.
    let spec = GridSpec {
        top_margin: 16_000,
        bottom_margin: 16_000,
        ..GridSpec::default()
    };
    assert!(c.render_grid(&tiles, &spec).is_err());
}

/// Bounding columns of pixels in rows `y0..y1` for which `ink` holds.
fn ink_span(out: &RasterImage, y0: u32, y1: u32, ink: impl Fn([u8; 4]) -> bool) -> Option<(u32, u32)> {
    let cols: Vec<u32> = (0..out.width)
        .filter(|&x| (y0..y1).any(|y| ink(out.pixel(x, y))))
        .collect();
    Some((*cols.first()?, *cols.last()?))
}

#[test]
fn grid_captions_contrast_with_frame_and_sit_in_their_bands() {
    let Some(face) = crate::assets::font::system_monospace() else {
        return;
    };
    let c = Compositor::new(Arc::new(MapFetcher(HashMap::new())), FontBook::with_display(face));
    let tile = solid(600, 400, [128, 128, 128]);
    let tiles = [tile.clone(), tile.clone(), tile.clone(), tile];
    let light = |p: [u8; 4]| p[0] >= 200 && p[1] >= 200 && p[2] >= 200;
    let dark = |p: [u8; 4]| p[0] <= 55 && p[1] <= 55 && p[2] <= 55;

    let spec = GridSpec {
        frame_color: Color::BLACK,
        top_text: Some("TOP".into()),
        bottom_text: Some("END".into()),
        ..GridSpec::default()
    };
    let out = c.render_grid(&tiles, &spec).unwrap();
    let content_end = 150 + 4 * 400 + 3 * 15;
    let (l, r) = ink_span(&out, 0, 150, light).expect("top caption ink");
    let centre = f64::from(l + r) / 2.0;
    assert!((centre - f64::from(out.width) / 2.0).abs() < 30.0, "centre {centre}");
    assert!(ink_span(&out, content_end, out.height, light).is_some());

    let spec = GridSpec {
        frame_color: Color::WHITE,
        ..spec
    };
    let out = c.render_grid(&tiles, &spec).unwrap();
    assert!(ink_span(&out, 0, 150, dark).is_some());
    assert!(ink_span(&out, content_end, out.height, dark).is_some());
    // Tiles stay clear of caption ink.
    assert_eq!(out.pixel(320, 150), [128, 128, 128, 255]);
}

#[tokio::test]
async fn slots_degrade_per_slot() {
    let c = compositor(&[("a", solid(300, 400, [200, 0, 200]))]);
    let ok = appearance("a", CropArea::DEFAULT_FACE);
    let bad = appearance("b", CropArea::DEFAULT_FACE);
    let out = c
        .render_slots(&[ok.clone(), bad, ok], SlotLayout::Horizontal)
        .await
        .unwrap();
    assert_eq!((out.width, out.height), (900, 400));
    assert_eq!(out.pixel(5, 5), [200, 0, 200, 255]);
    assert_ne!(out.pixel(305, 5), [200, 0, 200, 255]);
    assert_eq!(out.pixel(605, 5), [200, 0, 200, 255]);

    let out = c
        .render_slots(&[appearance("a", CropArea::DEFAULT_FACE)], SlotLayout::Grid)
        .await
        .unwrap();
    assert_eq!((out.width, out.height), (600, 800));
    assert!(c.render_slots(&[], SlotLayout::Vertical).await.is_err());
}

#[tokio::test]
async fn analyze_surfaces_load_errors() {
    let c = compositor(&[]);
    let err = c
        .analyze(&appearance("nope", CropArea::DEFAULT_FACE))
        .await
        .unwrap_err();
    assert!(matches!(err, MapleError::ImageUnavailable(_)));
}
