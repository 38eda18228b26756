use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 128u8]).unwrap();
    let decoded = decode_image(&png_bytes(img)).unwrap();
    assert_eq!((decoded.width, decoded.height), (1, 1));
    assert_eq!(
        decoded.data.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn garbage_and_empty_payloads_are_image_unavailable() {
    assert!(matches!(
        decode_image(b"not an image"),
        Err(MapleError::ImageUnavailable(_))
    ));
    assert!(matches!(decode_image(&[]), Err(MapleError::ImageUnavailable(_))));
}

#[test]
fn decode_svg_parse_ok_and_err() {
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
    parse_svg(ok).unwrap();
    assert!(parse_svg(br#"<svg"#).is_err());
}
