use super::*;

const LOOK: &str = "https://open.api.nexon.com/static/maplestory/character/look/ABCDEF";

#[test]
fn custom_url_carries_pose_and_size() {
    let url = custom_image_url(LOOK, &Pose::default(), SPRITE_WIDTH, SPRITE_HEIGHT);
    assert_eq!(
        url,
        format!("{LOOK}?action=A00&emotion=E00&wmotion=W00&width=300&height=400")
    );
}

#[test]
fn with_emotion_rewrites_only_emotion() {
    let url = custom_image_url(LOOK, &Pose::default(), 300, 400);
    let out = with_emotion(&url, "E05");
    assert_eq!(
        out,
        format!("{LOOK}?action=A00&emotion=E05&wmotion=W00&width=300&height=400")
    );
}

#[test]
fn with_emotion_handles_trailing_and_missing_params() {
    assert_eq!(with_emotion("https://x/l?emotion=E01", "E02"), "https://x/l?emotion=E02");
    assert_eq!(with_emotion("https://x/l", "E02"), "https://x/l?emotion=E02");
    assert_eq!(with_emotion("https://x/l?a=1", "E02"), "https://x/l?a=1&emotion=E02");
    assert_eq!(
        with_emotion("https://x/l?xemotion=1", "E03"),
        "https://x/l?xemotion=1&emotion=E03"
    );
}

#[test]
fn pose_codes_are_validated() {
    Pose::default().validate().unwrap();
    Pose::with_emotion("E09").validate().unwrap();
    assert!(Pose::with_emotion("X09").validate().is_err());
    assert!(Pose::with_emotion("E1").validate().is_err());
    assert!(Pose::with_emotion("E1a").validate().is_err());
}
