use crate::foundation::error::{MapleError, MapleResult};

/// Width of the full-body sprite requested from the image renderer.
pub const SPRITE_WIDTH: u32 = 300;
/// Height of the full-body sprite requested from the image renderer.
pub const SPRITE_HEIGHT: u32 = 400;

/// Pose codes understood by the character image renderer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    /// Body action, `A00`..
    pub action: String,
    /// Facial expression, `E00`..
    pub emotion: String,
    /// Weapon motion, `W00`..
    pub wmotion: String,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            action: "A00".to_owned(),
            emotion: "E00".to_owned(),
            wmotion: "W00".to_owned(),
        }
    }
}

impl Pose {
    /// Default pose with a different expression.
    pub fn with_emotion(emotion: impl Into<String>) -> Self {
        Self {
            emotion: emotion.into(),
            ..Self::default()
        }
    }

    /// Reject codes that are not a prefix letter followed by two digits.
    pub fn validate(&self) -> MapleResult<()> {
        validate_code('A', &self.action)?;
        validate_code('E', &self.emotion)?;
        validate_code('W', &self.wmotion)?;
        Ok(())
    }
}

/// Check a pose code such as `E07`.
pub fn validate_code(prefix: char, code: &str) -> MapleResult<()> {
    let mut chars = code.chars();
    let ok = chars.next() == Some(prefix)
        && code.len() == 3
        && chars.all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(MapleError::validation(format!(
            "pose code '{code}' must look like {prefix}00"
        )))
    }
}

/// Append the renderer's pose and size query to a base character image URL.
pub fn custom_image_url(base: &str, pose: &Pose, width: u32, height: u32) -> String {
    format!(
        "{base}?action={}&emotion={}&wmotion={}&width={width}&height={height}",
        pose.action, pose.emotion, pose.wmotion
    )
}

/// Rewrite only the `emotion` query parameter of an image URL, appending it when absent.
pub fn with_emotion(url: &str, code: &str) -> String {
    let mut search_from = 0;
    while let Some(rel) = url[search_from..].find("emotion=") {
        let start = search_from + rel;
        let at_param_start = start > 0 && matches!(url.as_bytes()[start - 1], b'?' | b'&');
        if at_param_start {
            let value_start = start + "emotion=".len();
            let value_end = url[value_start..]
                .find('&')
                .map_or(url.len(), |i| value_start + i);
            return format!("{}{code}{}", &url[..value_start], &url[value_end..]);
        }
        search_from = start + 1;
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}emotion={code}")
}

#[cfg(test)]
#[path = "../../tests/unit/lookup/pose.rs"]
mod tests;
