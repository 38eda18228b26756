use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;

use crate::foundation::error::{MapleError, MapleResult};

/// Public game API root.
pub const DEFAULT_API_BASE_URL: &str = "https://open.api.nexon.com/maplestory/v1";

/// Runtime settings. Every field has a default, so `{}` is a valid settings file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Character API root.
    pub api_base_url: String,
    /// Value of the `x-nxopen-api-key` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Same-origin image proxy, e.g. `http://127.0.0.1:8787/api/proxy-image`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_base_url: Option<String>,
    /// Per-request HTTP timeout.
    pub request_timeout_ms: u64,
    /// Path or URL of the decorative name font.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_font: Option<String>,
    /// Longest wait for the display font before falling back to monospace.
    pub font_load_timeout_ms: u64,
    /// History walk defaults.
    pub walk: WalkSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            api_key: None,
            proxy_base_url: None,
            request_timeout_ms: 10_000,
            display_font: None,
            font_load_timeout_ms: 100,
            walk: WalkSettings::default(),
        }
    }
}

/// History walk defaults.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WalkSettings {
    /// Maximum snapshots emitted per walk.
    pub cap: usize,
    /// Oldest date visited (inclusive).
    pub boundary: NaiveDate,
    /// Fixed delay between dates.
    pub pacing_ms: u64,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            cap: 20,
            boundary: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap_or_default(),
            pacing_ms: 50,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MapleResult<Self> {
        let settings: Settings = serde_json::from_reader(r)
            .map_err(|e| MapleError::validation(format!("parse settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MapleResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MapleError::validation(format!("open settings JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject settings no component can work with.
    pub fn validate(&self) -> MapleResult<()> {
        url::Url::parse(&self.api_base_url).map_err(|e| {
            MapleError::validation(format!("invalid api_base_url '{}': {e}", self.api_base_url))
        })?;
        if let Some(p) = &self.proxy_base_url {
            url::Url::parse(p)
                .map_err(|e| MapleError::validation(format!("invalid proxy_base_url '{p}': {e}")))?;
        }
        if self.request_timeout_ms == 0 {
            return Err(MapleError::validation("request_timeout_ms must be > 0"));
        }
        Ok(())
    }

    /// HTTP timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Display font wait as a [`Duration`].
    pub fn font_load_timeout(&self) -> Duration {
        Duration::from_millis(self.font_load_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
