use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{debug, warn};

use crate::foundation::error::{MapleError, MapleResult};

/// Where the decorative display font is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// Local font file.
    Path(PathBuf),
    /// Remote font file fetched over HTTP.
    Url(String),
}

impl FontSource {
    /// `http(s)://` strings are URLs, anything else is a path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_owned())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }
}

/// Raw font file bytes plus the face index inside collections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFace {
    /// Font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index for `.ttc` collections.
    pub index: u32,
}

impl FontFace {
    /// Wrap font bytes after checking that they contain at least one parseable face.
    pub fn from_bytes(bytes: Vec<u8>) -> MapleResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes.clone());
        if db.faces().next().is_none() {
            return Err(MapleError::validation("font data contains no usable faces"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
            index: 0,
        })
    }
}

/// Which face a piece of text asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontChoice {
    /// Decorative display face (falls back to monospace).
    #[default]
    Display,
    /// Generic monospace face.
    Monospace,
}

/// Fonts available to the compositor.
///
/// A book without any faces is valid; text draws are then skipped.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    display: Option<FontFace>,
    monospace: Option<FontFace>,
}

impl FontBook {
    /// A book with no faces at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A book with the given display face and the system monospace fallback.
    pub fn with_display(display: FontFace) -> Self {
        Self {
            display: Some(display),
            monospace: system_monospace(),
        }
    }

    /// A book holding only the system monospace fallback, if one exists.
    pub fn system() -> Self {
        Self {
            display: None,
            monospace: system_monospace(),
        }
    }

    /// Replace the monospace fallback.
    pub fn with_monospace(mut self, face: Option<FontFace>) -> Self {
        self.monospace = face;
        self
    }

    /// Load the display font from `source`, waiting at most `wait`.
    ///
    /// Never fails: timeouts and bad data log a warning and leave the display slot empty so
    /// text resolves to the monospace fallback.
    pub async fn load(source: Option<&FontSource>, wait: Duration, client: &reqwest::Client) -> Self {
        let mut book = Self::system();
        let Some(source) = source else {
            return book;
        };
        match tokio::time::timeout(wait, read_font(source, client)).await {
            Ok(Ok(face)) => {
                debug!(?source, "display font loaded");
                book.display = Some(face);
            }
            Ok(Err(e)) => warn!(?source, error = %e, "display font failed to load, using monospace"),
            Err(_) => warn!(?source, ?wait, "display font load timed out, using monospace"),
        }
        if book.is_empty() {
            warn!("no fonts available, text will be skipped");
        }
        book
    }

    /// `true` when no face is available.
    pub fn is_empty(&self) -> bool {
        self.display.is_none() && self.monospace.is_none()
    }

    /// `true` when the decorative face loaded.
    pub fn has_display(&self) -> bool {
        self.display.is_some()
    }

    /// Resolve `choice` to a concrete face, falling back to monospace.
    pub fn face(&self, choice: FontChoice) -> Option<&FontFace> {
        match choice {
            FontChoice::Display => self.display.as_ref().or(self.monospace.as_ref()),
            FontChoice::Monospace => self.monospace.as_ref().or(self.display.as_ref()),
        }
    }
}

async fn read_font(source: &FontSource, client: &reqwest::Client) -> MapleResult<FontFace> {
    let bytes = match source {
        FontSource::Path(p) => tokio::fs::read(p)
            .await
            .map_err(|e| MapleError::service(format!("read font '{}': {e}", p.display())))?,
        FontSource::Url(u) => {
            let resp = client
                .get(u)
                .send()
                .await
                .map_err(|e| MapleError::service(format!("GET {u}: {e}")))?;
            if !resp.status().is_success() {
                return Err(MapleError::service(format!(
                    "GET {u}: status {}",
                    resp.status()
                )));
            }
            resp.bytes()
                .await
                .map_err(|e| MapleError::service(format!("GET {u}: {e}")))?
                .to_vec()
        }
    };
    FontFace::from_bytes(bytes)
}

/// First monospace face known to the system font database; scanned once per process.
pub fn system_monospace() -> Option<FontFace> {
    static CACHE: OnceLock<Option<FontFace>> = OnceLock::new();
    CACHE
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            let query = usvg::fontdb::Query {
                families: &[usvg::fontdb::Family::Monospace],
                ..Default::default()
            };
            let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
            let face = db.with_face_data(id, |data, index| FontFace {
                bytes: Arc::new(data.to_vec()),
                index,
            });
            if face.is_none() {
                warn!("system font database has no readable faces");
            }
            face
        })
        .clone()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
