use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::assets::decode::decode_image;
use crate::foundation::error::{MapleError, MapleResult};
use crate::render::raster::RasterImage;

/// Where a character sprite comes from.
///
/// Serialized externally tagged: `{"url": "..."}` or `{"path": "..."}`. In-memory bytes are for
/// programmatic callers only and are skipped by serde.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Absolute `http(s)` URL of the rendered sprite.
    Url(String),
    /// Local file.
    Path(PathBuf),
    /// Already-fetched encoded image bytes.
    #[serde(skip)]
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    /// Wrap encoded bytes.
    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Short human-readable label for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Url(u) => u.clone(),
            Self::Path(p) => p.display().to_string(),
            Self::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

/// Awaitable image loading boundary used by the compositor.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch and decode `source` into a premultiplied raster.
    async fn load(&self, source: &ImageSource) -> MapleResult<RasterImage>;
}

/// `reqwest`-backed fetcher that routes remote images through a same-origin proxy when one is
/// configured.
#[derive(Clone, Debug)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    proxy_base: Option<Url>,
}

impl HttpImageFetcher {
    /// Build a fetcher with a per-request timeout and no proxy.
    pub fn new(timeout: Duration) -> MapleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapleError::service(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            proxy_base: None,
        })
    }

    /// Route every remote image through `proxy_base?url=<encoded>`.
    pub fn with_proxy(mut self, proxy_base: &str) -> MapleResult<Self> {
        let base = Url::parse(proxy_base)
            .map_err(|e| MapleError::validation(format!("invalid proxy url '{proxy_base}': {e}")))?;
        self.proxy_base = Some(base);
        Ok(self)
    }

    /// The URL actually requested for a remote `source_url`.
    pub fn request_url(&self, source_url: &str) -> MapleResult<Url> {
        let parsed = Url::parse(source_url).map_err(|e| {
            MapleError::image_unavailable(format!("invalid image url '{source_url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MapleError::image_unavailable(format!(
                "unsupported image url scheme '{}'",
                parsed.scheme()
            )));
        }
        let Some(base) = &self.proxy_base else {
            return Ok(parsed);
        };
        let mut out = base.clone();
        let encoded = urlencoding::encode(source_url);
        let query = match base.query() {
            Some(q) if !q.is_empty() => format!("{q}&url={encoded}"),
            _ => format!("url={encoded}"),
        };
        out.set_query(Some(&query));
        Ok(out)
    }

    async fn fetch_bytes(&self, source_url: &str) -> MapleResult<Vec<u8>> {
        let url = self.request_url(source_url)?;
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MapleError::image_unavailable(format!("GET {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MapleError::image_unavailable(format!(
                "GET {url}: status {status}"
            )));
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| MapleError::image_unavailable(format!("GET {url}: {e}")))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn load(&self, source: &ImageSource) -> MapleResult<RasterImage> {
        match source {
            ImageSource::Url(u) => {
                let bytes = self.fetch_bytes(u).await?;
                decode_image(&bytes)
            }
            ImageSource::Path(p) => {
                let bytes = tokio::fs::read(p).await.map_err(|e| {
                    MapleError::image_unavailable(format!("read '{}': {e}", p.display()))
                })?;
                decode_image(&bytes)
            }
            ImageSource::Bytes(b) => decode_image(b),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
