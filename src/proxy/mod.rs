//! Same-origin image proxy.
//!
//! Character sprites live on another origin; pixel-level work on them in a browser needs them
//! served from the page's own origin. `GET /api/proxy-image?url=<absolute-url>` relays the
//! upstream bytes and content type.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{debug, info, warn};

use crate::foundation::error::{MapleError, MapleResult};

/// Route served by [`router`].
pub const PROXY_ROUTE: &str = "/api/proxy-image";

const DEFAULT_CONTENT_TYPE: &str = "image/png";
const CACHE_POLICY: &str = "s-maxage=86400";

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct ProxyQuery {
    url: Option<String>,
}

/// Router exposing the proxy route, fetching upstream with `client`.
pub fn router(client: reqwest::Client) -> Router {
    Router::new()
        .route(PROXY_ROUTE, get(proxy_image))
        .with_state(ProxyState { client })
}

/// Bind `addr` and serve `app` until `shutdown` resolves.
pub async fn serve<F>(addr: SocketAddr, app: Router, shutdown: F) -> MapleResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MapleError::service(format!("bind {addr}: {e}")))?;
    info!("image proxy listening on http://{addr}{PROXY_ROUTE}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MapleError::service(format!("serve {addr}: {e}")))
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

async fn proxy_image(State(state): State<ProxyState>, Query(query): Query<ProxyQuery>) -> Response {
    let Some(target) = query.url.filter(|u| !u.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "URL is required");
    };
    let scheme_ok = url::Url::parse(&target)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !scheme_ok {
        return json_error(StatusCode::BAD_REQUEST, "URL must be absolute http(s)");
    }

    let upstream = match state.client.get(&target).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(url = %target, error = %e, "proxy upstream request failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    let status = upstream.status();
    if !status.is_success() {
        debug!(url = %target, %status, "proxy upstream returned error status");
        return json_error(status, "Failed to fetch image");
    }

    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_owned();
    match upstream.bytes().await {
        Ok(body) => (
            [
                (CONTENT_TYPE, content_type),
                (CACHE_CONTROL, CACHE_POLICY.to_owned()),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(url = %target, error = %e, "proxy upstream body failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/proxy/mod.rs"]
mod tests;
