use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::Settings;
use crate::foundation::error::{MapleError, MapleResult};
use crate::lookup::service::{AppearanceInfo, CharacterLookupService, EquipmentPayload, Identifier};

/// Header carrying the open API key.
pub const API_KEY_HEADER: &str = "x-nxopen-api-key";

/// [`CharacterLookupService`] backed by the public game API.
#[derive(Clone, Debug)]
pub struct NexonClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(serde::Deserialize)]
struct IdResponse {
    ocid: Option<String>,
}

#[derive(serde::Deserialize)]
struct BasicResponse {
    character_name: Option<String>,
    character_guild_name: Option<String>,
    character_image: Option<String>,
}

impl NexonClient {
    /// Client for `base_url` with a per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> MapleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapleError::service(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    /// Client configured from [`Settings`].
    pub fn from_settings(settings: &Settings) -> MapleResult<Self> {
        Self::new(
            settings.api_base_url.clone(),
            settings.api_key.clone(),
            settings.request_timeout(),
        )
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> MapleResult<(StatusCode, String)> {
        let mut req = self.client.get(url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| MapleError::service(format!("GET {url}: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| MapleError::service(format!("GET {url}: read body: {e}")))?;
        debug!(url, %status, "api response");
        Ok((status, body))
    }

    /// Per-date endpoints: 4xx means "no data", everything else unexpected is transient.
    async fn get_dated(
        &self,
        path: &str,
        id: &Identifier,
        date: Option<NaiveDate>,
    ) -> MapleResult<String> {
        let url = format!("{}{path}", self.base_url);
        let mut query = vec![("ocid", id.0.clone())];
        if let Some(d) = date {
            query.push(("date", d.format("%Y-%m-%d").to_string()));
        }
        let (status, body) = self.get(&url, &query).await?;
        if status.is_client_error() {
            return Err(MapleError::not_found(format!(
                "{path} for {id} on {}: status {status}",
                fmt_date(date)
            )));
        }
        if !status.is_success() {
            return Err(MapleError::service(format!("{path}: status {status}")));
        }
        Ok(body)
    }
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "latest".to_owned(), |d| d.to_string())
}

#[async_trait]
impl CharacterLookupService for NexonClient {
    async fn resolve_identifier(&self, name: &str) -> MapleResult<Identifier> {
        let url = format!(
            "{}/id?character_name={}",
            self.base_url,
            urlencoding::encode(name)
        );
        let (status, body) = self.get(&url, &[]).await?;
        if !status.is_success() {
            return Err(MapleError::not_found(format!(
                "character '{name}' not found (status {status})"
            )));
        }
        let parsed: IdResponse = serde_json::from_str(&body)
            .map_err(|_| MapleError::not_found(format!("character '{name}' not found")))?;
        match parsed.ocid {
            Some(ocid) if !ocid.is_empty() => Ok(Identifier(ocid)),
            _ => Err(MapleError::not_found(format!("character '{name}' not found"))),
        }
    }

    async fn appearance(&self, id: &Identifier, date: Option<NaiveDate>) -> MapleResult<AppearanceInfo> {
        let body = self.get_dated("/character/basic", id, date).await?;
        let basic: BasicResponse = serde_json::from_str(&body)?;
        let no_data = || MapleError::not_found(format!("no appearance for {id} on {}", fmt_date(date)));
        let image_url = basic.character_image.filter(|s| !s.is_empty()).ok_or_else(no_data)?;
        let display_name = basic.character_name.filter(|s| !s.is_empty()).ok_or_else(no_data)?;
        Ok(AppearanceInfo {
            display_name,
            guild_name: basic.character_guild_name.filter(|g| !g.is_empty()),
            image_url,
        })
    }

    async fn equipment_state(
        &self,
        id: &Identifier,
        date: Option<NaiveDate>,
    ) -> MapleResult<EquipmentPayload> {
        let body = self.get_dated("/character/item-equipment", id, date).await?;
        let payload: EquipmentPayload = serde_json::from_str(&body)?;
        if payload.is_null() {
            return Err(MapleError::not_found(format!(
                "no equipment for {id} on {}",
                fmt_date(date)
            )));
        }
        Ok(payload)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lookup/nexon.rs"]
mod tests;
