use super::{CatalogError, CatalogProvider, CatalogRecord};
use crate::http_handler::ResponseError;
use crate::util::Credentials;
use crate::{info, warn};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Live catalog backed by the Space-Track `tle_latest` class.
///
/// Every fetch logs in first; the session cookie lives in the client's cookie store.
pub struct SpaceTrackCatalog {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    norad_ids: Vec<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct TleRow {
    #[serde(default)]
    object_name: Option<String>,
    norad_cat_id: Value,
    inclination: Value,
    mean_motion: Value,
    #[serde(default)]
    tle_line1: Option<String>,
    #[serde(default)]
    tle_line2: Option<String>,
}

/// Space-Track encodes most numbers as strings.
fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TleRow {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn into_record(self) -> Option<CatalogRecord> {
        let norad_id = lenient_f64(&self.norad_cat_id).filter(|id| *id >= 0.0 && id.fract() == 0.0)? as u32;
        let inclination = lenient_f64(&self.inclination)?;
        let mean_motion = lenient_f64(&self.mean_motion).filter(|mm| *mm > 0.0)?;
        let tle = self.tle_line1.zip(self.tle_line2);
        Some(CatalogRecord {
            name: self.object_name.unwrap_or_else(|| format!("NORAD {norad_id}")),
            norad_id,
            inclination,
            period_minutes: 1440.0 / mean_motion,
            tle,
        })
    }
}

impl SpaceTrackCatalog {
    pub const BASE_URL: &'static str = "https://www.space-track.org";
    const LOGIN_ENDPOINT: &'static str = "ajaxauth/login";
    const TIMEOUT: Duration = Duration::from_secs(20);
    /// Objects queried when no explicit id list is given.
    pub const DEFAULT_IDS: [u32; 6] = [25544, 20580, 33591, 44713, 40697, 41866];

    /// # Errors
    /// Returns [`CatalogError::Request`] if the HTTP client could not be built.
    pub fn new(credentials: Credentials, norad_ids: Vec<u32>) -> Result<Self, CatalogError> {
        Self::with_base_url(Self::BASE_URL, credentials, norad_ids)
    }

    /// # Errors
    /// Returns [`CatalogError::Request`] if the HTTP client could not be built.
    pub fn with_base_url(base_url: &str, credentials: Credentials, norad_ids: Vec<u32>) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().cookie_store(true).timeout(Self::TIMEOUT).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), credentials, norad_ids })
    }

    pub(crate) fn query_url(&self) -> String {
        format!(
            "{}/basicspacedata/query/class/tle_latest/ORDINAL/1/NORAD_CAT_ID/{}/format/json",
            self.base_url,
            self.norad_ids.iter().join(",")
        )
    }

    async fn login(&self) -> Result<(), CatalogError> {
        let form = [("identity", self.credentials.username.as_str()), ("password", self.credentials.password.as_str())];
        let response = self.client.post(format!("{}/{}", self.base_url, Self::LOGIN_ENDPOINT)).form(&form).send().await?;
        let body = ResponseError::unwrap_return_code(response).await?.text().await?;
        // a rejected login still answers 200
        if body.contains("\"Failed\"") {
            return Err(CatalogError::Unauthorized);
        }
        Ok(())
    }
}

/// Converts a `tle_latest` JSON answer into records, skipping unusable rows.
pub(crate) fn parse_records(body: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
    let rows: Vec<TleRow> = serde_json::from_str(body)?;
    let total = rows.len();
    let records: Vec<CatalogRecord> = rows.into_iter().filter_map(TleRow::into_record).collect();
    if records.len() < total {
        warn!("Skipped {} unusable catalog rows.", total - records.len());
    }
    Ok(records)
}

#[async_trait::async_trait]
impl CatalogProvider for SpaceTrackCatalog {
    fn name(&self) -> &'static str { "space-track" }

    async fn records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.login().await?;
        let response = self.client.get(self.query_url()).send().await?;
        let body = ResponseError::unwrap_return_code(response).await?.text().await?;
        let records = parse_records(&body)?;
        info!("Fetched {} records from Space-Track.", records.len());
        Ok(records)
    }
}
