//! Reqwest-backed geocoder for postcodes.io-compatible APIs.
//!
//! This adapter owns transport details only: URL building, timeout and
//! HTTP error mapping, and JSON decoding into [`Coordinates`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::body_preview;
use crate::domain::ports::{GeocodeError, Geocoder};
use crate::domain::postcode::{BULK_LOOKUP_LIMIT, Coordinates, postcode_key};

const USER_AGENT: &str = concat!("minaarly-gateway/", env!("CARGO_PKG_VERSION"));

/// Geocoder that talks to `api.postcodes.io` or a compatible mirror.
#[derive(Debug, Clone)]
pub struct PostcodesIoGeocoder {
    client: Client,
    base_url: Url,
}

impl PostcodesIoGeocoder {
    /// Builds a geocoder for `base_url` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidRequest`] when `base_url` does not
    /// parse, or [`GeocodeError::Transport`] when the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let base_url = Url::parse(base_url).map_err(|e| GeocodeError::InvalidRequest {
            message: format!("invalid postcode API url {base_url}: {e}"),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GeocodeError::InvalidRequest {
                message: format!("postcode API url {} cannot be a base", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl LookupResult {
    fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::checked(self.latitude?, self.longitude?)
    }
}

#[derive(Debug, Deserialize)]
struct SingleResponse {
    result: Option<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct BulkEntry {
    query: String,
    result: Option<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    result: Vec<BulkEntry>,
}

#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    postcodes: &'a [String],
}

#[async_trait]
impl Geocoder for PostcodesIoGeocoder {
    async fn lookup(&self, postcode: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = self.endpoint(&["postcodes", postcode.trim()])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_single(body.as_ref())
    }

    async fn bulk_lookup(
        &self,
        postcodes: &[String],
    ) -> Result<HashMap<String, Coordinates>, GeocodeError> {
        if postcodes.is_empty() {
            return Ok(HashMap::new());
        }
        if postcodes.len() > BULK_LOOKUP_LIMIT {
            return Err(GeocodeError::InvalidRequest {
                message: format!(
                    "bulk lookup accepts at most {BULK_LOOKUP_LIMIT} postcodes, got {}",
                    postcodes.len()
                ),
            });
        }

        let url = self.endpoint(&["postcodes"])?;
        let response = self
            .client
            .post(url)
            .json(&BulkRequest { postcodes })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_bulk(body.as_ref())
    }
}

fn parse_single(body: &[u8]) -> Result<Option<Coordinates>, GeocodeError> {
    let decoded: SingleResponse = serde_json::from_slice(body).map_err(|e| GeocodeError::Decode {
        message: format!("invalid postcode lookup payload: {e}"),
    })?;
    Ok(decoded.result.as_ref().and_then(LookupResult::coordinates))
}

fn parse_bulk(body: &[u8]) -> Result<HashMap<String, Coordinates>, GeocodeError> {
    let decoded: BulkResponse = serde_json::from_slice(body).map_err(|e| GeocodeError::Decode {
        message: format!("invalid bulk lookup payload: {e}"),
    })?;
    Ok(decoded
        .result
        .into_iter()
        .filter_map(|entry| {
            let coords = entry.result.as_ref().and_then(LookupResult::coordinates)?;
            Some((postcode_key(&entry.query), coords))
        })
        .collect())
}

fn map_transport_error(error: reqwest::Error) -> GeocodeError {
    GeocodeError::Transport {
        message: error.to_string(),
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocodeError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::TOO_MANY_REQUESTS => GeocodeError::RateLimited { message },
        _ if status.is_client_error() => GeocodeError::InvalidRequest { message },
        _ => GeocodeError::Transport { message },
    }
}
