//! Geocoding proxy handler.

use std::collections::HashMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{GeocodeRequest, GeocodeResponse, GeocodeResult};
use crate::app_state::AppState;
use crate::domain::postcode::{BULK_LOOKUP_LIMIT, normalise_postcode, postcode_key};
use crate::error::{ErrorResponse, ServiceError};

/// `POST /geocode` — Resolve UK postcodes to coordinates.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] for a blank postcode or more
/// than 100 postcodes, and [`ServiceError::UpstreamUnavailable`] when the
/// postcode API fails.
#[utoipa::path(
    post,
    path = "/api/v1/geocode",
    tag = "Geocoding",
    summary = "Look up postcodes",
    description = "`{\"action\":\"single\",\"postcode\":\"...\"}` or `{\"action\":\"bulk\",\"postcodes\":[...]}`. Unknown postcodes resolve to `null` coordinates.",
    request_body = GeocodeRequest,
    responses(
        (status = 200, description = "Lookup results", body = GeocodeResponse),
        (status = 400, description = "Blank postcode or too many postcodes", body = ErrorResponse),
        (status = 502, description = "Postcode API unavailable", body = ErrorResponse),
    )
)]
pub async fn geocode(
    State(state): State<AppState>,
    Json(req): Json<GeocodeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    match req {
        GeocodeRequest::Single { postcode } => {
            let Some(postcode) = normalise_postcode(&postcode) else {
                return Err(ServiceError::InvalidRequest(
                    "postcode is required".to_string(),
                ));
            };
            let coordinates = state.geocoder.lookup(&postcode).await?;
            Ok(Json(GeocodeResponse::Single(GeocodeResult {
                postcode,
                coordinates,
            })))
        }
        GeocodeRequest::Bulk { postcodes } => {
            if postcodes.is_empty() {
                return Err(ServiceError::InvalidRequest(
                    "postcodes must not be empty".to_string(),
                ));
            }
            if postcodes.len() > BULK_LOOKUP_LIMIT {
                return Err(ServiceError::InvalidRequest(format!(
                    "at most {BULK_LOOKUP_LIMIT} postcodes per request, got {}",
                    postcodes.len()
                )));
            }

            let normalised: Vec<String> = postcodes
                .iter()
                .filter_map(|pc| normalise_postcode(pc))
                .collect();
            let found: HashMap<String, _> = if normalised.is_empty() {
                HashMap::new()
            } else {
                state.geocoder.bulk_lookup(&normalised).await?
            };

            let results = postcodes
                .into_iter()
                .map(|raw| {
                    let postcode = normalise_postcode(&raw).unwrap_or(raw);
                    let coordinates = found.get(&postcode_key(&postcode)).copied();
                    GeocodeResult {
                        postcode,
                        coordinates,
                    }
                })
                .collect();
            tracing::debug!(requested = normalised.len(), resolved = found.len(), "bulk geocode");
            Ok(Json(GeocodeResponse::Bulk { results }))
        }
    }
}

/// Geocoding routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/geocode", post(geocode))
}
