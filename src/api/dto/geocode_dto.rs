//! Geocoding proxy DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::postcode::Coordinates;

/// Request body for `POST /geocode`, tagged by `action`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GeocodeRequest {
    /// Look up one postcode.
    Single {
        /// Postcode in any spacing or case.
        postcode: String,
    },
    /// Look up to 100 postcodes in one call.
    Bulk {
        /// Postcodes in any spacing or case.
        postcodes: Vec<String>,
    },
}

/// One postcode and where it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GeocodeResult {
    /// Normalised postcode, or the input as given when blank.
    pub postcode: String,
    /// `null` when the postcode is unknown.
    pub coordinates: Option<Coordinates>,
}

/// Response body for `POST /geocode`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum GeocodeResponse {
    /// Answer to a `single` request.
    Single(GeocodeResult),
    /// Answer to a `bulk` request, in request order.
    Bulk {
        /// One entry per requested postcode.
        results: Vec<GeocodeResult>,
    },
}
