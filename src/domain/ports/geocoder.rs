//! Driven port for postcode-to-coordinate lookups.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::postcode::Coordinates;

/// Errors surfaced while calling the postcode service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    /// Network transport failed before receiving a response.
    #[error("geocoder transport failed: {message}")]
    Transport {
        /// Transport failure detail.
        message: String,
    },
    /// The postcode service throttled the request.
    #[error("geocoder rate limited request: {message}")]
    RateLimited {
        /// Upstream status detail.
        message: String,
    },
    /// The response could not be decoded.
    #[error("geocoder response decode failed: {message}")]
    Decode {
        /// Decode failure detail.
        message: String,
    },
    /// The request was rejected before or by the service.
    #[error("geocoder request invalid: {message}")]
    InvalidRequest {
        /// Validation detail.
        message: String,
    },
}

/// Port for resolving UK postcodes to coordinates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves one postcode. `Ok(None)` means the service does not know it.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the service cannot be reached or
    /// answers with something unusable.
    async fn lookup(&self, postcode: &str) -> Result<Option<Coordinates>, GeocodeError>;

    /// Resolves up to [`crate::domain::postcode::BULK_LOOKUP_LIMIT`]
    /// postcodes in one call.
    ///
    /// The returned map is keyed by [`crate::domain::postcode::postcode_key`];
    /// unresolved postcodes are absent.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] when the whole batch fails.
    async fn bulk_lookup(
        &self,
        postcodes: &[String],
    ) -> Result<HashMap<String, Coordinates>, GeocodeError>;
}
