//! UK postcode normalisation and coordinate pairs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum number of postcodes accepted by one bulk lookup.
pub const BULK_LOOKUP_LIMIT: usize = 100;

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    /// Latitude in degrees, within `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in degrees, within `[-180, 180]`.
    pub longitude: f64,
}

impl Coordinates {
    /// Builds a pair when both values are finite and in range.
    #[must_use]
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        in_range.then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// Normalises a postcode: trimmed, upper-cased, internal whitespace
/// collapsed to single spaces.
///
/// Returns `None` for blank input.
#[must_use]
pub fn normalise_postcode(raw: &str) -> Option<String> {
    let joined = raw
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Lookup key for matching postcodes regardless of spacing.
#[must_use]
pub fn postcode_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
