//! Geographic point attached to transactions.

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees.
///
/// Always carried as a nested object (`{"lat": .., "lng": ..}`), never as an
/// encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoPoint {
    /// Latitude, `-90.0..=90.0`.
    pub lat: f64,
    /// Longitude, `-180.0..=180.0`.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point without validating it.
    #[inline]
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both coordinates are finite and within range.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0_f64..=90.0_f64).contains(&self.lat)
            && (-180.0_f64..=180.0_f64).contains(&self.lng)
    }
}
