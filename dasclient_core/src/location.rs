use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CoordinateError {
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
}

/// A WGS84 point. Serialized as `{latitude, longitude}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Builds a point from a `(longitude, latitude)` pair, the order used by
    /// GeoJSON and by the tracking service's coordinate arrays.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, CoordinateError> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}
