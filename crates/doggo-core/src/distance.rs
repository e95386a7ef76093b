//! Great-circle distance between venues and the user.

use serde::{Deserialize, Serialize};
use std::num::ParseFloatError;
use std::str::FromStr;
use thiserror::Error;

/// Mean earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Errors produced when parsing `"lat,lng"`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinatesError {
    /// No comma separating the two values.
    #[error("expected LAT,LNG, got {0:?}")]
    Format(String),

    /// Latitude is not a number.
    #[error("bad latitude: {0}")]
    Latitude(ParseFloatError),

    /// Longitude is not a number.
    #[error("bad longitude: {0}")]
    Longitude(ParseFloatError),

    /// Latitude outside -90..=90 or longitude outside -180..=180.
    #[error("coordinates out of range: {lat},{lng}")]
    OutOfRange { lat: f64, lng: f64 },
}

impl FromStr for Coordinates {
    type Err = CoordinatesError;

    /// Parses `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordinatesError::Format(s.to_string()))?;
        let lat: f64 = lat.trim().parse().map_err(CoordinatesError::Latitude)?;
        let lng: f64 = lng.trim().parse().map_err(CoordinatesError::Longitude)?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinatesError::OutOfRange { lat, lng });
        }
        Ok(Self { lat, lng })
    }
}

/// Haversine distance in miles.
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().atan2((1.0 - h).sqrt())
}
