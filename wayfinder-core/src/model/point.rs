use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A WGS84 coordinate pair.
///
/// `GeoPoint::new` validates ranges and finiteness, so points built through
/// it are always safe to dispatch. Points arriving over the wire bypass the
/// constructor; callers on those paths re-check with [`GeoPoint::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, Error> {
        let point = Self { lat, lng };
        point.validate("requested")?;
        Ok(point)
    }

    /// Range and finiteness check, usable as a pre-dispatch guard.
    /// `field` names the coordinate in the resulting error message.
    pub fn validate(&self, field: &'static str) -> Result<(), Error> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(Error::InvalidCoordinate {
                field,
                reason: "latitude and longitude must be finite numbers".to_string(),
            });
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinate {
                field,
                reason: format!("latitude {} is outside [-90, 90]", self.lat),
            });
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinate {
                field,
                reason: format!("longitude {} is outside [-180, 180]", self.lng),
            });
        }
        Ok(())
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        Haversine.distance(Point::from(*self), Point::from(*other))
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point::new(point.lng, point.lat)
    }
}

/// A resolved origin or destination: the coordinate plus the display
/// address when the point came from geocoding rather than a map click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub point: GeoPoint,
    pub address: Option<String>,
}

impl LocationSelection {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            point,
            address: None,
        }
    }

    pub fn with_address(point: GeoPoint, address: impl Into<String>) -> Self {
        Self {
            point,
            address: Some(address.into()),
        }
    }
}
