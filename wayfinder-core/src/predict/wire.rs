use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::model::{GeoPoint, TravelMode};

/// Normalized request body shared by the prediction and optimization
/// endpoints. The travel mode is lowercased on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePayload {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    #[serde(serialize_with = "TravelMode::serialize_lowercase")]
    pub travel_mode: TravelMode,
    pub avoid_tolls: bool,
    pub avoid_highways: bool,
}

impl RoutePayload {
    pub fn new(origin: GeoPoint, destination: GeoPoint, mode: TravelMode) -> Self {
        Self {
            origin,
            destination,
            waypoints: Vec::new(),
            travel_mode: mode,
            avoid_tolls: false,
            avoid_highways: false,
        }
    }
}

/// Error body of a non-2xx prediction response. `detail` is either a plain
/// message or a structured list of per-field validation errors.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

impl ErrorDetail {
    /// Flattens the detail into one user-visible line per field,
    /// `path.to.field: message`.
    pub fn render(&self) -> String {
        match self {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Fields(fields) => fields
                .iter()
                .map(|field| {
                    let path = field.loc.iter().map(ToString::to_string).join(".");
                    format!("{path}: {}", field.msg)
                })
                .join("; "),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<LocSegment>,
    pub msg: String,
}

/// Path segment in a validation error location: object keys and array
/// indices both occur.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Index(u64),
    Key(String),
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Index(index) => write!(f, "{index}"),
            LocSegment::Key(key) => f.write_str(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_lowercases_travel_mode() {
        let payload = RoutePayload::new(
            GeoPoint::new(37.7749, -122.4194).unwrap(),
            GeoPoint::new(37.8044, -122.2711).unwrap(),
            TravelMode::Driving,
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["travel_mode"], "driving");
        assert_eq!(value["origin"]["lat"], 37.7749);
        assert_eq!(value["destination"]["lng"], -122.2711);
        assert_eq!(value["waypoints"], serde_json::json!([]));
        assert_eq!(value["avoid_tolls"], false);
    }

    #[test]
    fn detail_parses_plain_string() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"detail": "Prediction failed: model offline"}"#).unwrap();
        assert_eq!(
            body.detail.unwrap().render(),
            "Prediction failed: model offline"
        );
    }

    #[test]
    fn detail_parses_field_list_and_joins_paths() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"detail": [
                {"loc": ["body", "origin", "lat"], "msg": "ensure this value is less than or equal to 90"},
                {"loc": ["body", "waypoints", 0, "lng"], "msg": "field required"}
            ]}"#,
        )
        .unwrap();
        let rendered = body.detail.unwrap().render();
        assert!(rendered.contains("body.origin.lat: ensure this value is less than or equal to 90"));
        assert!(rendered.contains("body.waypoints.0.lng: field required"));
    }

    #[test]
    fn missing_detail_is_tolerated() {
        let body: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.detail.is_none());
    }
}
