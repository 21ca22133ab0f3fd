use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{GeoPoint, TravelMode};

/// Request shape of the external routing service. Alternatives are always
/// requested; the region bias comes from configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub travel_mode: TravelMode,
    pub provide_alternatives: bool,
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub region: String,
}

impl DirectionsRequest {
    pub fn new(origin: GeoPoint, destination: GeoPoint, mode: TravelMode, region: &str) -> Self {
        Self {
            origin,
            destination,
            travel_mode: mode,
            provide_alternatives: true,
            avoid_highways: false,
            avoid_tolls: false,
            region: region.to_string(),
        }
    }
}

/// Status token of a directions response. Anything the service invents
/// beyond the documented set maps to `UnknownError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionsStatus {
    Ok,
    ZeroResults,
    NotFound,
    MaxWaypointsExceeded,
    InvalidRequest,
    OverQueryLimit,
    RequestDenied,
    #[serde(other)]
    UnknownError,
}

impl DirectionsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectionsStatus::Ok => "OK",
            DirectionsStatus::ZeroResults => "ZERO_RESULTS",
            DirectionsStatus::NotFound => "NOT_FOUND",
            DirectionsStatus::MaxWaypointsExceeded => "MAX_WAYPOINTS_EXCEEDED",
            DirectionsStatus::InvalidRequest => "INVALID_REQUEST",
            DirectionsStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            DirectionsStatus::RequestDenied => "REQUEST_DENIED",
            DirectionsStatus::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for DirectionsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full multi-route response, retained verbatim as the alternates list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectionsResponse {
    pub status: DirectionsStatus,
    #[serde(default)]
    pub routes: Vec<RouteAlternate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAlternate {
    pub legs: Vec<RouteLeg>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub copyrights: String,
    /// Short route name, e.g. a dominant road.
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
}

/// Human-readable text plus the raw value (meters or seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub html_instructions: String,
    pub distance: TextValue,
    pub duration: TextValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<String>,
}
