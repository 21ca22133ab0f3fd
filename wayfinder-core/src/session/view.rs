//! Display-state derivation. Pure: the same session state always yields
//! the same snapshot, and nothing here mutates anything.

use std::collections::BTreeMap;

use serde::Serialize;

use super::SessionState;
use crate::model::{AiRouteView, LocationSelection, RouteSummary, TravelMode};

/// One row in the alternate-route list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternateBrief {
    pub index: usize,
    pub summary: Option<String>,
    pub distance_text: String,
    pub duration_text: String,
}

/// Everything a renderer needs, derived in one shot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub origin: Option<LocationSelection>,
    pub destination: Option<LocationSelection>,
    pub travel_mode: TravelMode,
    pub route_summary: Option<RouteSummary>,
    pub alternates: Vec<AlternateBrief>,
    pub selected_route: usize,
    pub ai_route: Option<AiRouteView>,
    pub augmentation_on: bool,
    /// Straight-line origin-to-destination distance in meters, for context
    /// next to the routed distance.
    pub crow_flies_meters: Option<f64>,
    pub traffic_layer: bool,
    pub advanced_features: BTreeMap<String, bool>,
    pub error: Option<String>,
}

pub(super) fn derive(state: &SessionState) -> DisplayState {
    let alternates = state
        .route
        .as_ref()
        .map(|route| {
            route
                .alternates()
                .iter()
                .enumerate()
                .map(|(index, alternate)| AlternateBrief {
                    index,
                    summary: alternate.summary.clone(),
                    distance_text: alternate
                        .legs
                        .first()
                        .map(|leg| leg.distance.text.clone())
                        .unwrap_or_default(),
                    duration_text: alternate
                        .legs
                        .first()
                        .map(|leg| leg.duration.text.clone())
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    let crow_flies_meters = match (&state.origin, &state.destination) {
        (Some(origin), Some(destination)) => {
            Some(origin.point.distance_meters(&destination.point))
        }
        _ => None,
    };

    DisplayState {
        origin: state.origin.clone(),
        destination: state.destination.clone(),
        travel_mode: state.travel_mode,
        route_summary: state.route.as_ref().map(|route| route.summary().clone()),
        alternates,
        selected_route: state.route.as_ref().map_or(0, |route| route.selected()),
        ai_route: state.ai_view.clone(),
        augmentation_on: state.augmentation_on,
        crow_flies_meters,
        traffic_layer: state.traffic_layer,
        advanced_features: state.advanced_features.clone(),
        error: state.error.clone(),
    }
}
