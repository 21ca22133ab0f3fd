// Re-export key components
pub use crate::config::{MapsConfig, PlacesConfig, PredictionConfig, SessionConfig};
pub use crate::directions::{DirectionsService, HttpDirectionsService};
pub use crate::input::{LocationInput, MapPickState};
pub use crate::places::{HttpPlaceResolver, PlaceResolver, PlaceSuggestion};
pub use crate::predict::{HttpPredictionService, PredictionService, RoutePayload};
pub use crate::session::{DisplayState, NavigationSession, TriggerPolicy};

// Core model types
pub use crate::Error;
pub use crate::model::{
    AiRouteView, GeoPoint, LocationSelection, OptimizationResult, PredictionResult, RouteResult,
    RouteSummary, TravelMode,
};
