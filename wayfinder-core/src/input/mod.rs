//! Location input for one endpoint field (origin or destination).
//!
//! Holds only its own text buffer, candidate list and map-pick arming
//! state; the authoritative selection lives in the session. Lookup
//! failures are logged and leave previous state untouched.

use crate::model::{GeoPoint, LocationSelection};
use crate::places::{PlaceResolver, PlaceSuggestion};

/// Map-pick arming state. `Armed` consumes exactly one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapPickState {
    #[default]
    Idle,
    Armed,
}

#[derive(Debug)]
pub struct LocationInput<R> {
    resolver: R,
    query: String,
    suggestions: Vec<PlaceSuggestion>,
    pick_state: MapPickState,
}

impl<R: PlaceResolver> LocationInput<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            query: String::new(),
            suggestions: Vec::new(),
            pick_state: MapPickState::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[PlaceSuggestion] {
        &self.suggestions
    }

    pub fn pick_state(&self) -> MapPickState {
        self.pick_state
    }

    /// Updates the text buffer and refreshes the candidate list. A failed
    /// lookup keeps the previous candidates.
    pub async fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        if self.query.trim().is_empty() {
            self.suggestions.clear();
            return;
        }
        match self.resolver.suggest(&self.query).await {
            Ok(candidates) => self.suggestions = candidates,
            Err(err) => log::warn!("suggestion lookup failed for {:?}: {err}", self.query),
        }
    }

    /// Geocodes the candidate at `index`. Returns `None` (and logs) on
    /// failure or an out-of-range index; no partial update either way.
    pub async fn choose(&mut self, index: usize) -> Option<LocationSelection> {
        let suggestion = self.suggestions.get(index)?.clone();
        match self.resolver.geocode(&suggestion).await {
            Ok(selection) => {
                if let Some(address) = &selection.address {
                    self.query = address.clone();
                }
                Some(selection)
            }
            Err(err) => {
                log::warn!("geocoding failed for {:?}: {err}", suggestion.description);
                None
            }
        }
    }

    pub fn arm_map_pick(&mut self) {
        self.pick_state = MapPickState::Armed;
    }

    /// Disarms without emitting anything.
    pub fn cancel_map_pick(&mut self) {
        self.pick_state = MapPickState::Idle;
    }

    /// Consumes a map click: when armed, disarms and emits the pick;
    /// otherwise the click is not for this input.
    pub fn map_click(&mut self, point: GeoPoint) -> Option<LocationSelection> {
        match self.pick_state {
            MapPickState::Armed => {
                self.pick_state = MapPickState::Idle;
                Some(LocationSelection::from_point(point))
            }
            MapPickState::Idle => None,
        }
    }
}
