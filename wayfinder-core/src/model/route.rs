use serde::{Deserialize, Serialize, Serializer};

use crate::Error;
use crate::directions::{RouteAlternate, Step};

/// Travel mode for a routing request. Directions requests carry the
/// SCREAMING form, prediction payloads the lowercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_directions_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "DRIVING",
            TravelMode::Walking => "WALKING",
            TravelMode::Bicycling => "BICYCLING",
            TravelMode::Transit => "TRANSIT",
        }
    }

    pub fn as_payload_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }

    /// `serialize_with` helper for payloads that want the lowercase form.
    pub fn serialize_lowercase<S: Serializer>(
        mode: &TravelMode,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(mode.as_payload_str())
    }
}

/// Display-friendly digest of the currently selected alternate.
///
/// Always derived from the first leg of the alternate it describes;
/// replaced wholesale whenever the selection or the alternates change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub distance_text: String,
    pub duration_text: String,
    pub duration_seconds: i64,
    pub steps: Vec<Step>,
    pub warnings: Vec<String>,
    pub copyrights: String,
}

impl RouteSummary {
    pub fn for_alternate(alternate: &RouteAlternate) -> Result<Self, Error> {
        let leg = alternate
            .legs
            .first()
            .ok_or_else(|| Error::InvalidData("route has no legs".to_string()))?;
        Ok(Self {
            distance_text: leg.distance.text.clone(),
            duration_text: leg.duration.text.clone(),
            duration_seconds: leg.duration.value,
            steps: leg.steps.clone(),
            warnings: alternate.warnings.clone(),
            copyrights: alternate.copyrights.clone(),
        })
    }
}

/// One successful directions response: the full ordered alternates list as
/// returned by the service, the selected index and its derived summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    alternates: Vec<RouteAlternate>,
    selected: usize,
    summary: RouteSummary,
}

impl RouteResult {
    /// Builds a result with index 0 selected. Fails when the response
    /// carried no routes or the first route has no legs.
    pub fn from_alternates(alternates: Vec<RouteAlternate>) -> Result<Self, Error> {
        let first = alternates
            .first()
            .ok_or_else(|| Error::InvalidData("directions response contained no routes".to_string()))?;
        let summary = RouteSummary::for_alternate(first)?;
        Ok(Self {
            alternates,
            selected: 0,
            summary,
        })
    }

    /// Re-derives the summary for `index`. Out-of-bounds indices are a
    /// no-op and return `false`; no request is re-issued either way.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(alternate) = self.alternates.get(index) else {
            return false;
        };
        match RouteSummary::for_alternate(alternate) {
            Ok(summary) => {
                self.selected = index;
                self.summary = summary;
                true
            }
            Err(err) => {
                log::warn!("cannot select alternate {index}: {err}");
                false
            }
        }
    }

    pub fn alternates(&self) -> &[RouteAlternate] {
        &self.alternates
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn summary(&self) -> &RouteSummary {
        &self.summary
    }
}
