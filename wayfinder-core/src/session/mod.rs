//! The navigation session orchestrator.
//!
//! Owns all authoritative state and applies every mutation atomically per
//! completed operation. External calls never hold the state lock across an
//! await; each logical operation carries an epoch token so a response that
//! was superseded (newer call, clear, toggle-off) is discarded on arrival
//! instead of clobbering newer state.

mod view;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::directions::{DirectionsRequest, DirectionsService, DirectionsStatus};
use crate::model::{AiRouteView, LocationSelection, RouteResult, TravelMode};
use crate::predict::{PredictionService, RoutePayload};

pub use view::{AlternateBrief, DisplayState};

/// When route computation fires: only on explicit user action (default),
/// or automatically whenever origin, destination or mode changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPolicy {
    #[default]
    Manual,
    Auto,
}

#[derive(Debug)]
struct SessionState {
    origin: Option<LocationSelection>,
    destination: Option<LocationSelection>,
    travel_mode: TravelMode,
    route: Option<RouteResult>,
    ai_view: Option<AiRouteView>,
    augmentation_on: bool,
    error: Option<String>,
    traffic_layer: bool,
    advanced_features: BTreeMap<String, bool>,
    route_epoch: u64,
    augment_epoch: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            travel_mode: TravelMode::default(),
            route: None,
            ai_view: None,
            augmentation_on: false,
            error: None,
            traffic_layer: true,
            advanced_features: BTreeMap::new(),
            route_epoch: 0,
            augment_epoch: 0,
        }
    }
}

impl SessionState {
    /// Drops the prediction/optimization bundle and invalidates in-flight
    /// augmentation responses. Kept together so the view never observes a
    /// partial merge or an "on" flag with no data behind it.
    fn drop_augmentation(&mut self) {
        self.ai_view = None;
        self.augmentation_on = false;
        self.augment_epoch += 1;
    }
}

pub struct NavigationSession<D, P> {
    directions: D,
    predictor: P,
    region: String,
    trigger: TriggerPolicy,
    state: Mutex<SessionState>,
}

impl<D: DirectionsService, P: PredictionService> NavigationSession<D, P> {
    pub fn new(directions: D, predictor: P, region: impl Into<String>, trigger: TriggerPolicy) -> Self {
        Self {
            directions,
            predictor,
            region: region.into(),
            trigger,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    pub fn trigger(&self) -> TriggerPolicy {
        self.trigger
    }

    pub async fn set_origin(&self, selection: Option<LocationSelection>) -> Result<(), Error> {
        self.lock().origin = selection;
        self.maybe_auto_compute().await
    }

    pub async fn set_destination(&self, selection: Option<LocationSelection>) -> Result<(), Error> {
        self.lock().destination = selection;
        self.maybe_auto_compute().await
    }

    pub async fn set_travel_mode(&self, mode: TravelMode) -> Result<(), Error> {
        self.lock().travel_mode = mode;
        self.maybe_auto_compute().await
    }

    async fn maybe_auto_compute(&self) -> Result<(), Error> {
        if self.trigger != TriggerPolicy::Auto {
            return Ok(());
        }
        let ready = {
            let state = self.lock();
            state.origin.is_some() && state.destination.is_some()
        };
        if ready {
            return self.compute_route().await;
        }
        Ok(())
    }

    /// Issues one directions request with alternatives enabled. On `OK`
    /// the full alternates list replaces the previous route wholesale and
    /// the selection resets to index 0; on any other status the prior
    /// route state is preserved and the raw status is surfaced. A response
    /// superseded by a newer call or a clear is discarded.
    pub async fn compute_route(&self) -> Result<(), Error> {
        let (request, token) = {
            let mut state = self.lock();
            let origin = state.origin.as_ref().ok_or(Error::MissingOrigin)?.point;
            let destination = state
                .destination
                .as_ref()
                .ok_or(Error::MissingDestination)?
                .point;
            state.error = None;
            state.route_epoch += 1;
            (
                DirectionsRequest::new(origin, destination, state.travel_mode, &self.region),
                state.route_epoch,
            )
        };

        let outcome = self.directions.route(&request).await;

        let mut state = self.lock();
        if token != state.route_epoch {
            log::debug!("discarding superseded directions response");
            return Ok(());
        }
        match outcome {
            Ok(response) if response.status == DirectionsStatus::Ok => {
                match RouteResult::from_alternates(response.routes) {
                    Ok(route) => {
                        state.route = Some(route);
                        // A recomputed base route invalidates any AI view
                        // derived from the previous one.
                        state.drop_augmentation();
                        Ok(())
                    }
                    Err(err) => {
                        state.error = Some(err.to_string());
                        Err(err)
                    }
                }
            }
            Ok(response) => {
                let err = Error::Directions(response.status.to_string());
                state.error = Some(err.to_string());
                Err(err)
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Switches the summary to `index` without re-issuing any request.
    /// Out-of-bounds indices are ignored.
    pub fn select_alternate(&self, index: usize) {
        let mut state = self.lock();
        if let Some(route) = state.route.as_mut() {
            if !route.select(index) {
                log::debug!("ignoring out-of-range alternate index {index}");
            }
        }
    }

    /// Clears all route-derived and AI-derived state. Epoch bumps make any
    /// in-flight response stale, so the cleared state cannot be
    /// resurrected by a late arrival.
    pub fn clear_route(&self) {
        let mut state = self.lock();
        state.route = None;
        state.route_epoch += 1;
        state.drop_augmentation();
    }

    /// Requests the prediction and, only if that succeeds, the advanced
    /// optimization, then merges both into the AI route view. Coordinates
    /// are validated before any network call; optimization failures are
    /// non-fatal.
    pub async fn request_augmentation(&self) -> Result<(), Error> {
        let (payload, token) = {
            let mut state = self.lock();
            let origin = state.origin.as_ref().ok_or(Error::MissingOrigin)?.point;
            let destination = state
                .destination
                .as_ref()
                .ok_or(Error::MissingDestination)?
                .point;
            if state.route.is_none() {
                return Err(Error::NoBaseRoute);
            }
            if let Err(err) = origin
                .validate("origin")
                .and_then(|()| destination.validate("destination"))
            {
                state.error = Some(err.to_string());
                return Err(err);
            }
            state.augment_epoch += 1;
            (
                RoutePayload::new(origin, destination, state.travel_mode),
                state.augment_epoch,
            )
        };

        let prediction = match self.predictor.predict(&payload).await {
            Ok(prediction) => prediction,
            Err(err) => {
                let mut state = self.lock();
                if token == state.augment_epoch {
                    state.error = Some(err.to_string());
                }
                return Err(err);
            }
        };

        // Advisory only: absence degrades the view, nothing else.
        let optimization = match self.predictor.optimize(&payload).await {
            Ok(optimization) => Some(optimization),
            Err(err) => {
                log::warn!("advanced optimization unavailable: {err}");
                None
            }
        };

        let mut state = self.lock();
        if token != state.augment_epoch {
            log::debug!("discarding augmentation response superseded by clear or toggle-off");
            return Ok(());
        }
        state.ai_view = Some(AiRouteView::merge(prediction, optimization));
        state.augmentation_on = true;
        state.error = None;
        Ok(())
    }

    /// Turning augmentation off discards all AI-derived state immediately;
    /// a response from a still-running request is dropped on arrival.
    pub fn toggle_augmentation(&self, on: bool) {
        let mut state = self.lock();
        if on {
            state.augmentation_on = true;
        } else {
            state.drop_augmentation();
        }
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    pub fn set_traffic_layer(&self, visible: bool) {
        self.lock().traffic_layer = visible;
    }

    pub fn set_feature(&self, name: &str, enabled: bool) {
        self.lock()
            .advanced_features
            .insert(name.to_string(), enabled);
    }

    /// Snapshot for rendering; a pure function of the current state.
    pub fn display_state(&self) -> DisplayState {
        view::derive(&self.lock())
    }
}
