//! Directions-service seam: wire contract, trait and HTTP client.
//!
//! The routing computation itself is an external collaborator; this module
//! only shapes requests and normalizes responses.

mod client;
mod wire;

use std::future::Future;

pub use client::HttpDirectionsService;
pub use wire::{
    DirectionsRequest, DirectionsResponse, DirectionsStatus, RouteAlternate, RouteLeg, Step,
    TextValue,
};

use crate::Error;

/// One stateless `route` call per request. Implementations are created
/// once at startup and shared read-only for the lifetime of the session.
pub trait DirectionsService: Send + Sync {
    fn route(
        &self,
        request: &DirectionsRequest,
    ) -> impl Future<Output = Result<DirectionsResponse, Error>> + Send;
}
