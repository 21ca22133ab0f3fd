//! Place suggestion and geocoding seam.
//!
//! Free-text queries resolve to ranked candidates; each candidate geocodes
//! to exactly one coordinate. Both lookups are external collaborators.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::{GeoPoint, LocationSelection};

/// One ranked autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub description: String,
    pub place_id: String,
}

pub trait PlaceResolver: Send + Sync {
    fn suggest(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<PlaceSuggestion>, Error>> + Send;

    fn geocode(
        &self,
        suggestion: &PlaceSuggestion,
    ) -> impl Future<Output = Result<LocationSelection, Error>> + Send;
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    predictions: Vec<PlaceSuggestion>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeoPoint,
}

/// Client for the external suggestion/geocoding service.
#[derive(Debug, Clone)]
pub struct HttpPlaceResolver {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpPlaceResolver {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }
}

impl PlaceResolver for HttpPlaceResolver {
    async fn suggest(&self, query: &str) -> Result<Vec<PlaceSuggestion>, Error> {
        let url = format!("{}/autocomplete", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("input", query), ("key", self.api_key.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "suggestion service returned HTTP {status}"
            )));
        }
        let body = response.json::<SuggestResponse>().await?;
        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(body.predictions),
            other => Err(Error::Network(format!(
                "suggestion lookup failed: {other}"
            ))),
        }
    }

    async fn geocode(&self, suggestion: &PlaceSuggestion) -> Result<LocationSelection, Error> {
        let url = format!("{}/geocode", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("place_id", suggestion.place_id.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "geocoding service returned HTTP {status}"
            )));
        }
        let body = response.json::<GeocodeResponse>().await?;
        if body.status != "OK" {
            return Err(Error::Network(format!(
                "geocoding failed: {}",
                body.status
            )));
        }
        let result = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidData("geocoding returned no results".to_string()))?;
        // Wire data bypasses the validating constructor.
        result.geometry.location.validate("geocoded")?;
        Ok(LocationSelection::with_address(
            result.geometry.location,
            result.formatted_address,
        ))
    }
}
