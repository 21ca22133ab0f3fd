//! Configuration sections consumed by the session and its clients.
//!
//! The maps API key is client-side configuration; a missing or
//! still-placeholder key puts the whole application into a degraded
//! setup-required mode with no route functionality.

use serde::Deserialize;

use crate::Error;
use crate::session::TriggerPolicy;

/// Sentinel left in place by the setup template; treated the same as a
/// missing key.
pub const PLACEHOLDER_API_KEY: &str = "your_new_api_key_here";

#[derive(Debug, Clone, Deserialize)]
pub struct MapsConfig {
    #[serde(default)]
    pub api_key: String,
    pub directions_url: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "US".to_string()
}

impl MapsConfig {
    pub fn is_setup_required(&self) -> bool {
        self.api_key.trim().is_empty() || self.api_key == PLACEHOLDER_API_KEY
    }

    pub fn ensure_configured(&self) -> Result<(), Error> {
        if self.is_setup_required() {
            return Err(Error::NotConfigured(
                "maps API key is missing or still the placeholder value",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub trigger: TriggerPolicy,
}
