use std::fmt;
use std::path::Path;

use serde::Deserialize;
use wayfinder_core::config::{MapsConfig, PlacesConfig, PredictionConfig, SessionConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub maps: MapsConfig,
    pub places: PlacesConfig,
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "cannot read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "cannot parse config file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&raw).map_err(ConfigError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_core::session::TriggerPolicy;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [maps]
            api_key = "AIza-real-key"
            directions_url = "https://maps.example.com/directions"

            [places]
            base_url = "https://maps.example.com/places"

            [prediction]
            base_url = "https://predict.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.maps.region, "US");
        assert_eq!(config.session.trigger, TriggerPolicy::Manual);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert!(!config.maps.is_setup_required());
    }

    #[test]
    fn trigger_and_bind_are_overridable() {
        let config: AppConfig = toml::from_str(
            r#"
            [maps]
            api_key = "k"
            directions_url = "https://maps.example.com/directions"
            region = "DE"

            [places]
            base_url = "https://maps.example.com/places"

            [prediction]
            base_url = "https://predict.example.com"

            [session]
            trigger = "auto"

            [server]
            bind = "127.0.0.1:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.maps.region, "DE");
        assert_eq!(config.session.trigger, TriggerPolicy::Auto);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }
}
