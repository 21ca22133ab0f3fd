use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Setup required: {0}")]
    NotConfigured(&'static str),
    #[error("Origin is not set")]
    MissingOrigin,
    #[error("Destination is not set")]
    MissingDestination,
    #[error("No route has been computed yet")]
    NoBaseRoute,
    #[error("Invalid {field} coordinate: {reason}")]
    InvalidCoordinate { field: &'static str, reason: String },
    #[error("Route calculation failed: {0}")]
    Directions(String),
    #[error("Prediction request failed (HTTP {status}): {message}")]
    Prediction { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
