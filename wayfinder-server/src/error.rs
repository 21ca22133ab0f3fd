use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use wayfinder_core::Error;

/// Maps core errors onto the HTTP surface. Validation and precondition
/// failures are the client's problem; upstream-service failures are
/// gateway errors; a missing API key means the whole deployment is in
/// setup mode.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::MissingOrigin
            | Error::MissingDestination
            | Error::NoBaseRoute
            | Error::InvalidCoordinate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Directions(_)
            | Error::Prediction { .. }
            | Error::Network(_)
            | Error::InvalidData(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
