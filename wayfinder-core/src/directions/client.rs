use super::{DirectionsRequest, DirectionsResponse, DirectionsService};
use crate::Error;

/// Directions client backed by the external routing web service.
///
/// The handle is built once at application start and reused for every
/// request; `route` calls are stateless.
#[derive(Debug, Clone)]
pub struct HttpDirectionsService {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpDirectionsService {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

impl DirectionsService for HttpDirectionsService {
    async fn route(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, Error> {
        log::debug!(
            "requesting directions {:?} -> {:?}",
            request.origin,
            request.destination
        );
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!(
                "directions service returned HTTP {status}"
            )));
        }
        Ok(response.json::<DirectionsResponse>().await?)
    }
}
