use serde::de::DeserializeOwned;

use super::{ApiErrorBody, PredictionService, RoutePayload};
use crate::Error;
use crate::model::{OptimizationResult, PredictionResult};

pub const PREDICT_PATH: &str = "/api/v2/predict-route";
pub const OPTIMIZE_PATH: &str = "/api/v2/advanced-optimization";

/// Client for the prediction service. Paths are relative to the configured
/// base URL; no host is ever hard-coded here.
#[derive(Debug, Clone)]
pub struct HttpPredictionService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPredictionService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &RoutePayload,
    ) -> Result<T, Error> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(&url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.json::<ApiErrorBody>().await.ok().and_then(|b| b.detail);
            let message = match detail {
                Some(detail) => detail.render(),
                None => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(Error::Prediction {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl PredictionService for HttpPredictionService {
    async fn predict(&self, payload: &RoutePayload) -> Result<PredictionResult, Error> {
        self.post_json(PREDICT_PATH, payload).await
    }

    async fn optimize(&self, payload: &RoutePayload) -> Result<OptimizationResult, Error> {
        self.post_json(OPTIMIZE_PATH, payload).await
    }
}
