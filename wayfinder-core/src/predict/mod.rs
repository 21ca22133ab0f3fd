//! Prediction and optimization endpoints.
//!
//! Both calls share one normalized payload; optimization results are
//! strictly additive on top of a successful prediction.

mod client;
mod wire;

use std::future::Future;

pub use client::{HttpPredictionService, OPTIMIZE_PATH, PREDICT_PATH};
pub use wire::{ApiErrorBody, ErrorDetail, FieldError, LocSegment, RoutePayload};

use crate::Error;
use crate::model::{OptimizationResult, PredictionResult};

/// The two augmentation calls. `optimize` is only ever invoked after a
/// successful `predict`, and its failure is not propagated to the user.
pub trait PredictionService: Send + Sync {
    fn predict(
        &self,
        payload: &RoutePayload,
    ) -> impl Future<Output = Result<PredictionResult, Error>> + Send;

    fn optimize(
        &self,
        payload: &RoutePayload,
    ) -> impl Future<Output = Result<OptimizationResult, Error>> + Send;
}
