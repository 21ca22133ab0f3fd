//! JSON surface over a single navigation session.
//!
//! The process boots in one of two modes: the full router when a maps API
//! key is configured, or a degraded setup-required router when the key is
//! missing or still the placeholder value.

mod config;
mod error;
mod routes;

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clap::Parser;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tracing_subscriber::EnvFilter;

use wayfinder_core::directions::HttpDirectionsService;
use wayfinder_core::places::HttpPlaceResolver;
use wayfinder_core::predict::HttpPredictionService;
use wayfinder_core::session::NavigationSession;

use crate::config::AppConfig;
use crate::routes::AppState;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_IN_FLIGHT: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "wayfinder-server", about = "Navigation session server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "wayfinder.toml")]
    config: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Noise control lives here, at the process boundary, via the standard
    // filter variable; nothing global is patched.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let app = if config.maps.is_setup_required() {
        tracing::error!(
            "maps API key is missing or still the placeholder; \
             serving setup instructions only"
        );
        routes::setup_router()
    } else {
        let directions =
            HttpDirectionsService::new(&config.maps.directions_url, &config.maps.api_key);
        let predictor = HttpPredictionService::new(&config.prediction.base_url);
        let resolver = HttpPlaceResolver::new(&config.places.base_url, &config.maps.api_key);
        let session = NavigationSession::new(
            directions,
            predictor,
            &config.maps.region,
            config.session.trigger,
        );
        routes::router(Arc::new(AppState::new(session, resolver)))
    };
    let app = apply_middleware(app);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("listening on {bind}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn apply_middleware(app: Router) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic)).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT)),
    )
}

/// Last-resort boundary: a panicked handler leaves state in an unknown
/// shape, so the client is told to reload rather than shown partial data.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!("handler panicked: {detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(serde_json::json!({
            "error": "Something went wrong. Reload the application and try again.",
        })),
    )
        .into_response()
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled middleware error: {err}"),
        )
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => tracing::error!("cannot install shutdown handler: {err}"),
    }
}
