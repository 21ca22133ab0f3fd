use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use wayfinder_core::directions::DirectionsService;
use wayfinder_core::input::LocationInput;
use wayfinder_core::places::{PlaceResolver, PlaceSuggestion};
use wayfinder_core::predict::PredictionService;
use wayfinder_core::session::{DisplayState, NavigationSession};
use wayfinder_core::{Error, GeoPoint, LocationSelection, TravelMode};

use crate::error::ApiError;

/// Shared application state: the session plus the per-field location
/// inputs and the free map-click marker.
pub struct AppState<D, P, R> {
    pub session: NavigationSession<D, P>,
    pub origin_input: tokio::sync::Mutex<LocationInput<R>>,
    pub destination_input: tokio::sync::Mutex<LocationInput<R>>,
    pub click_marker: std::sync::Mutex<Option<GeoPoint>>,
}

impl<D, P, R> AppState<D, P, R>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver + Clone,
{
    pub fn new(session: NavigationSession<D, P>, resolver: R) -> Self {
        Self {
            session,
            origin_input: tokio::sync::Mutex::new(LocationInput::new(resolver.clone())),
            destination_input: tokio::sync::Mutex::new(LocationInput::new(resolver)),
            click_marker: std::sync::Mutex::new(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Origin,
    Destination,
}

#[derive(Debug, Deserialize)]
struct CoordinateBody {
    lat: f64,
    lng: f64,
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    query: String,
}

#[derive(Debug, Deserialize)]
struct IndexBody {
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ModeBody {
    mode: TravelMode,
}

#[derive(Debug, Deserialize)]
struct EnabledBody {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct VisibleBody {
    visible: bool,
}

#[derive(Debug, Serialize)]
struct MapClickResponse {
    assigned: Option<Target>,
    marker: Option<GeoPoint>,
    view: DisplayState,
}

pub fn router<D, P, R>(state: Arc<AppState<D, P, R>>) -> Router
where
    D: DirectionsService + 'static,
    P: PredictionService + 'static,
    R: PlaceResolver + 'static,
{
    Router::new()
        .route("/api/health", get(health))
        .route("/api/view", get(view::<D, P, R>))
        .route("/api/mode", put(set_mode::<D, P, R>))
        .route("/api/route/compute", post(compute::<D, P, R>))
        .route("/api/route/select", post(select::<D, P, R>))
        .route("/api/route/clear", post(clear::<D, P, R>))
        .route("/api/route/augment", post(augment::<D, P, R>))
        .route("/api/route/augmentation", put(toggle_augmentation::<D, P, R>))
        .route("/api/errors/dismiss", post(dismiss_error::<D, P, R>))
        .route(
            "/api/location/{target}",
            put(set_location::<D, P, R>).delete(clear_location::<D, P, R>),
        )
        .route("/api/location/{target}/query", post(query_suggestions::<D, P, R>))
        .route("/api/location/{target}/choose", post(choose_suggestion::<D, P, R>))
        .route("/api/location/{target}/arm", post(arm_pick::<D, P, R>))
        .route("/api/location/{target}/cancel", post(cancel_pick::<D, P, R>))
        .route("/api/map/click", post(map_click::<D, P, R>))
        .route("/api/map/marker/{target}", post(assign_marker::<D, P, R>))
        .route("/api/map/traffic", put(set_traffic::<D, P, R>))
        .route("/api/features/{name}", put(set_feature::<D, P, R>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Degraded mode served when the maps API key is missing or still the
/// placeholder: every path answers with setup instructions.
pub fn setup_router() -> Router {
    Router::new().fallback(setup_required)
}

async fn setup_required() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": "Setup required: maps API key is not configured",
            "instructions": [
                "Create a project in your maps provider console and enable billing",
                "Enable the Maps, Places and Directions APIs",
                "Create an API key and restrict it to this deployment",
                "Set maps.api_key in the server configuration file and restart",
            ],
        })),
    )
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn view<D, P, R>(State(state): State<Arc<AppState<D, P, R>>>) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    Json(state.session.display_state())
}

async fn set_mode<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Json(body): Json<ModeBody>,
) -> Result<Json<DisplayState>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.set_travel_mode(body.mode).await?;
    Ok(Json(state.session.display_state()))
}

async fn compute<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
) -> Result<Json<DisplayState>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.compute_route().await?;
    Ok(Json(state.session.display_state()))
}

async fn select<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Json(body): Json<IndexBody>,
) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.select_alternate(body.index);
    Json(state.session.display_state())
}

async fn clear<D, P, R>(State(state): State<Arc<AppState<D, P, R>>>) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.clear_route();
    Json(state.session.display_state())
}

async fn augment<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
) -> Result<Json<DisplayState>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.request_augmentation().await?;
    Ok(Json(state.session.display_state()))
}

async fn toggle_augmentation<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Json(body): Json<EnabledBody>,
) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.toggle_augmentation(body.enabled);
    Json(state.session.display_state())
}

async fn dismiss_error<D, P, R>(State(state): State<Arc<AppState<D, P, R>>>) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.dismiss_error();
    Json(state.session.display_state())
}

async fn set_location<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(target): Path<Target>,
    Json(body): Json<CoordinateBody>,
) -> Result<Json<DisplayState>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    let point = GeoPoint::new(body.lat, body.lng)?;
    let selection = match body.address {
        Some(address) => LocationSelection::with_address(point, address),
        None => LocationSelection::from_point(point),
    };
    apply_selection(&state, target, Some(selection)).await?;
    Ok(Json(state.session.display_state()))
}

async fn clear_location<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(target): Path<Target>,
) -> Result<Json<DisplayState>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    apply_selection(&state, target, None).await?;
    Ok(Json(state.session.display_state()))
}

async fn query_suggestions<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(target): Path<Target>,
    Json(body): Json<QueryBody>,
) -> Json<Vec<PlaceSuggestion>>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    let input = match target {
        Target::Origin => &state.origin_input,
        Target::Destination => &state.destination_input,
    };
    let mut input = input.lock().await;
    input.set_query(body.query).await;
    Json(input.suggestions().to_vec())
}

async fn choose_suggestion<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(target): Path<Target>,
    Json(body): Json<IndexBody>,
) -> Result<Json<DisplayState>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    let selection = {
        let input = match target {
            Target::Origin => &state.origin_input,
            Target::Destination => &state.destination_input,
        };
        let mut input = input.lock().await;
        input.choose(body.index).await
    };
    let Some(selection) = selection else {
        return Err(ApiError(Error::InvalidData(
            "suggestion could not be resolved".to_string(),
        )));
    };
    apply_selection(&state, target, Some(selection)).await?;
    Ok(Json(state.session.display_state()))
}

async fn arm_pick<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(target): Path<Target>,
) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    match target {
        Target::Origin => state.origin_input.lock().await.arm_map_pick(),
        Target::Destination => state.destination_input.lock().await.arm_map_pick(),
    }
    Json(state.session.display_state())
}

async fn cancel_pick<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(target): Path<Target>,
) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    match target {
        Target::Origin => state.origin_input.lock().await.cancel_map_pick(),
        Target::Destination => state.destination_input.lock().await.cancel_map_pick(),
    }
    Json(state.session.display_state())
}

/// A click goes to whichever input is armed (origin wins if both are);
/// with nothing armed it parks a marker that can be promoted later.
async fn map_click<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Json(body): Json<CoordinateBody>,
) -> Result<Json<MapClickResponse>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    let point = GeoPoint::new(body.lat, body.lng)?;

    let picked_for = {
        let mut origin_input = state.origin_input.lock().await;
        if let Some(selection) = origin_input.map_click(point) {
            Some((Target::Origin, selection))
        } else {
            let mut destination_input = state.destination_input.lock().await;
            destination_input
                .map_click(point)
                .map(|selection| (Target::Destination, selection))
        }
    };

    let (assigned, marker) = match picked_for {
        Some((target, selection)) => {
            apply_selection(&state, target, Some(selection)).await?;
            (Some(target), None)
        }
        None => {
            *state.click_marker.lock().expect("marker lock poisoned") = Some(point);
            (None, Some(point))
        }
    };

    Ok(Json(MapClickResponse {
        assigned,
        marker,
        view: state.session.display_state(),
    }))
}

async fn assign_marker<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(target): Path<Target>,
) -> Result<Json<DisplayState>, ApiError>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    let marker = state
        .click_marker
        .lock()
        .expect("marker lock poisoned")
        .take();
    let Some(point) = marker else {
        return Err(ApiError(Error::InvalidData(
            "no pending map marker".to_string(),
        )));
    };
    apply_selection(&state, target, Some(LocationSelection::from_point(point))).await?;
    Ok(Json(state.session.display_state()))
}

async fn set_traffic<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Json(body): Json<VisibleBody>,
) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.set_traffic_layer(body.visible);
    Json(state.session.display_state())
}

async fn set_feature<D, P, R>(
    State(state): State<Arc<AppState<D, P, R>>>,
    Path(name): Path<String>,
    Json(body): Json<EnabledBody>,
) -> Json<DisplayState>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    state.session.set_feature(&name, body.enabled);
    Json(state.session.display_state())
}

async fn apply_selection<D, P, R>(
    state: &AppState<D, P, R>,
    target: Target,
    selection: Option<LocationSelection>,
) -> Result<(), Error>
where
    D: DirectionsService,
    P: PredictionService,
    R: PlaceResolver,
{
    match target {
        Target::Origin => state.session.set_origin(selection).await,
        Target::Destination => state.session.set_destination(selection).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::util::ServiceExt;
    use wayfinder_core::directions::{
        DirectionsRequest, DirectionsResponse, DirectionsStatus, RouteAlternate, RouteLeg,
        TextValue,
    };
    use wayfinder_core::predict::RoutePayload;
    use wayfinder_core::session::TriggerPolicy;
    use wayfinder_core::{OptimizationResult, PredictionResult};

    #[derive(Clone)]
    struct MockDirections;

    impl DirectionsService for MockDirections {
        async fn route(&self, _request: &DirectionsRequest) -> Result<DirectionsResponse, Error> {
            let leg = |duration_s: i64| RouteLeg {
                distance: TextValue {
                    text: "9.0 km".to_string(),
                    value: 9000,
                },
                duration: TextValue {
                    text: format!("{} mins", duration_s / 60),
                    value: duration_s,
                },
                steps: Vec::new(),
                start_address: String::new(),
                end_address: String::new(),
            };
            Ok(DirectionsResponse {
                status: DirectionsStatus::Ok,
                routes: vec![
                    RouteAlternate {
                        legs: vec![leg(1200)],
                        warnings: Vec::new(),
                        copyrights: "Map data 2026".to_string(),
                        summary: Some("I-80 E".to_string()),
                    },
                    RouteAlternate {
                        legs: vec![leg(1500)],
                        warnings: Vec::new(),
                        copyrights: "Map data 2026".to_string(),
                        summary: Some("I-580 E".to_string()),
                    },
                ],
            })
        }
    }

    #[derive(Clone)]
    struct MockPredictor;

    impl PredictionService for MockPredictor {
        async fn predict(&self, _payload: &RoutePayload) -> Result<PredictionResult, Error> {
            Ok(PredictionResult {
                confidence: 0.82,
                estimated_duration: 1200.0,
                estimated_distance: 9000.0,
                efficiency_score: 0.75,
                recommendation: "fastest".to_string(),
                optimization_suggestions: Vec::new(),
            })
        }

        async fn optimize(&self, _payload: &RoutePayload) -> Result<OptimizationResult, Error> {
            Err(Error::Prediction {
                status: 503,
                message: "optimizer offline".to_string(),
            })
        }
    }

    #[derive(Clone)]
    struct MockResolver;

    impl PlaceResolver for MockResolver {
        async fn suggest(&self, query: &str) -> Result<Vec<PlaceSuggestion>, Error> {
            Ok(vec![PlaceSuggestion {
                description: format!("{query}, San Francisco, CA"),
                place_id: "place-1".to_string(),
            }])
        }

        async fn geocode(&self, suggestion: &PlaceSuggestion) -> Result<LocationSelection, Error> {
            Ok(LocationSelection::with_address(
                GeoPoint::new(37.7749, -122.4194).unwrap(),
                suggestion.description.clone(),
            ))
        }
    }

    fn test_app() -> Router {
        let session = NavigationSession::new(
            MockDirections,
            MockPredictor,
            "US",
            TriggerPolicy::Manual,
        );
        router(Arc::new(AppState::new(session, MockResolver)))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = test_app()
            .oneshot(empty_request("GET", "/api/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["version"].is_string());
    }

    #[tokio::test]
    async fn full_route_flow_over_http() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/location/origin",
                json!({"lat": 37.7749, "lng": -122.4194}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/location/destination",
                json!({"lat": 37.8044, "lng": -122.2711, "address": "Oakland, CA"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/route/compute"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let view = body_json(response).await;
        assert_eq!(view["route_summary"]["duration_seconds"], 1200);
        assert_eq!(view["alternates"].as_array().unwrap().len(), 2);
        assert_eq!(view["selected_route"], 0);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/route/select", json!({"index": 1})))
            .await
            .unwrap();
        let view = body_json(response).await;
        assert_eq!(view["selected_route"], 1);
        assert_eq!(view["route_summary"]["duration_seconds"], 1500);

        // Augmentation succeeds even with the optimizer offline.
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/route/augment"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let view = body_json(response).await;
        assert_eq!(view["augmentation_on"], true);
        assert!(
            view["ai_route"]["ai_label"]
                .as_str()
                .unwrap()
                .contains("82% confidence")
        );
        assert!(view["ai_route"]["optimization"].is_null());

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/route/clear"))
            .await
            .unwrap();
        let view = body_json(response).await;
        assert!(view["route_summary"].is_null());
        assert!(view["ai_route"].is_null());
        assert_eq!(view["alternates"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn augment_without_route_is_unprocessable() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/location/origin",
                json!({"lat": 37.7749, "lng": -122.4194}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(empty_request("POST", "/api/route/augment"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn invalid_coordinates_are_rejected() {
        let response = test_app()
            .oneshot(json_request(
                "PUT",
                "/api/location/origin",
                json!({"lat": 91.0, "lng": 0.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("latitude"));
    }

    #[tokio::test]
    async fn suggestion_flow_sets_location() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/location/origin/query",
                json!({"query": "Market St"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let suggestions = body_json(response).await;
        assert_eq!(suggestions.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/location/origin/choose",
                json!({"index": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let view = body_json(response).await;
        assert!(
            view["origin"]["address"]
                .as_str()
                .unwrap()
                .contains("San Francisco")
        );
    }

    #[tokio::test]
    async fn map_click_requires_arming() {
        let app = test_app();

        // Unarmed click parks a marker.
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/map/click",
                json!({"lat": 37.7749, "lng": -122.4194}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body["assigned"].is_null());
        assert_eq!(body["marker"]["lat"], 37.7749);

        // Armed click lands on the destination.
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/location/destination/arm"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/map/click",
                json!({"lat": 37.8044, "lng": -122.2711}),
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["assigned"], "destination");
        assert_eq!(body["view"]["destination"]["point"]["lat"], 37.8044);

        // The parked marker can still be promoted to origin.
        let response = app
            .clone()
            .oneshot(empty_request("POST", "/api/map/marker/origin"))
            .await
            .unwrap();
        let view = body_json(response).await;
        assert_eq!(view["origin"]["point"]["lat"], 37.7749);
    }

    #[tokio::test]
    async fn setup_mode_replaces_every_route() {
        let app = setup_router();
        for uri in ["/api/view", "/api/health", "/anything"] {
            let response = app
                .clone()
                .oneshot(empty_request("GET", uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
            let body = body_json(response).await;
            assert!(body["error"].as_str().unwrap().contains("Setup required"));
        }
    }
}

