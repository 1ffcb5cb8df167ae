pub mod health;
pub mod locations;

use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::locations::LocationResolver;
use crate::metrics::{metrics_handler, track_requests, AppMetrics};

/// Assemble every route of the service.
pub fn build_router(resolver: Arc<LocationResolver>, metrics: Arc<AppMetrics>) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics.clone());

    Router::new()
        .route("/health", get(health::health))
        .merge(metrics_router)
        .merge(locations::create_locations_router(resolver))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(metrics, track_requests))
        .layer(TraceLayer::new_for_http())
}

async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("{} not found", uri.path()) })),
    )
        .into_response()
}
