use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

/// `GET /health`. Liveness only; upstreams are not contacted.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, [(header::CACHE_CONTROL, "no-store")], "ok")
}
