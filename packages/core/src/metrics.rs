//! Prometheus metrics registry for the locations service.
//!
//! [`AppMetrics`] owns every registered metric and the [`Registry`] they
//! belong to. Build it once at startup, wrap it in `Arc`, and hand it to the
//! resolver and the HTTP middleware. Rendered at `GET /metrics`.

use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{Counter, CounterVec, Opts, Registry};
use std::sync::Arc;

pub struct AppMetrics {
    /// Upstream fetches, labelled by source (core_objects, url_table, refinery, recap_alerts).
    pub upstream_fetches_total: CounterVec,
    /// Failed upstream fetches, labelled by source.
    pub upstream_errors_total: CounterVec,
    /// Lookups served from a TTL cache, labelled by cache name.
    pub cache_hits_total: CounterVec,
    /// Closure alerts dropped because their timestamps were unusable.
    pub closure_alerts_dropped_total: Counter,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    pub registry: Registry,
}

impl AppMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let upstream_fetches_total = CounterVec::new(
            Opts::new(
                "locations_service_upstream_fetches_total",
                "Upstream fetches by source",
            ),
            &["source"],
        )?;

        let upstream_errors_total = CounterVec::new(
            Opts::new(
                "locations_service_upstream_errors_total",
                "Failed upstream fetches by source",
            ),
            &["source"],
        )?;

        let cache_hits_total = CounterVec::new(
            Opts::new(
                "locations_service_cache_hits_total",
                "Lookups served from cache",
            ),
            &["cache"],
        )?;

        let closure_alerts_dropped_total = Counter::with_opts(Opts::new(
            "locations_service_closure_alerts_dropped_total",
            "Closure alerts dropped as malformed",
        ))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "locations_service_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        registry.register(Box::new(upstream_fetches_total.clone()))?;
        registry.register(Box::new(upstream_errors_total.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(closure_alerts_dropped_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            upstream_fetches_total,
            upstream_errors_total,
            cache_hits_total,
            closure_alerts_dropped_total,
            http_requests_total,
            registry,
        })
    }

    /// Render all metrics in Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }

    pub fn record_upstream(&self, source: &str, ok: bool) {
        self.upstream_fetches_total.with_label_values(&[source]).inc();
        if !ok {
            self.upstream_errors_total.with_label_values(&[source]).inc();
        }
    }

    pub fn record_cache_hit(&self, cache: &str) {
        self.cache_hits_total.with_label_values(&[cache]).inc();
    }
}

/// `GET /metrics`
pub async fn metrics_handler(State(metrics): State<Arc<AppMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Body::from(body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics error").into_response()
        }
    }
}

/// Count every request by method, matched route and status.
pub async fn track_requests(
    State(metrics): State<Arc<AppMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    metrics
        .http_requests_total
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_without_error() {
        let metrics = AppMetrics::new();
        assert!(metrics.is_ok(), "AppMetrics::new() failed: {:?}", metrics.err());
    }

    #[test]
    fn upstream_errors_count_as_fetches_too() {
        let metrics = AppMetrics::new().unwrap();
        metrics.record_upstream("refinery", true);
        metrics.record_upstream("refinery", false);

        let fetches = metrics.upstream_fetches_total.with_label_values(&["refinery"]).get();
        let errors = metrics.upstream_errors_total.with_label_values(&["refinery"]).get();
        assert!((fetches - 2.0).abs() < f64::EPSILON);
        assert!((errors - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn render_includes_touched_metrics() {
        let metrics = AppMetrics::new().unwrap();
        metrics.record_cache_hit("branch_data");
        metrics.closure_alerts_dropped_total.inc();

        let output = metrics.render().unwrap();
        assert!(output.contains("locations_service_cache_hits_total"));
        assert!(output.contains("locations_service_closure_alerts_dropped_total 1"));
    }
}
