//! HTTP clients for the upstream data sources.

pub mod core_objects;
pub mod recap_alerts;
pub mod refinery;
pub mod url_table;

use reqwest::Response;

use crate::error::AppError;

/// Turn a non-2xx upstream response into a network error.
pub(crate) fn ensure_success(response: Response, upstream: &str) -> Result<Response, AppError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(AppError::Network(format!(
            "{} returned HTTP {}",
            upstream,
            response.status()
        )))
    }
}
