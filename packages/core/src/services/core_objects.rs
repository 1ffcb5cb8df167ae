use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::error::AppError;
use crate::services::ensure_success;

const SIERRA_LOCATIONS_FILE: &str = "by_sierra_location.json";

/// Client for the static reference-data bucket (location labels by code).
#[derive(Clone)]
pub struct CoreObjectsClient {
    base_url: String,
    http: Client,
}

/// One entry of `by_sierra_location.json`. Only the label is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SierraLocation {
    #[serde(default)]
    pub label: Option<String>,
}

pub type SierraLocations = HashMap<String, SierraLocation>;

impl CoreObjectsClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    pub async fn fetch_sierra_locations(&self) -> Result<SierraLocations, AppError> {
        let url = format!("{}{}", self.base_url, SIERRA_LOCATIONS_FILE);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Network(format!("Failed to retrieve {}: {}", url, err)))?;
        let response = ensure_success(response, "reference data")?;

        response
            .json::<SierraLocations>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to parse {}: {}", SIERRA_LOCATIONS_FILE, err)))
    }
}
