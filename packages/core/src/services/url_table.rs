//! Code-to-URL table.
//!
//! The table is a JSON object such as `{"ma*": "https://www.nypl.org/...", ...}`.
//! A key's trailing `*` is a wildcard; the rest must prefix the location
//! code. Rules are evaluated in document order and the last match wins.

use reqwest::Client;
use serde_json::Value;

use crate::error::AppError;
use crate::services::ensure_success;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRule {
    pub pattern: String,
    pub url: String,
}

impl UrlRule {
    pub fn new(pattern: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            url: url.into(),
        }
    }

    pub fn matches(&self, code: &str) -> bool {
        let prefix = self.pattern.strip_suffix('*').unwrap_or(&self.pattern);
        code.starts_with(prefix)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlTable {
    rules: Vec<UrlRule>,
}

impl UrlTable {
    pub fn new(rules: Vec<UrlRule>) -> Self {
        Self { rules }
    }

    /// Build from the bucket's JSON object, keeping key order. Entries whose
    /// value is not a string are skipped.
    pub fn from_json(value: Value) -> Result<Self, AppError> {
        let Value::Object(map) = value else {
            return Err(AppError::Parse("URL table must be a JSON object".to_string()));
        };

        let rules = map
            .into_iter()
            .filter_map(|(pattern, url)| match url {
                Value::String(url) => Some(UrlRule::new(pattern, url)),
                other => {
                    tracing::warn!("Skipping URL table entry {}: {}", pattern, other);
                    None
                }
            })
            .collect();

        Ok(Self { rules })
    }

    /// The last rule matching `code`, if any.
    pub fn resolve(&self, code: &str) -> Option<&UrlRule> {
        self.rules.iter().rev().find(|rule| rule.matches(code))
    }
}

/// Loads the URL table from its object-store URL.
#[derive(Clone)]
pub struct UrlTableClient {
    url: String,
    http: Client,
}

impl UrlTableClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: Client::new(),
        }
    }

    pub async fn fetch_url_table(&self) -> Result<UrlTable, AppError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|err| AppError::Network(format!("Failed to retrieve URL table: {}", err)))?;
        let response = ensure_success(response, "URL table")?;

        let value = response
            .json::<Value>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to parse URL table: {}", err)))?;

        UrlTable::from_json(value)
    }
}
