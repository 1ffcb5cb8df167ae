//! Offsite storage (ReCAP) closure feed.
//!
//! A small CSV published alongside the other reference data:
//!
//! ```text
//! start_date,end_date
//! 2000-01-03,2000-01-04
//! ```
//!
//! Each row closes the offsite facility from the start of `start_date` to
//! the end of `end_date` in the local offset.

use chrono::{FixedOffset, NaiveDate};
use csv::{ReaderBuilder, Trim};
use reqwest::Client;

use crate::error::AppError;
use crate::hours::RawClosureAlert;
use crate::services::ensure_success;

#[derive(Clone)]
pub struct RecapAlertsClient {
    url: String,
    http: Client,
}

impl RecapAlertsClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http: Client::new(),
        }
    }

    pub async fn fetch_closures(&self, offset: FixedOffset) -> Result<Vec<RawClosureAlert>, AppError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|err| AppError::Network(format!("Failed to retrieve ReCAP closures: {}", err)))?;
        let response = ensure_success(response, "ReCAP closures")?;

        let body = response
            .text()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to read ReCAP closures: {}", err)))?;

        Ok(parse_recap_feed(&body, offset))
    }
}

/// Turn the CSV body into raw closure alerts. The header row and anything
/// that is not two `YYYY-MM-DD` dates is skipped.
pub fn parse_recap_feed(body: &str, offset: FixedOffset) -> Vec<RawClosureAlert> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut alerts = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("Skipping unreadable ReCAP closure row: {}", err);
                continue;
            }
        };

        let (Some(start), Some(end), None) = (record.get(0), record.get(1), record.get(2)) else {
            tracing::warn!("Skipping ReCAP closure row: {:?}", record);
            continue;
        };

        if NaiveDate::parse_from_str(start, "%Y-%m-%d").is_err()
            || NaiveDate::parse_from_str(end, "%Y-%m-%d").is_err()
        {
            tracing::warn!("Skipping ReCAP closure row with bad dates: {:?}", record);
            continue;
        }

        alerts.push(RawClosureAlert::new(
            format!("{}T00:00:00{}", start, offset),
            format!("{}T23:59:58{}", end, offset),
        ));
    }
    alerts
}
