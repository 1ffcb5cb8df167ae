//! Facilities ("Refinery") API client.
//!
//! One document per research branch, carrying the street address, the
//! regular (and, around holidays, upcoming) weekly hours and any current
//! closure alerts.

use chrono::{NaiveTime, Weekday};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::hours::{parse_clock_time, parse_hours_range, parse_weekday_label, HoursError, RawClosureAlert};
use crate::services::ensure_success;

#[derive(Clone)]
pub struct RefineryClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
pub struct RefineryResponse {
    pub location: RefineryLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefineryLocation {
    #[serde(default, deserialize_with = "lenient_text")]
    pub street_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub locality: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub hours: Option<RefineryHours>,
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<RefineryEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefineryHours {
    #[serde(default)]
    pub regular: Vec<RawDayHours>,
    /// Holiday-adjusted week; preferred over `regular` when present.
    #[serde(default)]
    pub upcoming: Vec<RawDayHours>,
}

impl RefineryHours {
    pub fn effective(&self) -> &[RawDayHours] {
        if self.upcoming.is_empty() {
            &self.regular
        } else {
            &self.upcoming
        }
    }
}

/// Alerts stay untyped here so that one unreadable entry is dropped later
/// instead of failing the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefineryEmbedded {
    #[serde(default)]
    pub alerts: Vec<Value>,
}

/// One weekday as delivered upstream, either as
/// `{"day": "Sun.", "open": "13:00", "close": "17:00"}` or as
/// `{"day": "Sunday", "hours": "1 PM–5 PM"}`. Non-string values are kept
/// in their JSON form and fail to parse as times later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDayHours {
    #[serde(default, deserialize_with = "lenient_label")]
    pub day: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub open: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub close: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub hours: Option<String>,
}

impl RawDayHours {
    pub fn weekday(&self) -> Result<Weekday, HoursError> {
        parse_weekday_label(&self.day)
    }

    /// Opening and closing time, `None` where unset.
    pub fn times(&self) -> Result<(Option<NaiveTime>, Option<NaiveTime>), HoursError> {
        if let Some(hours) = self.hours.as_deref() {
            return Ok(match parse_hours_range(hours)? {
                Some((open, close)) => (Some(open), Some(close)),
                None => (None, None),
            });
        }

        let open = non_blank(self.open.as_deref()).map(parse_clock_time).transpose()?;
        let close = non_blank(self.close.as_deref()).map(parse_clock_time).transpose()?;
        Ok((open, close))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(text_of))
}

fn lenient_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

/// Read `{"applies": {"start": ..., "end": ...}}`. Anything else becomes an
/// unreadable alert.
fn raw_alert(alert: &Value) -> RawClosureAlert {
    let Some(applies) = alert.get("applies").and_then(Value::as_object) else {
        return RawClosureAlert::unreadable(format!("alert without applies window: {}", alert));
    };

    let bound = |key: &str| match applies.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(format!("non-string alert {}: {}", key, other)),
    };

    match (bound("start"), bound("end")) {
        (Ok(start), Ok(end)) => RawClosureAlert {
            start,
            end,
            unreadable: None,
        },
        (Err(reason), _) | (_, Err(reason)) => RawClosureAlert::unreadable(reason),
    }
}

/// Postal address as returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Address {
    pub line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl RefineryLocation {
    pub fn address(&self) -> Address {
        Address {
            line1: self.street_address.clone(),
            city: self.locality.clone(),
            state: self.region.clone(),
            postal_code: self.postal_code.clone(),
        }
    }

    /// Upcoming hours when published, regular hours otherwise.
    pub fn weekly_hours(&self) -> Vec<RawDayHours> {
        self.hours
            .as_ref()
            .map(|hours| hours.effective().to_vec())
            .unwrap_or_default()
    }

    pub fn closure_alerts(&self) -> Vec<RawClosureAlert> {
        self.embedded
            .iter()
            .flat_map(|embedded| embedded.alerts.iter())
            .map(raw_alert)
            .collect()
    }
}

impl RefineryClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: Client::new(),
        }
    }

    /// Fetch one branch document, e.g. `schwarzman`.
    pub async fn fetch_location(&self, slug: &str) -> Result<RefineryLocation, AppError> {
        let url = format!("{}{}", self.base_url, slug);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| {
                AppError::Network(format!(
                    "Failed to retrieve Refinery API location data for {}: {}",
                    slug, err
                ))
            })?;
        let response = ensure_success(response, "Refinery API")?;

        let body = response
            .json::<RefineryResponse>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to parse Refinery API response: {}", err)))?;

        Ok(body.location)
    }
}
