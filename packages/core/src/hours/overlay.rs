//! Closure alert overlay.
//!
//! Alerts narrow or remove a day's opening window. They are applied in
//! input order, each against the window as left by the previous alert, so
//! with overlapping alerts the last one to touch a boundary wins.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::hours::error::HoursError;
use crate::hours::schedule::ScheduleDay;

/// Alert bounds as delivered by a feed: ISO-8601 strings with an offset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClosureAlert {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Set when the feed entry could not be read as an alert at all.
    #[serde(skip)]
    pub unreadable: Option<String>,
}

impl RawClosureAlert {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            unreadable: None,
        }
    }

    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            unreadable: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// A validated closure interval, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureAlert {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl ClosureAlert {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self, HoursError> {
        if start >= end {
            return Err(HoursError::invalid_alert(format!(
                "start {} is not before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Validate a raw alert. An alert with neither bound is not an error,
    /// it simply has nothing to apply and yields `Ok(None)`.
    pub fn from_raw(raw: &RawClosureAlert) -> Result<Option<Self>, HoursError> {
        if let Some(reason) = &raw.unreadable {
            return Err(HoursError::invalid_alert(reason.clone()));
        }

        match (raw.start.as_deref(), raw.end.as_deref()) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_timestamp(start)?;
                let end = parse_timestamp(end)?;
                Self::new(start, end).map(Some)
            }
            _ => Err(HoursError::invalid_alert("alert has only one bound")),
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, HoursError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|err| HoursError::invalid_alert(format!("{:?}: {}", raw, err)))
}

/// Validate every raw alert, keeping the good ones in order and returning
/// the rejects alongside.
pub fn collect_alerts<'a, I>(raw_alerts: I) -> (Vec<ClosureAlert>, Vec<HoursError>)
where
    I: IntoIterator<Item = &'a RawClosureAlert>,
{
    let mut alerts = Vec::new();
    let mut rejected = Vec::new();

    for raw in raw_alerts {
        match ClosureAlert::from_raw(raw) {
            Ok(Some(alert)) => alerts.push(alert),
            Ok(None) => {}
            Err(err) => rejected.push(err),
        }
    }

    (alerts, rejected)
}

/// Apply `alerts` to a copy of `schedule`.
///
/// Per day and alert, against the current window:
/// - alert covers the whole window: the day is closed
/// - alert starts inside the window: the day closes at the alert start
/// - alert ends inside the window: the day opens at the alert end
pub fn apply_closure_alerts(schedule: &[ScheduleDay], alerts: &[ClosureAlert]) -> Vec<ScheduleDay> {
    let mut adjusted = schedule.to_vec();

    for alert in alerts {
        for day in adjusted.iter_mut() {
            let (Some(open), Some(close)) = (day.start_time, day.end_time) else {
                continue;
            };

            if alert.start <= open && alert.end >= close {
                day.close();
            } else if open < alert.start && alert.start < close {
                day.end_time = Some(alert.start.with_timezone(close.offset()));
            } else if open < alert.end && alert.end < close {
                day.start_time = Some(alert.end.with_timezone(open.offset()));
            }
        }
    }

    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_skips_empty_alerts() {
        assert_eq!(ClosureAlert::from_raw(&RawClosureAlert::default()), Ok(None));
    }

    #[test]
    fn from_raw_rejects_bad_input() {
        let half = RawClosureAlert {
            start: Some("2000-01-05T10:00:00-05:00".into()),
            ..Default::default()
        };
        let garbage = RawClosureAlert::new("yesterday", "2000-01-05T10:00:00-05:00");
        let backwards = RawClosureAlert::new("2000-01-06T10:00:00-05:00", "2000-01-05T10:00:00-05:00");
        let unreadable = RawClosureAlert::unreadable("alert without applies window");

        for raw in [half, garbage, backwards, unreadable] {
            assert!(matches!(
                ClosureAlert::from_raw(&raw),
                Err(HoursError::InvalidAlertFormat { .. })
            ));
        }
    }

    #[test]
    fn from_raw_compares_across_offsets() {
        // 10:00-04:00 is 09:00-05:00, so this is a one-hour alert.
        let raw = RawClosureAlert::new("2000-01-05T10:00:00-04:00", "2000-01-05T10:00:00-05:00");
        let alert = ClosureAlert::from_raw(&raw).unwrap().unwrap();
        assert_eq!((alert.end - alert.start).num_hours(), 1);
    }

    #[test]
    fn collect_alerts_keeps_order_and_reports_rejects() {
        let raws = vec![
            RawClosureAlert::new("2000-01-05T10:00:00-05:00", "2000-01-05T11:00:00-05:00"),
            RawClosureAlert::new("not-a-date", "2000-01-05T11:00:00-05:00"),
            RawClosureAlert::default(),
            RawClosureAlert::new("2000-01-04T10:00:00-05:00", "2000-01-04T11:00:00-05:00"),
        ];

        let (alerts, rejected) = collect_alerts(&raws);
        assert_eq!(alerts.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert!(alerts[0].start > alerts[1].start);
    }
}
