//! Clock-time parsing and date/time composition.
//!
//! Upstream hours arrive either as 24-hour strings ("10:00", "7:00") or as
//! 12-hour strings ("10 AM", "6:17 PM"). Both forms resolve to a
//! [`NaiveTime`] which is then pinned to a calendar date at the service's
//! fixed UTC offset.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Weekday};

use crate::hours::error::HoursError;

/// Parse a wall-clock time in either 24-hour or 12-hour notation.
///
/// 12-hour rules: `12 AM` is midnight, `12 PM` is noon, any other PM hour
/// gains 12. Minutes default to zero when absent.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, HoursError> {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();

    let (hour, minute) = if let Some(body) = upper.strip_suffix("AM") {
        let (hour, minute) = split_hour_minute(body.trim_end(), false).ok_or_else(|| HoursError::invalid_time(raw))?;
        if !(1..=12).contains(&hour) {
            return Err(HoursError::invalid_time(raw));
        }
        (if hour == 12 { 0 } else { hour }, minute)
    } else if let Some(body) = upper.strip_suffix("PM") {
        let (hour, minute) = split_hour_minute(body.trim_end(), false).ok_or_else(|| HoursError::invalid_time(raw))?;
        if !(1..=12).contains(&hour) {
            return Err(HoursError::invalid_time(raw));
        }
        (if hour == 12 { 12 } else { hour + 12 }, minute)
    } else {
        split_hour_minute(trimmed, true).ok_or_else(|| HoursError::invalid_time(raw))?
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| HoursError::invalid_time(raw))
}

/// Split "H", "H:MM" (12-hour) or "H:MM" (24-hour, minutes mandatory).
fn split_hour_minute(body: &str, minutes_required: bool) -> Option<(u32, u32)> {
    let (hour_part, minute_part) = match body.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None if minutes_required => return None,
        None => (body, None),
    };

    if hour_part.is_empty() || hour_part.len() > 2 || !hour_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour = hour_part.parse::<u32>().ok()?;

    let minute = match minute_part {
        Some(m) if m.len() == 2 && m.bytes().all(|b| b.is_ascii_digit()) => m.parse::<u32>().ok()?,
        Some(_) => return None,
        None => 0,
    };

    Some((hour, minute))
}

/// Pin `time` to `date` at `offset`.
pub fn at_time(
    date: NaiveDate,
    time: NaiveTime,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, HoursError> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| HoursError::invalid_anchor(format!("{} {} is not representable at {}", date, time, offset)))
}

/// Parse `raw` as a clock time and combine it with `date` at `offset`.
pub fn combine_date_and_time(
    date: NaiveDate,
    raw: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, HoursError> {
    let time = parse_clock_time(raw)?;
    at_time(date, time, offset)
}

/// Parse an hours range such as `"10 AM–6 PM"`. `"Closed"` yields `None`.
pub fn parse_hours_range(raw: &str) -> Result<Option<(NaiveTime, NaiveTime)>, HoursError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("closed") {
        return Ok(None);
    }

    let (open, close) = trimmed
        .split_once('–')
        .or_else(|| trimmed.split_once('-'))
        .ok_or_else(|| HoursError::invalid_time(raw))?;

    Ok(Some((parse_clock_time(open)?, parse_clock_time(close)?)))
}

/// Parse weekday labels such as `"Sun."`, `"Mon"` or `"Tuesday"`.
pub fn parse_weekday_label(raw: &str) -> Result<Weekday, HoursError> {
    raw.trim()
        .trim_end_matches('.')
        .parse::<Weekday>()
        .map_err(|_| HoursError::malformed_schedule(format!("unknown weekday label {:?}", raw)))
}

/// Full English weekday name, as emitted in responses.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn parses_24_hour_times() {
        assert_eq!(parse_clock_time("10:00").unwrap(), hm(10, 0));
        assert_eq!(parse_clock_time("7:00").unwrap(), hm(7, 0));
        assert_eq!(parse_clock_time("23:59").unwrap(), hm(23, 59));
    }

    #[test]
    fn parses_12_hour_times() {
        assert_eq!(parse_clock_time("10 AM").unwrap(), parse_clock_time("10:00").unwrap());
        assert_eq!(parse_clock_time("6 PM").unwrap(), hm(18, 0));
        assert_eq!(parse_clock_time("12 AM").unwrap(), hm(0, 0));
        assert_eq!(parse_clock_time("12 PM").unwrap(), hm(12, 0));
        assert_eq!(parse_clock_time("10:23 am").unwrap(), hm(10, 23));
        assert_eq!(parse_clock_time("6:17PM").unwrap(), hm(18, 17));
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "noon", "25:00", "10:5", "13 PM", "0 AM", "10", "10:00:00", "-1:00"] {
            assert_eq!(
                parse_clock_time(raw),
                Err(HoursError::invalid_time(raw)),
                "expected {:?} to be rejected",
                raw
            );
        }
    }

    #[test]
    fn combine_keeps_date_and_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let ts = combine_date_and_time(date, "10:00", offset).unwrap();
        assert_eq!(ts.to_rfc3339(), "2000-01-01T10:00:00-05:00");

        let err = combine_date_and_time(date, "ten", offset).unwrap_err();
        assert!(matches!(err, HoursError::InvalidTimeFormat { .. }));
    }

    #[test]
    fn hours_range_handles_closed_and_dashes() {
        assert_eq!(parse_hours_range("Closed").unwrap(), None);
        assert_eq!(
            parse_hours_range("10 AM–6 PM").unwrap(),
            Some((hm(10, 0), hm(18, 0)))
        );
        assert_eq!(
            parse_hours_range("10:23 AM–6:17 PM").unwrap(),
            Some((hm(10, 23), hm(18, 17)))
        );
        assert_eq!(
            parse_hours_range("12 AM-12 PM").unwrap(),
            Some((hm(0, 0), hm(12, 0)))
        );
        assert!(parse_hours_range("all day").is_err());
    }

    #[test]
    fn weekday_labels() {
        assert_eq!(parse_weekday_label("Sun.").unwrap(), Weekday::Sun);
        assert_eq!(parse_weekday_label("Tuesday").unwrap(), Weekday::Tue);
        assert_eq!(parse_weekday_label("THU").unwrap(), Weekday::Thu);
        assert!(parse_weekday_label("Funday").is_err());
        assert_eq!(weekday_name(Weekday::Sat), "Saturday");
    }
}
