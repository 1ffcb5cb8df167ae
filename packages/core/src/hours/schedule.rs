//! Weekly schedule construction.
//!
//! Turns a branch's regular weekly hours into seven dated [`ScheduleDay`]s
//! anchored on "today", today first.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, Weekday};
use serde::{Serialize, Serializer};

use crate::hours::clock::{at_time, weekday_name};
use crate::hours::error::HoursError;

/// Days in a schedule.
pub const DAYS_IN_WEEK: usize = 7;

/// One weekday's regular opening window. `None` means closed all day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayHours {
    pub day: Weekday,
    window: Option<(NaiveTime, NaiveTime)>,
}

impl WeekdayHours {
    pub fn open(day: Weekday, open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            day,
            window: Some((open, close)),
        }
    }

    pub fn closed(day: Weekday) -> Self {
        Self { day, window: None }
    }

    /// Build from optional open/close times; exactly one of them being set
    /// is rejected.
    pub fn from_times(
        day: Weekday,
        open: Option<NaiveTime>,
        close: Option<NaiveTime>,
    ) -> Result<Self, HoursError> {
        match (open, close) {
            (Some(open), Some(close)) => Ok(Self::open(day, open, close)),
            (None, None) => Ok(Self::closed(day)),
            _ => Err(HoursError::malformed_schedule(format!(
                "{} has only one of open/close set",
                weekday_name(day)
            ))),
        }
    }

    pub fn open_time(&self) -> Option<NaiveTime> {
        self.window.map(|(open, _)| open)
    }

    pub fn close_time(&self) -> Option<NaiveTime> {
        self.window.map(|(_, close)| close)
    }
}

/// One dated day of a computed schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    #[serde(serialize_with = "serialize_weekday")]
    pub day: Weekday,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(rename = "today", skip_serializing_if = "is_false")]
    pub is_today: bool,
    #[serde(rename = "nextBusinessDay", skip_serializing_if = "is_false")]
    pub is_next_business_day: bool,
    #[serde(skip)]
    pub date: NaiveDate,
}

impl ScheduleDay {
    pub fn is_open(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    pub fn close(&mut self) {
        self.start_time = None;
        self.end_time = None;
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn serialize_weekday<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

/// Build the seven-day schedule starting at `anchor`'s calendar date.
///
/// Entries may arrive in any order (the facilities API sends Sunday first)
/// but must name each weekday exactly once.
pub fn build_weekly_schedule(
    regular_hours: &[WeekdayHours],
    anchor: DateTime<FixedOffset>,
) -> Result<Vec<ScheduleDay>, HoursError> {
    if regular_hours.len() != DAYS_IN_WEEK {
        return Err(HoursError::malformed_schedule(format!(
            "expected {} weekday entries, got {}",
            DAYS_IN_WEEK,
            regular_hours.len()
        )));
    }

    let mut monday_first: [Option<WeekdayHours>; DAYS_IN_WEEK] = [None; DAYS_IN_WEEK];
    for entry in regular_hours {
        let slot = &mut monday_first[entry.day.num_days_from_monday() as usize];
        if slot.is_some() {
            return Err(HoursError::malformed_schedule(format!(
                "{} appears more than once",
                weekday_name(entry.day)
            )));
        }
        *slot = Some(*entry);
    }

    let anchor_index = anchor.weekday().num_days_from_monday() as usize;
    if anchor_index >= DAYS_IN_WEEK {
        return Err(HoursError::invalid_anchor(format!(
            "weekday index {} out of range",
            anchor_index
        )));
    }
    let anchor_date = anchor.date_naive();
    let offset = *anchor.offset();

    let mut by_offset: Vec<Option<ScheduleDay>> = vec![None; DAYS_IN_WEEK];
    for (index, entry) in monday_first.iter().enumerate() {
        // Length and uniqueness were checked above, so every slot is filled.
        let Some(entry) = entry else {
            return Err(HoursError::malformed_schedule("missing weekday entry"));
        };

        let days_out = (DAYS_IN_WEEK + index - anchor_index) % DAYS_IN_WEEK;
        let date = anchor_date
            .checked_add_days(Days::new(days_out as u64))
            .ok_or_else(|| HoursError::invalid_anchor(format!("{} + {} days overflows", anchor_date, days_out)))?;

        let (start_time, end_time) = match (entry.open_time(), entry.close_time()) {
            (Some(open), Some(close)) => (
                Some(at_time(date, open, offset)?),
                Some(at_time(date, close, offset)?),
            ),
            _ => (None, None),
        };

        by_offset[days_out] = Some(ScheduleDay {
            day: date.weekday(),
            start_time,
            end_time,
            is_today: days_out == 0,
            is_next_business_day: false,
            date,
        });
    }

    let mut schedule = by_offset
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| HoursError::malformed_schedule("schedule has gaps"))?;

    mark_next_business_day(&mut schedule);
    Ok(schedule)
}

/// Re-tag the next business day: the first day after today, wrapping, whose
/// opening time is set. Any previous tag is cleared.
pub fn mark_next_business_day(schedule: &mut [ScheduleDay]) {
    for day in schedule.iter_mut() {
        day.is_next_business_day = false;
    }

    let len = schedule.len();
    let today = schedule.iter().position(|day| day.is_today).unwrap_or(0);

    if let Some(next) = (1..len)
        .map(|step| (today + step) % len)
        .find(|&idx| schedule[idx].start_time.is_some())
    {
        schedule[next].is_next_business_day = true;
    }
}
