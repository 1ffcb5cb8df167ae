//! Opening hours engine
//!
//! Builds a branch's forward-looking seven-day schedule from its regular
//! weekly hours and narrows it with closure alerts. Everything here is pure:
//! callers supply "today", the hours table and the alerts.

pub mod clock;
pub mod error;
pub mod overlay;
pub mod schedule;


pub use clock::{combine_date_and_time, parse_clock_time, parse_hours_range, parse_weekday_label};
pub use error::HoursError;
pub use overlay::{apply_closure_alerts, collect_alerts, ClosureAlert, RawClosureAlert};
pub use schedule::{build_weekly_schedule, mark_next_business_day, ScheduleDay, WeekdayHours};
