use chrono::{NaiveDate, NaiveDateTime};

use shared_models::TimeOfDay;
use shared_utils::Clock;

/// A local calendar day and minute, the frame appointments are stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalMoment {
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

impl LocalMoment {
    pub fn new(date: NaiveDate, time: TimeOfDay) -> Self {
        Self { date, time }
    }

    /// Seconds are truncated, so an appointment at the current minute is
    /// still upcoming.
    pub fn from_datetime(now: NaiveDateTime) -> Self {
        Self {
            date: now.date(),
            time: TimeOfDay::from_time(&now.time()),
        }
    }

    pub fn now(clock: &dyn Clock) -> Self {
        Self::from_datetime(clock.now())
    }
}

/// `date > today`, or today at or after the current minute.
pub fn is_upcoming(date: NaiveDate, time: TimeOfDay, now: &LocalMoment) -> bool {
    date > now.date || (date == now.date && time >= now.time)
}
