use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of "now" for anything that classifies records relative to the
/// present. Local wall-clock time, matching how appointment dates and times
/// are stored.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(now)
    }

    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Option<Self> {
        date.and_hms_opt(hour, minute, 0).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_day() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let clock = FixedClock::at(date, 14, 30).unwrap();
        assert_eq!(clock.now().date(), date);
        assert_eq!(clock.now().format("%H:%M").to_string(), "14:30");
    }

    #[test]
    fn fixed_clock_rejects_impossible_times() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(FixedClock::at(date, 24, 0).is_none());
    }
}
