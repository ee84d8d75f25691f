use shared_models::TimeOfDay;

use crate::models::{Location, TimeSlot};

/// Cuts a location's working window into fixed-cadence slots.
///
/// Every slot starts strictly before `end_time`, so a window that does not
/// divide evenly keeps its trailing partial slot.
pub fn generate_slots(location: &Location) -> Vec<TimeSlot> {
    let step = location.slot_duration();
    let end = location.end_time.minutes_since_midnight();
    let mut cursor = location.start_time.minutes_since_midnight();

    let mut slots = Vec::new();
    while cursor < end {
        let Some(time) = TimeOfDay::from_minutes(cursor) else {
            break;
        };
        slots.push(TimeSlot::free(time));
        cursor = match cursor.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(start: &str, end: &str, duration: Option<u32>) -> Location {
        Location {
            name: "Main Clinic".to_string(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            slot_duration_minutes: duration,
            active_days: vec![],
        }
    }

    fn times(slots: &[TimeSlot]) -> Vec<String> {
        slots.iter().map(|s| s.time.to_string()).collect()
    }

    #[test]
    fn full_day_in_half_hours() {
        let slots = generate_slots(&location("09:00", "17:00", Some(30)));
        assert_eq!(slots.len(), 16);
        assert_eq!(slots.first().unwrap().time.to_string(), "09:00");
        assert_eq!(slots.last().unwrap().time.to_string(), "16:30");
        assert!(slots.iter().all(|s| !s.is_booked));
    }

    #[test]
    fn trailing_partial_slot_is_kept() {
        let slots = generate_slots(&location("09:00", "10:00", Some(45)));
        assert_eq!(times(&slots), vec!["09:00", "09:45"]);
    }

    #[test]
    fn empty_window_has_no_slots() {
        assert!(generate_slots(&location("09:00", "09:00", Some(30))).is_empty());
    }

    #[test]
    fn missing_duration_uses_default_cadence() {
        let slots = generate_slots(&location("14:00", "15:30", None));
        assert_eq!(times(&slots), vec!["14:00", "14:30", "15:00"]);
    }

    #[test]
    fn minutes_carry_into_hours() {
        let slots = generate_slots(&location("09:40", "11:00", Some(25)));
        assert_eq!(times(&slots), vec!["09:40", "10:05", "10:30", "10:55"]);
    }

    #[test]
    fn evenly_dividing_windows_have_fixed_cadence() {
        for (start, end, step) in [("08:00", "12:00", 15u32), ("13:00", "18:00", 60), ("00:00", "23:00", 20)] {
            let loc = location(start, end, Some(step));
            let slots = generate_slots(&loc);
            let span = loc.end_time.minutes_since_midnight() - loc.start_time.minutes_since_midnight();

            assert_eq!(slots.len() as u32, span / step);
            assert_eq!(slots[0].time, loc.start_time);
            assert!(slots.last().unwrap().time < loc.end_time);
            for pair in slots.windows(2) {
                assert_eq!(
                    pair[1].time.minutes_since_midnight() - pair[0].time.minutes_since_midnight(),
                    step
                );
            }
        }
    }

    #[test]
    fn oversized_step_yields_only_the_start() {
        for step in [TimeOfDay::MINUTES_PER_DAY, u32::MAX - 1, u32::MAX] {
            let slots = generate_slots(&location("09:00", "17:00", Some(step)));
            assert_eq!(times(&slots), vec!["09:00"], "step {}", step);
        }
    }
}
