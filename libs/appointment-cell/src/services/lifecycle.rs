use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Statuses reachable from `current`. Completed is terminal; a cancelled
/// appointment can be reactivated, subject to the slot still being free.
pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;

    match current {
        Pending => &[Confirmed, Completed, Cancelled, NoShow],
        Confirmed => &[Pending, Completed, Cancelled, NoShow],
        Cancelled => &[Pending, Confirmed],
        NoShow => &[Confirmed, Cancelled],
        Completed => &[],
    }
}

pub fn validate_status_transition(
    current: AppointmentStatus,
    next: AppointmentStatus,
) -> Result<(), AppointmentError> {
    debug!("Validating status transition from {} to {}", current, next);

    if current == next || valid_transitions(current).contains(&next) {
        return Ok(());
    }

    warn!("Invalid status transition attempted: {} -> {}", current, next);
    Err(AppointmentError::InvalidStatusTransition { from: current, to: next })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn completed_is_terminal() {
        assert_matches!(
            validate_status_transition(AppointmentStatus::Completed, AppointmentStatus::Cancelled),
            Err(AppointmentError::InvalidStatusTransition { .. })
        );
        assert!(validate_status_transition(AppointmentStatus::Completed, AppointmentStatus::Completed).is_ok());
    }

    #[test]
    fn cancelled_can_be_reactivated() {
        assert!(validate_status_transition(AppointmentStatus::Cancelled, AppointmentStatus::Confirmed).is_ok());
        assert!(validate_status_transition(AppointmentStatus::Cancelled, AppointmentStatus::Completed).is_err());
    }

    #[test]
    fn open_appointments_can_finish_or_cancel() {
        for from in [AppointmentStatus::Pending, AppointmentStatus::Confirmed] {
            assert!(validate_status_transition(from, AppointmentStatus::Completed).is_ok());
            assert!(validate_status_transition(from, AppointmentStatus::Cancelled).is_ok());
        }
    }
}
