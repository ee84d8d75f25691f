use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use doctor_cell::models::TimeSlot;
use doctor_cell::services::{generate_slots, DoctorService};
use doctor_cell::store::DoctorStore;
use shared_models::TimeOfDay;

use crate::models::AppointmentError;
use crate::store::{AppointmentQuery, AppointmentStore};

pub struct AvailabilityService {
    appointments: Arc<dyn AppointmentStore>,
    doctors: DoctorService,
}

impl AvailabilityService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, doctors: Arc<dyn DoctorStore>) -> Self {
        Self {
            appointments,
            doctors: DoctorService::new(doctors),
        }
    }

    /// Slots for one doctor, location and day, each marked booked when a
    /// non-cancelled appointment holds it. A day outside the location's
    /// active days has no slots.
    pub async fn resolve_availability(
        &self,
        doctor_id: Uuid,
        location_name: &str,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, AppointmentError> {
        let (_, location) = self.doctors.get_location(doctor_id, location_name).await?;

        if !location.is_active_on(date.weekday()) {
            debug!("Location '{}' is closed on {}", location.name, date.weekday());
            return Ok(Vec::new());
        }

        let mut slots = generate_slots(&location);

        let query = AppointmentQuery {
            doctor_id: Some(doctor_id),
            location: Some(location.name.clone()),
            date: Some(date),
            exclude_cancelled: true,
            ..AppointmentQuery::default()
        };
        let booked: HashSet<TimeOfDay> = self.appointments
            .find_appointments(&query, None)
            .await?
            .into_iter()
            .map(|a| a.time)
            .collect();

        for slot in &mut slots {
            slot.is_booked = booked.contains(&slot.time);
        }

        debug!(
            "Doctor {} at '{}' on {}: {} slots, {} booked",
            doctor_id,
            location.name,
            date,
            slots.len(),
            slots.iter().filter(|s| s.is_booked).count()
        );

        Ok(slots)
    }
}
