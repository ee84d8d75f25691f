use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use doctor_cell::services::DoctorService;
use doctor_cell::store::DoctorStore;
use patient_cell::services::PatientService;
use patient_cell::store::PatientStore;
use shared_database::DatabaseError;
use shared_models::TimeOfDay;

use crate::models::{
    Appointment, AppointmentError, AppointmentPatch, AppointmentSource, AppointmentStatus,
    BookAppointmentRequest, UpdateAppointmentRequest, DEFAULT_APPOINTMENT_TYPE,
};
use crate::services::lifecycle::validate_status_transition;
use crate::store::{AppointmentQuery, AppointmentStore};

/// Who is creating the appointment. Decides the initial status and the
/// source recorded when the caller gives none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingChannel {
    /// Patient-facing booking; the slot is confirmed straight away.
    Direct,
    /// Created by clinic staff, awaiting confirmation.
    Staff,
}

impl BookingChannel {
    pub fn initial_status(&self) -> AppointmentStatus {
        match self {
            BookingChannel::Direct => AppointmentStatus::Confirmed,
            BookingChannel::Staff => AppointmentStatus::Pending,
        }
    }

    pub fn default_source(&self) -> AppointmentSource {
        match self {
            BookingChannel::Direct => AppointmentSource::PublicBooking,
            BookingChannel::Staff => AppointmentSource::Manual,
        }
    }
}

pub struct AppointmentBookingService {
    appointments: Arc<dyn AppointmentStore>,
    doctor_store: Arc<dyn DoctorStore>,
    patient_store: Arc<dyn PatientStore>,
}

impl AppointmentBookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        doctor_store: Arc<dyn DoctorStore>,
        patient_store: Arc<dyn PatientStore>,
    ) -> Self {
        Self { appointments, doctor_store, patient_store }
    }

    fn doctors(&self) -> DoctorService {
        DoctorService::new(self.doctor_store.clone())
    }

    fn patients(&self) -> PatientService {
        PatientService::new(self.patient_store.clone())
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        channel: BookingChannel,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Booking doctor {} at '{}' on {} {} for patient {}",
            request.doctor_id, request.location, request.date, request.time, request.patient_id
        );

        let location = request.location.trim();
        if location.is_empty() {
            return Err(AppointmentError::ValidationError("location is required".to_string()));
        }
        let appointment_type = match request.appointment_type.as_deref().map(str::trim) {
            Some("") => return Err(AppointmentError::ValidationError("appointment_type must not be empty".to_string())),
            Some(kind) => kind.to_string(),
            None => DEFAULT_APPOINTMENT_TYPE.to_string(),
        };

        let (_, location) = self.doctors().get_location(request.doctor_id, location).await?;
        self.patients().get_patient(request.patient_id).await?;

        self.ensure_slot_free(request.doctor_id, &location.name, request.date, request.time, None).await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            doctor_id: request.doctor_id,
            patient_id: request.patient_id,
            location: location.name,
            date: request.date,
            time: request.time,
            appointment_type,
            status: channel.initial_status(),
            source: request.source.unwrap_or_else(|| channel.default_source()),
            mark_complete: false,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let created = self.appointments
            .insert_appointment(&appointment)
            .await
            .map_err(|e| slot_conflict(e, &appointment))?;

        self.link(&created).await?;

        info!(
            "Appointment {} booked: doctor {} at '{}' on {} {} ({})",
            created.id, created.doctor_id, created.location, created.date, created.time, created.status
        );

        Ok(created)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        if request.is_empty() {
            return Err(AppointmentError::ValidationError("no fields to update".to_string()));
        }

        let current = self.get_appointment(appointment_id).await?;

        if let Some(status) = request.status {
            validate_status_transition(current.status, status)?;
        }
        if request.is_reschedule() && current.status == AppointmentStatus::Completed {
            return Err(AppointmentError::ValidationError("a completed appointment cannot be rescheduled".to_string()));
        }

        let mut patch = AppointmentPatch {
            status: request.status,
            appointment_type: request.appointment_type.map(|t| t.trim().to_string()),
            notes: request.notes,
            date: request.date,
            time: request.time,
            location: None,
            mark_complete: (request.status == Some(AppointmentStatus::Completed)).then_some(true),
        };
        if patch.appointment_type.as_deref() == Some("") {
            return Err(AppointmentError::ValidationError("appointment_type must not be empty".to_string()));
        }

        if let Some(name) = request.location.as_deref() {
            let (_, location) = self.doctors().get_location(current.doctor_id, name.trim()).await?;
            patch.location = Some(location.name);
        }

        let mut target = current.clone();
        patch.apply_to(&mut target);

        let moved = target.location != current.location || target.date != current.date || target.time != current.time;
        let reactivated = !current.occupies_slot() && target.occupies_slot();
        if target.occupies_slot() && (moved || reactivated) {
            self.ensure_slot_free(target.doctor_id, &target.location, target.date, target.time, Some(appointment_id))
                .await?;
        }

        let updated = self.appointments
            .update_appointment(appointment_id, &patch)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => AppointmentError::NotFound,
                other => slot_conflict(other, &target),
            })?;

        info!("Appointment {} updated (status {})", updated.id, updated.status);
        Ok(updated)
    }

    pub async fn complete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        validate_status_transition(current.status, AppointmentStatus::Completed)?;

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Completed),
            mark_complete: Some(true),
            ..AppointmentPatch::default()
        };
        let updated = self.appointments.update_appointment(appointment_id, &patch).await?;

        info!("Appointment {} marked complete", appointment_id);
        Ok(updated)
    }

    /// Cancelling frees the slot for new bookings.
    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;
        validate_status_transition(current.status, AppointmentStatus::Cancelled)?;

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Cancelled),
            ..AppointmentPatch::default()
        };
        let updated = self.appointments.update_appointment(appointment_id, &patch).await?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(updated)
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let deleted = self.appointments
            .delete_appointment(appointment_id)
            .await
            .map_err(|e| if e.is_not_found() { AppointmentError::NotFound } else { e.into() })?;

        let unlinked = self.doctor_store
            .remove_appointment_ref(deleted.doctor_id, deleted.id)
            .await
            .and(self.patient_store.remove_appointment_ref(deleted.patient_id, deleted.id).await);

        if let Err(e) = unlinked {
            error!("Appointment {} deleted but back-references were not cleared: {}", deleted.id, e);
            return Err(AppointmentError::BackReference {
                appointment_id: deleted.id,
                reason: e.to_string(),
            });
        }

        info!("Appointment {} deleted", deleted.id);
        Ok(deleted)
    }

    async fn ensure_slot_free(
        &self,
        doctor_id: Uuid,
        location: &str,
        date: NaiveDate,
        time: TimeOfDay,
        exclude: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        let query = AppointmentQuery {
            exclude_id: exclude,
            ..AppointmentQuery::slot(doctor_id, location, date, time)
        };

        if self.appointments.count_appointments(&query).await? > 0 {
            warn!("Slot {} {} at '{}' for doctor {} is already booked", date, time, location, doctor_id);
            return Err(AppointmentError::SlotTaken {
                location: location.to_string(),
                date,
                time,
            });
        }
        Ok(())
    }

    /// Records the appointment on both owners. On failure the appointment is
    /// removed again so no unreferenced booking holds the slot.
    async fn link(&self, appointment: &Appointment) -> Result<(), AppointmentError> {
        let linked = match self.doctor_store.add_appointment_ref(appointment.doctor_id, appointment.id).await {
            Ok(()) => self.patient_store.add_appointment_ref(appointment.patient_id, appointment.id).await,
            Err(e) => Err(e),
        };

        let Err(e) = linked else {
            return Ok(());
        };

        error!("Failed to link appointment {}: {}, rolling back", appointment.id, e);

        if let Err(cleanup) = self.doctor_store.remove_appointment_ref(appointment.doctor_id, appointment.id).await {
            warn!("Rollback could not unlink doctor {}: {}", appointment.doctor_id, cleanup);
        }
        if let Err(cleanup) = self.appointments.delete_appointment(appointment.id).await {
            error!("Rollback could not delete appointment {}: {}", appointment.id, cleanup);
        }

        Err(AppointmentError::BackReference {
            appointment_id: appointment.id,
            reason: e.to_string(),
        })
    }
}

/// A unique-index violation from the store means another booking won the
/// race for the slot.
fn slot_conflict(err: DatabaseError, appointment: &Appointment) -> AppointmentError {
    if err.is_conflict() {
        warn!("Store rejected duplicate slot for appointment {}: {}", appointment.id, err);
        return AppointmentError::SlotTaken {
            location: appointment.location.clone(),
            date: appointment.date,
            time: appointment.time,
        };
    }
    err.into()
}
