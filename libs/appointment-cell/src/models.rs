use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use doctor_cell::models::{DoctorError, TimeSlot};
use patient_cell::models::PatientError;
use shared_database::DatabaseError;
use shared_models::{AppError, Pagination, TimeOfDay};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub location: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub source: AppointmentSource,
    #[serde(default)]
    pub mark_complete: bool,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment holds its (doctor, location, date, time) slot.
    pub fn occupies_slot(&self) -> bool {
        self.status.occupies_slot()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Confirmed")]
    Confirmed,
    #[serde(alias = "Completed")]
    Completed,
    #[serde(alias = "Cancelled")]
    Cancelled,
    #[serde(alias = "NoShow", alias = "No Show")]
    NoShow,
}

impl AppointmentStatus {
    pub fn occupies_slot(&self) -> bool {
        *self != AppointmentStatus::Cancelled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

/// Where a booking came from. Everything except `Manual` counts as a
/// shared (patient-initiated) booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentSource {
    Manual,
    PublicBooking,
    QrCode,
    Whatsapp,
}

impl fmt::Display for AppointmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentSource::Manual => write!(f, "manual"),
            AppointmentSource::PublicBooking => write!(f, "public_booking"),
            AppointmentSource::QrCode => write!(f, "qr_code"),
            AppointmentSource::Whatsapp => write!(f, "whatsapp"),
        }
    }
}

pub const DEFAULT_APPOINTMENT_TYPE: &str = "consultation";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub location: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub appointment_type: Option<String>,
    pub source: Option<AppointmentSource>,
    pub notes: Option<String>,
}

/// Partial update. Any of `date`, `time` or `location` makes it a reschedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<String>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
    pub location: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn is_reschedule(&self) -> bool {
        self.date.is_some() || self.time.is_some() || self.location.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.appointment_type.is_none()
            && self.notes.is_none()
            && !self.is_reschedule()
    }
}

/// Field-level changes handed to the store.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_complete: Option<bool>,
}

impl AppointmentPatch {
    pub fn apply_to(&self, appointment: &mut Appointment) {
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(kind) = &self.appointment_type {
            appointment.appointment_type = kind.clone();
        }
        if let Some(notes) = &self.notes {
            appointment.notes = Some(notes.clone());
        }
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(location) = &self.location {
            appointment.location = location.clone();
        }
        if let Some(done) = self.mark_complete {
            appointment.mark_complete = done;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: String,
    pub location: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub doctor_id: Uuid,
    pub location: String,
    pub date: NaiveDate,
    pub time_slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentPage {
    pub appointments: Vec<Appointment>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDashboard {
    pub doctor_id: Uuid,
    pub total: u64,
    pub today: u64,
    pub upcoming: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub shared_bookings: u64,
    pub next_appointment: Option<Appointment>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Location '{0}' not found")]
    LocationNotFound(String),

    #[error("Slot {time} on {date} at '{location}' is already booked")]
    SlotTaken {
        location: String,
        date: NaiveDate,
        time: TimeOfDay,
    },

    #[error("Appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Failed to link appointment {appointment_id}: {reason}")]
    BackReference { appointment_id: Uuid, reason: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::LocationNotFound(name) => AppointmentError::LocationNotFound(name),
            DoctorError::Database(e) => AppointmentError::Database(e),
            other => AppointmentError::ValidationError(other.to_string()),
        }
    }
}

impl From<PatientError> for AppointmentError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppointmentError::PatientNotFound,
            PatientError::Database(e) => AppointmentError::Database(e),
            other => AppointmentError::ValidationError(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::PatientNotFound
            | AppointmentError::LocationNotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::SlotTaken { .. } | AppointmentError::InvalidStatusTransition { .. } => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::ValidationError(msg) => AppError::InvalidArgument(msg),
            AppointmentError::BackReference { .. } => AppError::Internal(err.to_string()),
            AppointmentError::Database(DatabaseError::NotFound(_)) => {
                AppError::NotFound("Appointment not found".to_string())
            }
            AppointmentError::Database(DatabaseError::Conflict(msg)) => AppError::Conflict(msg),
            AppointmentError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
