use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;
use shared_models::{AppError, TimeOfDay};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub appointments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// Exact, case-sensitive lookup by location name.
    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }
}

/// A place a doctor works, with the daily window slots are cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub slot_duration_minutes: Option<u32>,
    /// Empty means every day.
    #[serde(default)]
    pub active_days: Vec<Weekday>,
}

impl Location {
    pub const DEFAULT_SLOT_MINUTES: u32 = 30;

    /// Unset and zero both fall back to the default cadence.
    pub fn slot_duration(&self) -> u32 {
        match self.slot_duration_minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => Self::DEFAULT_SLOT_MINUTES,
        }
    }

    pub fn is_active_on(&self, weekday: Weekday) -> bool {
        self.active_days.is_empty() || self.active_days.contains(&weekday)
    }

    pub fn validate(&self) -> Result<(), DoctorError> {
        if self.name.trim().is_empty() {
            return Err(DoctorError::ValidationError("location name must not be empty".to_string()));
        }
        if self.start_time >= self.end_time {
            return Err(DoctorError::ValidationError(format!(
                "location '{}' must start before it ends ({} >= {})",
                self.name, self.start_time, self.end_time
            )));
        }
        match self.slot_duration_minutes {
            Some(0) => {
                return Err(DoctorError::ValidationError(format!(
                    "location '{}' slot duration must be positive",
                    self.name
                )));
            }
            Some(minutes) if minutes > TimeOfDay::MINUTES_PER_DAY => {
                return Err(DoctorError::ValidationError(format!(
                    "location '{}' slot duration must not exceed {} minutes",
                    self.name,
                    TimeOfDay::MINUTES_PER_DAY
                )));
            }
            _ => {}
        }
        Ok(())
    }
}

/// A candidate appointment start. Derived on request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: TimeOfDay,
    pub is_booked: bool,
}

impl TimeSlot {
    pub fn free(time: TimeOfDay) -> Self {
        Self { time, is_booked: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialty: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLocationRequest {
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub slot_duration_minutes: Option<u32>,
    pub active_days: Option<Vec<Weekday>>,
}

impl UpdateLocationRequest {
    pub fn apply_to(&self, location: &Location) -> Location {
        Location {
            name: location.name.clone(),
            start_time: self.start_time.unwrap_or(location.start_time),
            end_time: self.end_time.unwrap_or(location.end_time),
            slot_duration_minutes: self.slot_duration_minutes.or(location.slot_duration_minutes),
            active_days: self.active_days.clone().unwrap_or_else(|| location.active_days.clone()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Location '{0}' not found")]
    LocationNotFound(String),

    #[error("Location '{0}' already exists")]
    DuplicateLocation(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound | DoctorError::LocationNotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::DuplicateLocation(_) => AppError::Conflict(err.to_string()),
            DoctorError::ValidationError(msg) => AppError::InvalidArgument(msg),
            DoctorError::Database(DatabaseError::NotFound(_)) => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::Database(DatabaseError::Conflict(msg)) => AppError::Conflict(msg),
            DoctorError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
