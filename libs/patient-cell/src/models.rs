use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate};

use shared_database::DatabaseError;
use shared_models::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub birth_gender: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub appointments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub birth_gender: Option<String>,
    pub allergies: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Patient with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Invalid date of birth")]
    InvalidDateOfBirth,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists { .. } => AppError::Conflict(err.to_string()),
            PatientError::InvalidDateOfBirth => AppError::InvalidArgument(err.to_string()),
            PatientError::ValidationError(msg) => AppError::InvalidArgument(msg),
            PatientError::Database(DatabaseError::NotFound(_)) => AppError::NotFound("Patient not found".to_string()),
            PatientError::Database(DatabaseError::Conflict(msg)) => AppError::Conflict(msg),
            PatientError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_without_optional_fields_deserializes() {
        let patient: Patient = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "first_name": "Niamh",
            "last_name": "Kelly",
            "email": "niamh@example.com",
            "date_of_birth": "1990-06-15",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1990, 6, 15));
        assert!(patient.phone_number.is_none());
        assert!(patient.appointments.is_empty());
    }
}
