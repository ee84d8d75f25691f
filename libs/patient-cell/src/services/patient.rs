use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{CreatePatientRequest, Patient, PatientError};
use crate::store::PatientStore;

pub struct PatientService {
    store: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn PatientStore>) -> Self {
        Self { store }
    }

    pub async fn create_patient(&self, mut request: CreatePatientRequest) -> Result<Patient, PatientError> {
        request.email = normalize_email(&request.email);
        debug!("Creating new patient profile for: {}", request.email);

        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(PatientError::ValidationError("first_name and last_name are required".to_string()));
        }
        if !request.email.contains('@') {
            return Err(PatientError::ValidationError(format!("invalid email '{}'", request.email)));
        }

        let now = Utc::now();
        if request.date_of_birth.is_some_and(|dob| dob > now.date_naive()) {
            return Err(PatientError::InvalidDateOfBirth);
        }

        if self.store.find_patient_by_email(&request.email).await?.is_some() {
            warn!("Patient with email {} already exists", request.email);
            return Err(PatientError::EmailAlreadyExists { email: request.email });
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone_number: request.phone_number,
            address: request.address,
            date_of_birth: request.date_of_birth,
            birth_gender: request.birth_gender,
            allergies: request.allergies,
            appointments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create_patient(&patient).await?;
        info!("Patient profile created with ID: {}", created.id);

        Ok(created)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        self.store.get_patient(patient_id).await?.ok_or(PatientError::NotFound)
    }
}

/// Emails are stored and compared in one canonical form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
