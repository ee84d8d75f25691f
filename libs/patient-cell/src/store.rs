use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::Patient;

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, DatabaseError>;

    /// Exact match; callers pass the normalized (trimmed, lowercased) email.
    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, DatabaseError>;

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, DatabaseError>;

    async fn add_appointment_ref(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError>;

    async fn remove_appointment_ref(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError>;
}

pub struct SupabasePatientStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePatientStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn update_refs(&self, function: &str, patient_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        let found: bool = self.supabase.rpc(function, json!({
            "p_patient_id": patient_id,
            "p_appointment_id": appointment_id,
        })).await?;

        if !found {
            return Err(DatabaseError::NotFound(format!("patient {}", patient_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl PatientStore for SupabasePatientStore {
    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, DatabaseError> {
        debug!("Fetching patient {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Patient> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(result.into_iter().next())
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, DatabaseError> {
        let path = format!("/rest/v1/patients?email=eq.{}", urlencoding::encode(email));
        let result: Vec<Patient> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(result.into_iter().next())
    }

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, DatabaseError> {
        debug!("Inserting patient {}", patient.id);

        let body = serde_json::to_value(patient)?;
        let result: Vec<Patient> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/patients",
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::InvalidResponse("insert returned no patient".to_string()))
    }

    async fn add_appointment_ref(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        self.update_refs("add_patient_appointment_ref", patient_id, appointment_id).await
    }

    async fn remove_appointment_ref(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        self.update_refs("remove_patient_appointment_ref", patient_id, appointment_id).await
    }
}

#[derive(Default)]
pub struct InMemoryPatientStore {
    patients: RwLock<HashMap<Uuid, Patient>>,
}

impl InMemoryPatientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for InMemoryPatientStore {
    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, DatabaseError> {
        Ok(self.patients.read().await.get(&patient_id).cloned())
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, DatabaseError> {
        Ok(self.patients.read().await
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, DatabaseError> {
        let mut patients = self.patients.write().await;
        if patients.values().any(|p| p.email == patient.email) {
            return Err(DatabaseError::Conflict(format!("patient email {} already exists", patient.email)));
        }
        patients.insert(patient.id, patient.clone());
        Ok(patient.clone())
    }

    async fn add_appointment_ref(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        let mut patients = self.patients.write().await;
        let patient = patients.get_mut(&patient_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("patient {}", patient_id)))?;
        if !patient.appointments.contains(&appointment_id) {
            patient.appointments.push(appointment_id);
        }
        Ok(())
    }

    async fn remove_appointment_ref(&self, patient_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        let mut patients = self.patients.write().await;
        let patient = patients.get_mut(&patient_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("patient {}", patient_id)))?;
        patient.appointments.retain(|id| *id != appointment_id);
        Ok(())
    }
}
