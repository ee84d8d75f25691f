use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Doctor, Location};

#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, DatabaseError>;

    async fn create_doctor(&self, doctor: &Doctor) -> Result<Doctor, DatabaseError>;

    /// Replaces the doctor's whole location list.
    async fn update_locations(&self, doctor_id: Uuid, locations: &[Location]) -> Result<Doctor, DatabaseError>;

    /// Adds the id to the doctor's appointment list unless already present.
    async fn add_appointment_ref(&self, doctor_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError>;

    /// Removes the id from the doctor's appointment list if present.
    async fn remove_appointment_ref(&self, doctor_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError>;
}

pub struct SupabaseDoctorStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Runs one of the single-statement ref functions. They report whether
    /// the doctor row exists, so concurrent bookings never overwrite each
    /// other's ids.
    async fn update_appointment_refs(
        &self,
        function: &str,
        doctor_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<(), DatabaseError> {
        debug!("Calling {} for doctor {} and appointment {}", function, doctor_id, appointment_id);

        let found: bool = self.supabase.rpc(function, json!({
            "p_doctor_id": doctor_id,
            "p_appointment_id": appointment_id,
        })).await?;

        if !found {
            return Err(DatabaseError::NotFound(format!("doctor {}", doctor_id)));
        }
        Ok(())
    }
}

#[async_trait]
impl DoctorStore for SupabaseDoctorStore {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, DatabaseError> {
        debug!("Fetching doctor {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Doctor> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(result.into_iter().next())
    }

    async fn create_doctor(&self, doctor: &Doctor) -> Result<Doctor, DatabaseError> {
        debug!("Inserting doctor {}", doctor.id);

        let body = serde_json::to_value(doctor)?;
        let result: Vec<Doctor> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/doctors",
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::InvalidResponse("insert returned no doctor".to_string()))
    }

    async fn update_locations(&self, doctor_id: Uuid, locations: &[Location]) -> Result<Doctor, DatabaseError> {
        debug!("Replacing {} locations for doctor {}", locations.len(), doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let body = json!({
            "locations": locations,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let result: Vec<Doctor> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::NotFound(format!("doctor {}", doctor_id)))
    }

    async fn add_appointment_ref(&self, doctor_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        self.update_appointment_refs("add_doctor_appointment_ref", doctor_id, appointment_id).await
    }

    async fn remove_appointment_ref(&self, doctor_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        self.update_appointment_refs("remove_doctor_appointment_ref", doctor_id, appointment_id).await
    }
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct InMemoryDoctorStore {
    doctors: RwLock<HashMap<Uuid, Doctor>>,
}

impl InMemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DoctorStore for InMemoryDoctorStore {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, DatabaseError> {
        Ok(self.doctors.read().await.get(&doctor_id).cloned())
    }

    async fn create_doctor(&self, doctor: &Doctor) -> Result<Doctor, DatabaseError> {
        let mut doctors = self.doctors.write().await;
        if doctors.contains_key(&doctor.id) {
            return Err(DatabaseError::Conflict(format!("doctor {} already exists", doctor.id)));
        }
        doctors.insert(doctor.id, doctor.clone());
        Ok(doctor.clone())
    }

    async fn update_locations(&self, doctor_id: Uuid, locations: &[Location]) -> Result<Doctor, DatabaseError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors.get_mut(&doctor_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("doctor {}", doctor_id)))?;
        doctor.locations = locations.to_vec();
        doctor.updated_at = Utc::now();
        Ok(doctor.clone())
    }

    async fn add_appointment_ref(&self, doctor_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors.get_mut(&doctor_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("doctor {}", doctor_id)))?;
        if !doctor.appointments.contains(&appointment_id) {
            doctor.appointments.push(appointment_id);
        }
        Ok(())
    }

    async fn remove_appointment_ref(&self, doctor_id: Uuid, appointment_id: Uuid) -> Result<(), DatabaseError> {
        let mut doctors = self.doctors.write().await;
        let doctor = doctors.get_mut(&doctor_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("doctor {}", doctor_id)))?;
        doctor.appointments.retain(|id| *id != appointment_id);
        Ok(())
    }
}
