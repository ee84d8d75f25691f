use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, Location, UpdateLocationRequest};
use crate::store::DoctorStore;

pub struct DoctorService {
    store: Arc<dyn DoctorStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn DoctorStore>) -> Self {
        Self { store }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        self.store.get_doctor(doctor_id).await?.ok_or(DoctorError::NotFound)
    }

    /// Create a new doctor profile
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating new doctor profile for: {}", request.email);

        for (field, value) in [
            ("first_name", &request.first_name),
            ("last_name", &request.last_name),
            ("email", &request.email),
        ] {
            if value.trim().is_empty() {
                return Err(DoctorError::ValidationError(format!("{} must not be empty", field)));
            }
        }

        let mut seen = HashSet::new();
        for location in &request.locations {
            location.validate()?;
            if !seen.insert(location.name.as_str()) {
                return Err(DoctorError::DuplicateLocation(location.name.clone()));
            }
        }

        let now = Utc::now();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            specialty: request.specialty,
            locations: request.locations,
            appointments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create_doctor(&doctor).await?;
        info!("Doctor {} created with {} locations", created.id, created.locations.len());

        Ok(created)
    }

    pub async fn list_locations(&self, doctor_id: Uuid) -> Result<Vec<Location>, DoctorError> {
        Ok(self.get_doctor(doctor_id).await?.locations)
    }

    /// Resolves a doctor together with one of its locations.
    pub async fn get_location(&self, doctor_id: Uuid, name: &str) -> Result<(Doctor, Location), DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        let location = doctor.location(name)
            .cloned()
            .ok_or_else(|| DoctorError::LocationNotFound(name.to_string()))?;
        Ok((doctor, location))
    }

    pub async fn add_location(&self, doctor_id: Uuid, location: Location) -> Result<Location, DoctorError> {
        location.validate()?;

        let doctor = self.get_doctor(doctor_id).await?;
        if doctor.location(&location.name).is_some() {
            warn!("Doctor {} already has a location named '{}'", doctor_id, location.name);
            return Err(DoctorError::DuplicateLocation(location.name));
        }

        let mut locations = doctor.locations;
        locations.push(location.clone());
        self.store.update_locations(doctor_id, &locations).await?;

        info!("Added location '{}' to doctor {}", location.name, doctor_id);
        Ok(location)
    }

    pub async fn update_location(
        &self,
        doctor_id: Uuid,
        name: &str,
        request: UpdateLocationRequest,
    ) -> Result<Location, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        let mut locations = doctor.locations;

        let slot = locations.iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| DoctorError::LocationNotFound(name.to_string()))?;

        let merged = request.apply_to(slot);
        merged.validate()?;
        *slot = merged.clone();

        self.store.update_locations(doctor_id, &locations).await?;

        info!("Updated location '{}' for doctor {}", name, doctor_id);
        Ok(merged)
    }

    pub async fn remove_location(&self, doctor_id: Uuid, name: &str) -> Result<(), DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        let mut locations = doctor.locations;

        let before = locations.len();
        locations.retain(|l| l.name != name);
        if locations.len() == before {
            return Err(DoctorError::LocationNotFound(name.to_string()));
        }

        self.store.update_locations(doctor_id, &locations).await?;

        info!("Removed location '{}' from doctor {}", name, doctor_id);
        Ok(())
    }
}
