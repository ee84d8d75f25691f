use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
use appointment_cell::{appointment_routes, AppointmentState};
use doctor_cell::router::doctor_routes;
use doctor_cell::{DoctorState, DoctorStore, InMemoryDoctorStore, SupabaseDoctorStore};
use patient_cell::{create_patient_router, InMemoryPatientStore, PatientState, PatientStore, SupabasePatientStore};
use shared_config::{AppConfig, StoreBackend};
use shared_database::SupabaseClient;
use shared_utils::{Clock, SystemClock};

/// The three stores every cell reads from, plus the clock.
#[derive(Clone)]
pub struct Stores {
    pub doctors: Arc<dyn DoctorStore>,
    pub patients: Arc<dyn PatientStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub clock: Arc<dyn Clock>,
}

impl Stores {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.store_backend {
            StoreBackend::Supabase => {
                let supabase = Arc::new(SupabaseClient::new(config));
                Self {
                    doctors: Arc::new(SupabaseDoctorStore::new(supabase.clone())),
                    patients: Arc::new(SupabasePatientStore::new(supabase.clone())),
                    appointments: Arc::new(SupabaseAppointmentStore::new(supabase)),
                    clock: Arc::new(SystemClock),
                }
            }
            StoreBackend::Memory => Self::in_memory(Arc::new(SystemClock)),
        }
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            doctors: Arc::new(InMemoryDoctorStore::new()),
            patients: Arc::new(InMemoryPatientStore::new()),
            appointments: Arc::new(InMemoryAppointmentStore::new()),
            clock,
        }
    }
}

pub fn create_router(stores: Stores) -> Router {
    let doctor_state = Arc::new(DoctorState::new(stores.doctors.clone()));
    let patient_state = Arc::new(PatientState::new(stores.patients.clone()));
    let appointment_state = Arc::new(AppointmentState {
        appointments: stores.appointments,
        doctors: stores.doctors,
        patients: stores.patients,
        clock: stores.clock,
    });

    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/doctors", doctor_routes(doctor_state))
        .nest("/patients", create_patient_router(patient_state))
        .nest("/appointments", appointment_routes(appointment_state))
}
