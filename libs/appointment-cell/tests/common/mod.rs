#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    Appointment, AppointmentSource, AppointmentStatus, BookAppointmentRequest,
};
use appointment_cell::router::AppointmentState;
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore};
use doctor_cell::models::{CreateDoctorRequest, Location};
use doctor_cell::services::DoctorService;
use doctor_cell::store::InMemoryDoctorStore;
use patient_cell::models::CreatePatientRequest;
use patient_cell::services::PatientService;
use patient_cell::store::{InMemoryPatientStore, PatientStore};
use shared_models::TimeOfDay;
use shared_utils::FixedClock;

pub const MAIN_CLINIC: &str = "Main Clinic";

pub struct TestClinic {
    pub state: Arc<AppointmentState>,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub doctors: Arc<InMemoryDoctorStore>,
    pub patients: Arc<dyn PatientStore>,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
}

/// "Now" for every test: Sunday 18 October 2026, 14:30 local.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn day(offset: i64) -> NaiveDate {
    today() + Duration::days(offset)
}

pub fn t(raw: &str) -> TimeOfDay {
    raw.parse().unwrap()
}

pub fn main_clinic() -> Location {
    Location {
        name: MAIN_CLINIC.to_string(),
        start_time: t("09:00"),
        end_time: t("17:00"),
        slot_duration_minutes: Some(30),
        active_days: vec![],
    }
}

pub async fn setup() -> TestClinic {
    setup_with_patients(Arc::new(InMemoryPatientStore::new())).await
}

/// Builds the clinic around a caller-supplied patient store, seeding one
/// doctor and one patient.
pub async fn setup_with_patients<P>(patient_store: Arc<P>) -> TestClinic
where
    P: PatientStore + 'static,
{
    let appointments = Arc::new(InMemoryAppointmentStore::new());
    let doctors = Arc::new(InMemoryDoctorStore::new());

    let doctor = DoctorService::new(doctors.clone())
        .create_doctor(CreateDoctorRequest {
            first_name: "Ada".to_string(),
            last_name: "Byrne".to_string(),
            email: "ada.byrne@example.com".to_string(),
            specialty: Some("General Practice".to_string()),
            locations: vec![main_clinic()],
        })
        .await
        .unwrap();

    let patient = PatientService::new(patient_store.clone())
        .create_patient(CreatePatientRequest {
            first_name: "Niamh".to_string(),
            last_name: "Kelly".to_string(),
            email: format!("niamh+{}@example.com", Uuid::new_v4()),
            phone_number: None,
            address: None,
            date_of_birth: None,
            birth_gender: None,
            allergies: None,
        })
        .await
        .unwrap();

    let clock = FixedClock::at(today(), 14, 30).unwrap();

    let state = Arc::new(AppointmentState {
        appointments: appointments.clone(),
        doctors: doctors.clone(),
        patients: patient_store.clone(),
        clock: Arc::new(clock),
    });

    TestClinic {
        state,
        appointments,
        doctors,
        patients: patient_store,
        doctor_id: doctor.id,
        patient_id: patient.id,
    }
}

pub fn booking(clinic: &TestClinic, date: NaiveDate, time: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id: clinic.doctor_id,
        patient_id: clinic.patient_id,
        location: MAIN_CLINIC.to_string(),
        date,
        time: t(time),
        appointment_type: None,
        source: None,
        notes: None,
    }
}

/// Inserts a row straight into the store, bypassing booking rules.
pub async fn seed(
    clinic: &TestClinic,
    date: NaiveDate,
    time: &str,
    status: AppointmentStatus,
    source: AppointmentSource,
) -> Appointment {
    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        doctor_id: clinic.doctor_id,
        patient_id: clinic.patient_id,
        location: MAIN_CLINIC.to_string(),
        date,
        time: t(time),
        appointment_type: "consultation".to_string(),
        status,
        source,
        mark_complete: false,
        notes: None,
        created_at: now,
        updated_at: now,
    };
    clinic.appointments.insert_appointment(&appointment).await.unwrap()
}
