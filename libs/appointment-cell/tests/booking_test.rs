mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentError, AppointmentSource, AppointmentStatus, UpdateAppointmentRequest,
};
use appointment_cell::services::BookingChannel;
use appointment_cell::store::{AppointmentQuery, AppointmentStore};
use doctor_cell::models::UpdateLocationRequest;
use doctor_cell::services::DoctorService;
use doctor_cell::store::DoctorStore;
use patient_cell::models::Patient;
use patient_cell::store::{InMemoryPatientStore, PatientStore};
use shared_database::DatabaseError;

use common::{booking, day, seed, setup, setup_with_patients, t, MAIN_CLINIC};

#[tokio::test]
async fn test_direct_booking_is_confirmed_and_linked() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();

    let appointment = service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(appointment.source, AppointmentSource::PublicBooking);
    assert_eq!(appointment.appointment_type, "consultation");
    assert!(!appointment.mark_complete);

    let doctor = clinic.doctors.get_doctor(clinic.doctor_id).await.unwrap().unwrap();
    let patient = clinic.patients.get_patient(clinic.patient_id).await.unwrap().unwrap();
    assert_eq!(doctor.appointments, vec![appointment.id]);
    assert_eq!(patient.appointments, vec![appointment.id]);
}

#[tokio::test]
async fn test_staff_booking_is_pending_and_manual() {
    let clinic = setup().await;

    let appointment = clinic
        .state
        .booking_service()
        .book_appointment(booking(&clinic, day(2), "10:00"), BookingChannel::Staff)
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.source, AppointmentSource::Manual);
}

#[tokio::test]
async fn test_explicit_source_is_kept() {
    let clinic = setup().await;
    let mut request = booking(&clinic, day(2), "10:00");
    request.source = Some(AppointmentSource::Whatsapp);

    let appointment = clinic
        .state
        .booking_service()
        .book_appointment(request, BookingChannel::Direct)
        .await
        .unwrap();

    assert_eq!(appointment.source, AppointmentSource::Whatsapp);
}

#[tokio::test]
async fn test_double_booking_conflicts() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();

    service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await
        .unwrap();

    let second = service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Staff)
        .await;
    assert_matches!(second, Err(AppointmentError::SlotTaken { .. }));

    let slots = clinic
        .state
        .availability_service()
        .resolve_availability(clinic.doctor_id, MAIN_CLINIC, day(2))
        .await
        .unwrap();
    let nine = slots.iter().find(|s| s.time == t("09:00")).unwrap();
    assert!(nine.is_booked);
    assert_eq!(slots.iter().filter(|s| s.is_booked).count(), 1);
}

#[tokio::test]
async fn test_existing_row_blocks_booking_and_insert() {
    let clinic = setup().await;
    let held = seed(&clinic, day(3), "11:00", AppointmentStatus::Confirmed, AppointmentSource::Manual).await;

    let mut duplicate = held.clone();
    duplicate.id = Uuid::new_v4();
    assert_matches!(
        clinic.appointments.insert_appointment(&duplicate).await,
        Err(DatabaseError::Conflict(_))
    );

    let again = clinic
        .state
        .booking_service()
        .book_appointment(booking(&clinic, day(3), "11:00"), BookingChannel::Direct)
        .await;

    assert_matches!(again, Err(AppointmentError::SlotTaken { .. }));
}

#[tokio::test]
async fn test_cancelled_slot_can_be_rebooked() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();

    let first = service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await
        .unwrap();
    let cancelled = service.cancel_appointment(first.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let slots = clinic
        .state
        .availability_service()
        .resolve_availability(clinic.doctor_id, MAIN_CLINIC, day(2))
        .await
        .unwrap();
    assert!(slots.iter().all(|s| !s.is_booked));

    let rebooked = service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await
        .unwrap();
    assert_ne!(rebooked.id, first.id);

    // the original cannot come back while the slot is held again
    let reactivate = service
        .update_appointment(first.id, UpdateAppointmentRequest {
            status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        })
        .await;
    assert_matches!(reactivate, Err(AppointmentError::SlotTaken { .. }));
}

#[tokio::test]
async fn test_unknown_references_are_not_found() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();

    let mut request = booking(&clinic, day(1), "09:00");
    request.doctor_id = Uuid::new_v4();
    assert_matches!(
        service.book_appointment(request, BookingChannel::Direct).await,
        Err(AppointmentError::DoctorNotFound)
    );

    let mut request = booking(&clinic, day(1), "09:00");
    request.patient_id = Uuid::new_v4();
    assert_matches!(
        service.book_appointment(request, BookingChannel::Direct).await,
        Err(AppointmentError::PatientNotFound)
    );

    let mut request = booking(&clinic, day(1), "09:00");
    request.location = "Harbour Branch".to_string();
    assert_matches!(
        service.book_appointment(request, BookingChannel::Direct).await,
        Err(AppointmentError::LocationNotFound(name)) if name == "Harbour Branch"
    );

    let mut request = booking(&clinic, day(1), "09:00");
    request.location = "  ".to_string();
    assert_matches!(
        service.book_appointment(request, BookingChannel::Direct).await,
        Err(AppointmentError::ValidationError(_))
    );
}

#[tokio::test]
async fn test_reschedule_checks_target_slot() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();

    let first = service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await
        .unwrap();
    service
        .book_appointment(booking(&clinic, day(2), "09:30"), BookingChannel::Direct)
        .await
        .unwrap();

    let clash = service
        .update_appointment(first.id, UpdateAppointmentRequest {
            time: Some(t("09:30")),
            ..Default::default()
        })
        .await;
    assert_matches!(clash, Err(AppointmentError::SlotTaken { .. }));

    // keeping its own slot is not a conflict
    let same = service
        .update_appointment(first.id, UpdateAppointmentRequest {
            time: Some(t("09:00")),
            notes: Some("bring referral letter".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(same.notes.as_deref(), Some("bring referral letter"));

    let moved = service
        .update_appointment(first.id, UpdateAppointmentRequest {
            date: Some(day(3)),
            time: Some(t("15:00")),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!((moved.date, moved.time), (day(3), t("15:00")));

    let nowhere = service
        .update_appointment(first.id, UpdateAppointmentRequest {
            location: Some("Harbour Branch".to_string()),
            ..Default::default()
        })
        .await;
    assert_matches!(nowhere, Err(AppointmentError::LocationNotFound(_)));
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();
    let appointment = service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await
        .unwrap();

    assert_matches!(
        service.update_appointment(appointment.id, UpdateAppointmentRequest::default()).await,
        Err(AppointmentError::ValidationError(_))
    );
}

#[tokio::test]
async fn test_complete_marks_and_locks_status() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();
    let appointment = service
        .book_appointment(booking(&clinic, day(0), "16:00"), BookingChannel::Direct)
        .await
        .unwrap();

    let completed = service.complete_appointment(appointment.id).await.unwrap();
    assert!(completed.mark_complete);
    assert_eq!(completed.status, AppointmentStatus::Completed);

    assert_matches!(
        service.cancel_appointment(appointment.id).await,
        Err(AppointmentError::InvalidStatusTransition { .. })
    );
}

#[tokio::test]
async fn test_delete_clears_back_references() {
    let clinic = setup().await;
    let service = clinic.state.booking_service();

    let keep = service
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await
        .unwrap();
    let gone = service
        .book_appointment(booking(&clinic, day(2), "09:30"), BookingChannel::Direct)
        .await
        .unwrap();

    service.delete_appointment(gone.id).await.unwrap();

    let doctor = clinic.doctors.get_doctor(clinic.doctor_id).await.unwrap().unwrap();
    let patient = clinic.patients.get_patient(clinic.patient_id).await.unwrap().unwrap();
    assert_eq!(doctor.appointments, vec![keep.id]);
    assert_eq!(patient.appointments, vec![keep.id]);

    assert_matches!(service.delete_appointment(gone.id).await, Err(AppointmentError::NotFound));
    assert_matches!(service.get_appointment(gone.id).await, Err(AppointmentError::NotFound));
}

#[tokio::test]
async fn test_availability_respects_active_days() {
    let clinic = setup().await;
    let doctors = DoctorService::new(clinic.doctors.clone());
    doctors
        .update_location(clinic.doctor_id, MAIN_CLINIC, UpdateLocationRequest {
            active_days: Some(vec![chrono::Weekday::Mon, chrono::Weekday::Tue]),
            ..Default::default()
        })
        .await
        .unwrap();

    let availability = clinic.state.availability_service();

    // day(0) is a Sunday, day(1) a Monday
    let sunday = availability.resolve_availability(clinic.doctor_id, MAIN_CLINIC, day(0)).await.unwrap();
    let monday = availability.resolve_availability(clinic.doctor_id, MAIN_CLINIC, day(1)).await.unwrap();
    assert!(sunday.is_empty());
    assert_eq!(monday.len(), 16);
}

#[tokio::test]
async fn test_availability_is_idempotent() {
    let clinic = setup().await;
    seed(&clinic, day(2), "13:00", AppointmentStatus::Pending, AppointmentSource::Manual).await;
    seed(&clinic, day(2), "13:30", AppointmentStatus::Cancelled, AppointmentSource::Manual).await;

    let availability = clinic.state.availability_service();
    let first = availability.resolve_availability(clinic.doctor_id, MAIN_CLINIC, day(2)).await.unwrap();
    let second = availability.resolve_availability(clinic.doctor_id, MAIN_CLINIC, day(2)).await.unwrap();

    assert_eq!(first, second);
    let booked: Vec<String> = first.iter().filter(|s| s.is_booked).map(|s| s.time.to_string()).collect();
    assert_eq!(booked, vec!["13:00"]);
}

/// Patient store whose back-reference writes always fail.
struct BrokenRefs(InMemoryPatientStore);

#[async_trait]
impl PatientStore for BrokenRefs {
    async fn get_patient(&self, patient_id: Uuid) -> Result<Option<Patient>, DatabaseError> {
        self.0.get_patient(patient_id).await
    }

    async fn find_patient_by_email(&self, email: &str) -> Result<Option<Patient>, DatabaseError> {
        self.0.find_patient_by_email(email).await
    }

    async fn create_patient(&self, patient: &Patient) -> Result<Patient, DatabaseError> {
        self.0.create_patient(patient).await
    }

    async fn add_appointment_ref(&self, _: Uuid, _: Uuid) -> Result<(), DatabaseError> {
        Err(DatabaseError::Api { status: 503, message: "unavailable".to_string() })
    }

    async fn remove_appointment_ref(&self, _: Uuid, _: Uuid) -> Result<(), DatabaseError> {
        Err(DatabaseError::Api { status: 503, message: "unavailable".to_string() })
    }
}

#[tokio::test]
async fn test_failed_linking_rolls_back_the_booking() {
    let clinic = setup_with_patients(Arc::new(BrokenRefs(InMemoryPatientStore::new()))).await;

    let result = clinic
        .state
        .booking_service()
        .book_appointment(booking(&clinic, day(2), "09:00"), BookingChannel::Direct)
        .await;
    assert_matches!(result, Err(AppointmentError::BackReference { .. }));

    let remaining = clinic
        .appointments
        .count_appointments(&AppointmentQuery::for_doctor(clinic.doctor_id))
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let doctor = clinic.doctors.get_doctor(clinic.doctor_id).await.unwrap().unwrap();
    assert!(doctor.appointments.is_empty());
}
