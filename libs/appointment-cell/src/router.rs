use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use doctor_cell::store::DoctorStore;
use patient_cell::store::PatientStore;
use shared_utils::Clock;

use crate::handlers;
use crate::services::{
    AppointmentBookingService, AppointmentListingService, AvailabilityService, DashboardService,
};
use crate::store::AppointmentStore;

pub struct AppointmentState {
    pub appointments: Arc<dyn AppointmentStore>,
    pub doctors: Arc<dyn DoctorStore>,
    pub patients: Arc<dyn PatientStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppointmentState {
    pub fn booking_service(&self) -> AppointmentBookingService {
        AppointmentBookingService::new(self.appointments.clone(), self.doctors.clone(), self.patients.clone())
    }

    pub fn availability_service(&self) -> AvailabilityService {
        AvailabilityService::new(self.appointments.clone(), self.doctors.clone())
    }

    pub fn listing_service(&self) -> AppointmentListingService {
        AppointmentListingService::new(
            self.appointments.clone(),
            self.doctors.clone(),
            self.patients.clone(),
            self.clock.clone(),
        )
    }

    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(self.appointments.clone(), self.doctors.clone(), self.clock.clone())
    }
}

pub fn appointment_routes(state: Arc<AppointmentState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/book", post(handlers::book_appointment))
        .route("/availability", get(handlers::get_availability))
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .patch(handlers::update_appointment)
                .delete(handlers::delete_appointment),
        )
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))

        // Listings
        .route("/doctors/{doctor_id}/upcoming", get(handlers::get_upcoming_appointments))
        .route("/doctors/{doctor_id}/shared", get(handlers::get_shared_bookings))
        .route("/doctors/{doctor_id}/dashboard", get(handlers::get_doctor_dashboard))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .with_state(state)
}
