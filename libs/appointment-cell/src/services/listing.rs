use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use doctor_cell::services::DoctorService;
use doctor_cell::store::DoctorStore;
use patient_cell::services::PatientService;
use patient_cell::store::PatientStore;
use shared_models::{PageRequest, Pagination};
use shared_utils::Clock;

use crate::models::{AppointmentError, AppointmentPage, AppointmentSource};
use crate::services::window::LocalMoment;
use crate::store::{AppointmentQuery, AppointmentStore, SortOrder};

pub struct AppointmentListingService {
    appointments: Arc<dyn AppointmentStore>,
    doctors: DoctorService,
    patients: PatientService,
    clock: Arc<dyn Clock>,
}

impl AppointmentListingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        doctors: Arc<dyn DoctorStore>,
        patients: Arc<dyn PatientStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            doctors: DoctorService::new(doctors),
            patients: PatientService::new(patients),
            clock,
        }
    }

    /// The doctor's appointments from the current minute on, soonest first.
    pub async fn upcoming_for_doctor(
        &self,
        doctor_id: Uuid,
        page: PageRequest,
    ) -> Result<AppointmentPage, AppointmentError> {
        self.doctors.get_doctor(doctor_id).await?;

        let query = AppointmentQuery {
            upcoming_from: Some(LocalMoment::now(self.clock.as_ref())),
            order: SortOrder::Ascending,
            ..AppointmentQuery::for_doctor(doctor_id)
        };

        self.page(&query, page).await
    }

    /// Bookings that did not come in through clinic staff, most recent first.
    pub async fn shared_bookings(
        &self,
        doctor_id: Uuid,
        page: PageRequest,
    ) -> Result<AppointmentPage, AppointmentError> {
        self.doctors.get_doctor(doctor_id).await?;

        let query = AppointmentQuery {
            exclude_source: Some(AppointmentSource::Manual),
            order: SortOrder::Descending,
            ..AppointmentQuery::for_doctor(doctor_id)
        };

        self.page(&query, page).await
    }

    /// Every appointment the patient has had or will have, latest first.
    pub async fn patient_history(
        &self,
        patient_id: Uuid,
        page: PageRequest,
    ) -> Result<AppointmentPage, AppointmentError> {
        self.patients.get_patient(patient_id).await?;

        let query = AppointmentQuery {
            order: SortOrder::Descending,
            ..AppointmentQuery::for_patient(patient_id)
        };

        self.page(&query, page).await
    }

    async fn page(&self, query: &AppointmentQuery, page: PageRequest) -> Result<AppointmentPage, AppointmentError> {
        let (appointments, total_count) = futures::try_join!(
            self.appointments.find_appointments(query, Some(page)),
            self.appointments.count_appointments(query),
        )?;

        debug!(
            "Page {} of {:?}: {} of {} appointments",
            page.page(),
            query.order,
            appointments.len(),
            total_count
        );

        Ok(AppointmentPage {
            appointments,
            pagination: Pagination::new(page, total_count),
        })
    }
}
