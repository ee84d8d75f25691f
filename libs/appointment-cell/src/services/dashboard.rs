use std::sync::Arc;

use uuid::Uuid;

use doctor_cell::services::DoctorService;
use doctor_cell::store::DoctorStore;
use shared_models::PageRequest;
use shared_utils::Clock;

use crate::models::{AppointmentError, AppointmentSource, AppointmentStatus, DoctorDashboard};
use crate::services::window::LocalMoment;
use crate::store::{AppointmentQuery, AppointmentStore, SortOrder};

pub struct DashboardService {
    appointments: Arc<dyn AppointmentStore>,
    doctors: DoctorService,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        doctors: Arc<dyn DoctorStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            doctors: DoctorService::new(doctors),
            clock,
        }
    }

    pub async fn doctor_dashboard(&self, doctor_id: Uuid) -> Result<DoctorDashboard, AppointmentError> {
        self.doctors.get_doctor(doctor_id).await?;

        let now = LocalMoment::now(self.clock.as_ref());
        let all = AppointmentQuery::for_doctor(doctor_id);
        let by_status = |status| AppointmentQuery {
            status: Some(status),
            ..all.clone()
        };

        let today_query = AppointmentQuery { date: Some(now.date), ..all.clone() };
        // cancelled bookings no longer count as coming up
        let upcoming_query = AppointmentQuery {
            upcoming_from: Some(now),
            exclude_cancelled: true,
            order: SortOrder::Ascending,
            ..all.clone()
        };
        let shared_query = AppointmentQuery {
            exclude_source: Some(AppointmentSource::Manual),
            ..all.clone()
        };
        let pending_query = by_status(AppointmentStatus::Pending);
        let confirmed_query = by_status(AppointmentStatus::Confirmed);
        let completed_query = by_status(AppointmentStatus::Completed);
        let cancelled_query = by_status(AppointmentStatus::Cancelled);

        let store = &self.appointments;
        let (total, today, upcoming, pending, confirmed, completed, cancelled, shared_bookings, next) = futures::try_join!(
            store.count_appointments(&all),
            store.count_appointments(&today_query),
            store.count_appointments(&upcoming_query),
            store.count_appointments(&pending_query),
            store.count_appointments(&confirmed_query),
            store.count_appointments(&completed_query),
            store.count_appointments(&cancelled_query),
            store.count_appointments(&shared_query),
            store.find_appointments(&upcoming_query, Some(PageRequest::single())),
        )?;

        Ok(DoctorDashboard {
            doctor_id,
            total,
            today,
            upcoming,
            pending,
            confirmed,
            completed,
            cancelled,
            shared_bookings,
            next_appointment: next.into_iter().next(),
        })
    }
}
