use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::{DatabaseError, SupabaseClient};
use shared_models::{PageRequest, TimeOfDay};

use crate::models::{Appointment, AppointmentPatch, AppointmentSource, AppointmentStatus};
use crate::services::window::{is_upcoming, LocalMoment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter over appointments. Unset fields match everything; set fields are
/// combined with AND.
#[derive(Debug, Clone, Default)]
pub struct AppointmentQuery {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
    pub status: Option<AppointmentStatus>,
    pub exclude_cancelled: bool,
    pub exclude_source: Option<AppointmentSource>,
    pub exclude_id: Option<Uuid>,
    pub upcoming_from: Option<LocalMoment>,
    pub order: SortOrder,
}

impl AppointmentQuery {
    pub fn for_doctor(doctor_id: Uuid) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            ..Self::default()
        }
    }

    pub fn for_patient(patient_id: Uuid) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Self::default()
        }
    }

    /// Active appointments holding one exact slot.
    pub fn slot(doctor_id: Uuid, location: &str, date: NaiveDate, time: TimeOfDay) -> Self {
        Self {
            doctor_id: Some(doctor_id),
            location: Some(location.to_string()),
            date: Some(date),
            time: Some(time),
            exclude_cancelled: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.location.as_deref().map_or(true, |l| appointment.location == l)
            && self.date.map_or(true, |d| appointment.date == d)
            && self.time.map_or(true, |t| appointment.time == t)
            && self.status.map_or(true, |s| appointment.status == s)
            && (!self.exclude_cancelled || appointment.occupies_slot())
            && self.exclude_source.map_or(true, |s| appointment.source != s)
            && self.exclude_id.map_or(true, |id| appointment.id != id)
            && self
                .upcoming_from
                .as_ref()
                .map_or(true, |now| is_upcoming(appointment.date, appointment.time, now))
    }

    fn compare(&self, a: &Appointment, b: &Appointment) -> Ordering {
        let key = |x: &Appointment| (x.date, x.time, x.created_at, x.id);
        match self.order {
            SortOrder::Ascending => key(a).cmp(&key(b)),
            SortOrder::Descending => key(b).cmp(&key(a)),
        }
    }

    /// PostgREST filter parameters, values percent-encoded.
    pub fn to_filters(&self) -> Vec<String> {
        let mut filters = Vec::new();
        let mut push = |column: &str, value: String| {
            filters.push(format!("{}={}", column, urlencoding::encode(&value)));
        };

        if let Some(id) = self.doctor_id {
            push("doctor_id", format!("eq.{}", id));
        }
        if let Some(id) = self.patient_id {
            push("patient_id", format!("eq.{}", id));
        }
        if let Some(location) = &self.location {
            push("location", format!("eq.{}", location));
        }
        if let Some(date) = self.date {
            push("date", format!("eq.{}", date));
        }
        if let Some(time) = self.time {
            push("time", format!("eq.{}", time));
        }
        match self.status {
            Some(status) => push("status", format!("eq.{}", status)),
            None if self.exclude_cancelled => push("status", format!("neq.{}", AppointmentStatus::Cancelled)),
            None => {}
        }
        if let Some(source) = self.exclude_source {
            push("source", format!("neq.{}", source));
        }
        if let Some(id) = self.exclude_id {
            push("id", format!("neq.{}", id));
        }
        if let Some(now) = &self.upcoming_from {
            // time is stored zero-padded, so text comparison is chronological
            push(
                "or",
                format!("(date.gt.{d},and(date.eq.{d},time.gte.{t}))", d = now.date, t = now.time),
            );
        }

        filters
    }

    fn order_param(&self) -> &'static str {
        match self.order {
            SortOrder::Ascending => "order=date.asc,time.asc,created_at.asc",
            SortOrder::Descending => "order=date.desc,time.desc,created_at.desc",
        }
    }
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_appointments(
        &self,
        query: &AppointmentQuery,
        page: Option<PageRequest>,
    ) -> Result<Vec<Appointment>, DatabaseError>;

    async fn count_appointments(&self, query: &AppointmentQuery) -> Result<u64, DatabaseError>;

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    /// Fails with `DatabaseError::Conflict` when another active appointment
    /// already holds the slot.
    async fn insert_appointment(&self, appointment: &Appointment) -> Result<Appointment, DatabaseError>;

    async fn update_appointment(
        &self,
        appointment_id: Uuid,
        patch: &AppointmentPatch,
    ) -> Result<Appointment, DatabaseError>;

    /// Returns the deleted row; `DatabaseError::NotFound` when there was none.
    async fn delete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, DatabaseError>;
}

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn by_id(appointment_id: Uuid) -> String {
        format!("/rest/v1/appointments?id=eq.{}", appointment_id)
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_appointments(
        &self,
        query: &AppointmentQuery,
        page: Option<PageRequest>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let mut params = query.to_filters();
        params.push(query.order_param().to_string());
        if let Some(page) = page {
            params.push(format!("limit={}", page.limit()));
            params.push(format!("offset={}", page.skip()));
        }

        let path = format!("/rest/v1/appointments?{}", params.join("&"));
        debug!("Querying appointments: {}", path);

        self.supabase.request(Method::GET, &path, None).await
    }

    async fn count_appointments(&self, query: &AppointmentQuery) -> Result<u64, DatabaseError> {
        let mut params = vec!["select=id".to_string()];
        params.extend(query.to_filters());

        let path = format!("/rest/v1/appointments?{}", params.join("&"));
        self.supabase.count(&path).await
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        let result: Vec<Appointment> = self.supabase
            .request(Method::GET, &Self::by_id(appointment_id), None)
            .await?;

        Ok(result.into_iter().next())
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> Result<Appointment, DatabaseError> {
        debug!("Inserting appointment {}", appointment.id);

        let body = serde_json::to_value(appointment)?;
        let result: Vec<Appointment> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::InvalidResponse("insert returned no appointment".to_string()))
    }

    async fn update_appointment(
        &self,
        appointment_id: Uuid,
        patch: &AppointmentPatch,
    ) -> Result<Appointment, DatabaseError> {
        let mut body = serde_json::to_value(patch)?;
        if let Value::Object(map) = &mut body {
            map.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        }

        let result: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &Self::by_id(appointment_id),
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::NotFound(format!("appointment {}", appointment_id)))
    }

    async fn delete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, DatabaseError> {
        let result: Vec<Appointment> = self.supabase.request_with_headers(
            Method::DELETE,
            &Self::by_id(appointment_id),
            None,
            Some(SupabaseClient::representation_headers()),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| DatabaseError::NotFound(format!("appointment {}", appointment_id)))
    }
}

/// Process-local store. One lock covers check and write, which gives the
/// same guarantee as the partial unique index on the hosted table.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_holder<'a>(
        appointments: &'a HashMap<Uuid, Appointment>,
        candidate: &Appointment,
    ) -> Option<&'a Appointment> {
        if !candidate.occupies_slot() {
            return None;
        }
        appointments.values().find(|existing| {
            existing.id != candidate.id
                && existing.occupies_slot()
                && existing.doctor_id == candidate.doctor_id
                && existing.location == candidate.location
                && existing.date == candidate.date
                && existing.time == candidate.time
        })
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_appointments(
        &self,
        query: &AppointmentQuery,
        page: Option<PageRequest>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        let appointments = self.appointments.read().await;
        let mut matched: Vec<Appointment> = appointments.values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        matched.sort_by(|a, b| query.compare(a, b));

        Ok(match page {
            Some(page) => matched.into_iter()
                .skip(page.skip() as usize)
                .take(page.limit() as usize)
                .collect(),
            None => matched,
        })
    }

    async fn count_appointments(&self, query: &AppointmentQuery) -> Result<u64, DatabaseError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.values().filter(|a| query.matches(a)).count() as u64)
    }

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        Ok(self.appointments.read().await.get(&appointment_id).cloned())
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.write().await;

        if let Some(holder) = Self::slot_holder(&appointments, appointment) {
            warn!("Slot already held by appointment {}", holder.id);
            return Err(DatabaseError::Conflict(format!(
                "slot {} {} at '{}' is held by appointment {}",
                appointment.date, appointment.time, appointment.location, holder.id
            )));
        }
        if appointments.contains_key(&appointment.id) {
            return Err(DatabaseError::Conflict(format!("appointment {} already exists", appointment.id)));
        }

        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment.clone())
    }

    async fn update_appointment(
        &self,
        appointment_id: Uuid,
        patch: &AppointmentPatch,
    ) -> Result<Appointment, DatabaseError> {
        let mut appointments = self.appointments.write().await;

        let mut updated = appointments.get(&appointment_id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("appointment {}", appointment_id)))?;
        patch.apply_to(&mut updated);
        updated.updated_at = Utc::now();

        if let Some(holder) = Self::slot_holder(&appointments, &updated) {
            return Err(DatabaseError::Conflict(format!(
                "slot {} {} at '{}' is held by appointment {}",
                updated.date, updated.time, updated.location, holder.id
            )));
        }

        appointments.insert(appointment_id, updated.clone());
        Ok(updated)
    }

    async fn delete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, DatabaseError> {
        self.appointments.write().await
            .remove(&appointment_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("appointment {}", appointment_id)))
    }
}
