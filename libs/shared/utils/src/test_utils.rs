use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, StoreBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            store_backend: StoreBackend::Supabase,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

/// Canned PostgREST rows shaped like the `doctors`, `patients` and
/// `appointments` tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn location(name: &str, start_time: &str, end_time: &str, slot_duration_minutes: Option<u32>) -> Value {
        json!({
            "name": name,
            "start_time": start_time,
            "end_time": end_time,
            "slot_duration_minutes": slot_duration_minutes,
            "active_days": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        })
    }

    pub fn doctor_response(doctor_id: &str, locations: Vec<Value>) -> Value {
        json!({
            "id": doctor_id,
            "first_name": "Test",
            "last_name": "Doctor",
            "email": "doctor@example.com",
            "specialty": "General Practice",
            "locations": locations,
            "appointments": [],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_response(patient_id: &str) -> Value {
        json!({
            "id": patient_id,
            "first_name": "Test",
            "last_name": "Patient",
            "email": "patient@example.com",
            "phone_number": "+353 1 555 0100",
            "date_of_birth": "1990-01-01",
            "appointments": [],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn appointment_response(
        appointment_id: &str,
        doctor_id: &str,
        patient_id: &str,
        location: &str,
        date: &str,
        time: &str,
        status: &str,
        source: &str,
    ) -> Value {
        json!({
            "id": appointment_id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "location": location,
            "date": date,
            "time": time,
            "appointment_type": "consultation",
            "status": status,
            "source": source,
            "mark_complete": false,
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}
