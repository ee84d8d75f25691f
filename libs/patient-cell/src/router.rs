use std::sync::Arc;
use axum::{routing::{get, post}, Router};

use crate::handlers::*;
use crate::store::PatientStore;

pub struct PatientState {
    pub patients: Arc<dyn PatientStore>,
}

impl PatientState {
    pub fn new(patients: Arc<dyn PatientStore>) -> Self {
        Self { patients }
    }
}

pub fn create_patient_router(state: Arc<PatientState>) -> Router {
    Router::new()
        .route("/", post(create_patient))
        .route("/{id}", get(get_patient))
        .with_state(state)
}
