use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers;
use crate::store::DoctorStore;

pub struct DoctorState {
    pub doctors: Arc<dyn DoctorStore>,
}

impl DoctorState {
    pub fn new(doctors: Arc<dyn DoctorStore>) -> Self {
        Self { doctors }
    }
}

pub fn doctor_routes(state: Arc<DoctorState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_doctor))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route(
            "/{doctor_id}/locations",
            get(handlers::list_locations).post(handlers::add_location),
        )
        .route(
            "/{doctor_id}/locations/{location_name}",
            put(handlers::update_location).delete(handlers::remove_location),
        )
        .with_state(state)
}
