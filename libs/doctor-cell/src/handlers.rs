use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::{parse_id, AppError};

use crate::models::{CreateDoctorRequest, Doctor, Location, UpdateLocationRequest};
use crate::router::DoctorState;
use crate::services::doctor::DoctorService;

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<DoctorState>>,
    payload: Result<Json<CreateDoctorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    let Json(request) = payload?;
    let doctor_service = DoctorService::new(state.doctors.clone());

    let doctor = doctor_service.create_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DoctorState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;
    let doctor_service = DoctorService::new(state.doctors.clone());

    let doctor = doctor_service.get_doctor(doctor_id).await?;

    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn list_locations(
    State(state): State<Arc<DoctorState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;
    let doctor_service = DoctorService::new(state.doctors.clone());

    let locations = doctor_service.list_locations(doctor_id).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "locations": locations,
        "total": locations.len()
    })))
}

#[axum::debug_handler]
pub async fn add_location(
    State(state): State<Arc<DoctorState>>,
    Path(doctor_id): Path<String>,
    payload: Result<Json<Location>, JsonRejection>,
) -> Result<(StatusCode, Json<Location>), AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;
    let Json(location) = payload?;
    let doctor_service = DoctorService::new(state.doctors.clone());

    let location = doctor_service.add_location(doctor_id, location).await?;

    Ok((StatusCode::CREATED, Json(location)))
}

#[axum::debug_handler]
pub async fn update_location(
    State(state): State<Arc<DoctorState>>,
    Path((doctor_id, location_name)): Path<(String, String)>,
    payload: Result<Json<UpdateLocationRequest>, JsonRejection>,
) -> Result<Json<Location>, AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;
    let Json(request) = payload?;
    let doctor_service = DoctorService::new(state.doctors.clone());

    let location = doctor_service.update_location(doctor_id, &location_name, request).await?;

    Ok(Json(location))
}

#[axum::debug_handler]
pub async fn remove_location(
    State(state): State<Arc<DoctorState>>,
    Path((doctor_id, location_name)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;
    let doctor_service = DoctorService::new(state.doctors.clone());

    doctor_service.remove_location(doctor_id, &location_name).await?;

    Ok(StatusCode::NO_CONTENT)
}
