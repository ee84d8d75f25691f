use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use shared_models::{parse_id, AppError};

use crate::models::{CreatePatientRequest, Patient};
use crate::router::PatientState;
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<PatientState>>,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), AppError> {
    let Json(request) = payload?;
    let patient_service = PatientService::new(state.patients.clone());

    let patient = patient_service.create_patient(request).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<PatientState>>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, AppError> {
    let patient_id = parse_id("patient", &id)?;
    let patient_service = PatientService::new(state.patients.clone());

    let patient = patient_service.get_patient(patient_id).await?;

    Ok(Json(patient))
}
