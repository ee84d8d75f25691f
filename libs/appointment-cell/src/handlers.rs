use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use shared_models::{parse_id, AppError, PageQuery};

use crate::models::{
    Appointment, AppointmentPage, AvailabilityQuery, AvailabilityResponse, BookAppointmentRequest,
    DoctorDashboard, UpdateAppointmentRequest,
};
use crate::router::AppointmentState;
use crate::services::BookingChannel;

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppointmentState>>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let Query(query) = query?;
    let doctor_id = parse_id("doctor", &query.doctor_id)?;

    let time_slots = state
        .availability_service()
        .resolve_availability(doctor_id, &query.location, query.date)
        .await?;

    Ok(Json(AvailabilityResponse {
        doctor_id,
        location: query.location,
        date: query.date,
        time_slots,
    }))
}

/// Patient-facing booking, confirmed immediately.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppointmentState>>,
    payload: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let Json(request) = payload?;

    let appointment = state
        .booking_service()
        .book_appointment(request, BookingChannel::Direct)
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Staff-created appointment, pending until confirmed.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppointmentState>>,
    payload: Result<Json<BookAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let Json(request) = payload?;

    let appointment = state
        .booking_service()
        .book_appointment(request, BookingChannel::Staff)
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_id("appointment", &appointment_id)?;

    let appointment = state.booking_service().get_appointment(appointment_id).await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
    payload: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_id("appointment", &appointment_id)?;
    let Json(request) = payload?;

    let appointment = state
        .booking_service()
        .update_appointment(appointment_id, request)
        .await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_id("appointment", &appointment_id)?;

    let appointment = state.booking_service().complete_appointment(appointment_id).await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_id("appointment", &appointment_id)?;

    let appointment = state.booking_service().cancel_appointment(appointment_id).await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppointmentState>>,
    Path(appointment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let appointment_id = parse_id("appointment", &appointment_id)?;

    state.booking_service().delete_appointment(appointment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn get_upcoming_appointments(
    State(state): State<Arc<AppointmentState>>,
    Path(doctor_id): Path<String>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<AppointmentPage>, AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;
    let Query(page) = page?;

    let result = state
        .listing_service()
        .upcoming_for_doctor(doctor_id, page.parse()?)
        .await?;

    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn get_shared_bookings(
    State(state): State<Arc<AppointmentState>>,
    Path(doctor_id): Path<String>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<AppointmentPage>, AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;
    let Query(page) = page?;

    let result = state
        .listing_service()
        .shared_bookings(doctor_id, page.parse()?)
        .await?;

    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn get_doctor_dashboard(
    State(state): State<Arc<AppointmentState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<DoctorDashboard>, AppError> {
    let doctor_id = parse_id("doctor", &doctor_id)?;

    let dashboard = state.dashboard_service().doctor_dashboard(doctor_id).await?;

    Ok(Json(dashboard))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppointmentState>>,
    Path(patient_id): Path<String>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<AppointmentPage>, AppError> {
    let patient_id = parse_id("patient", &patient_id)?;
    let Query(page) = page?;

    let result = state
        .listing_service()
        .patient_history(patient_id, page.parse()?)
        .await?;

    Ok(Json(result))
}
