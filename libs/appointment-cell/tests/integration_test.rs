mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::router::appointment_routes;

use common::{day, setup, TestClinic, MAIN_CLINIC};

fn create_test_app(clinic: &TestClinic) -> Router {
    appointment_routes(clinic.state.clone())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn booking_body(clinic: &TestClinic, time: &str) -> Value {
    json!({
        "doctor_id": clinic.doctor_id,
        "patient_id": clinic.patient_id,
        "location": MAIN_CLINIC,
        "date": day(2).to_string(),
        "time": time,
        "appointment_type": "follow_up"
    })
}

fn availability_uri(clinic: &TestClinic) -> String {
    format!(
        "/availability?doctor_id={}&location=Main%20Clinic&date={}",
        clinic.doctor_id,
        day(2)
    )
}

#[tokio::test]
async fn test_book_then_conflict_then_availability() {
    let clinic = setup().await;
    let app = create_test_app(&clinic);

    let (status, created) = send(&app, "POST", "/book", Some(booking_body(&clinic, "09:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "confirmed");
    assert_eq!(created["source"], "public_booking");
    assert_eq!(created["time"], "09:00");
    assert_eq!(created["appointment_type"], "follow_up");

    let (status, body) = send(&app, "POST", "/book", Some(booking_body(&clinic, "09:00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already booked"));

    let (status, availability) = send(&app, "GET", &availability_uri(&clinic), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(availability["doctor_id"], clinic.doctor_id.to_string());
    assert_eq!(availability["location"], MAIN_CLINIC);
    assert_eq!(availability["date"], day(2).to_string());

    let slots = availability["time_slots"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0], json!({ "time": "09:00", "is_booked": true }));
    assert_eq!(slots[1], json!({ "time": "09:30", "is_booked": false }));
    assert_eq!(slots[15]["time"], "16:30");
}

#[tokio::test]
async fn test_staff_created_appointment_lifecycle() {
    let clinic = setup().await;
    let app = create_test_app(&clinic);

    let (status, created) = send(&app, "POST", "/", Some(booking_body(&clinic, "11:00"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["source"], "manual");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/{}", id),
        Some(json!({ "status": "Confirmed", "time": "11:30" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "confirmed");
    assert_eq!(updated["time"], "11:30");

    let (status, completed) = send(&app, "POST", &format!("/{}/complete", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["mark_complete"], true);
    assert_eq!(completed["status"], "completed");

    let (status, _) = send(&app, "POST", &format!("/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "DELETE", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_endpoints_paginate() {
    let clinic = setup().await;
    let app = create_test_app(&clinic);

    for time in ["09:00", "09:30", "10:00"] {
        let (status, _) = send(&app, "POST", "/book", Some(booking_body(&clinic, time))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(
        &app,
        "GET",
        &format!("/doctors/{}/upcoming?page=2&limit=2", clinic.doctor_id),
        None,
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["appointments"].as_array().unwrap().len(), 1);
    assert_eq!(page["appointments"][0]["time"], "10:00");
    assert_eq!(page["pagination"], json!({ "current_page": 2, "total_pages": 2, "total_count": 3 }));

    let (status, page) = send(&app, "GET", &format!("/patients/{}", clinic.patient_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["appointments"][0]["time"], "10:00");
    assert_eq!(page["pagination"]["total_count"], 3);

    let (status, page) = send(&app, "GET", &format!("/doctors/{}/shared", clinic.doctor_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total_count"], 3);

    let (status, dashboard) = send(&app, "GET", &format!("/doctors/{}/dashboard", clinic.doctor_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["upcoming"], 3);
    assert_eq!(dashboard["confirmed"], 3);
    assert_eq!(dashboard["next_appointment"]["time"], "09:00");
}

#[tokio::test]
async fn test_bad_input_is_rejected() {
    let clinic = setup().await;
    let app = create_test_app(&clinic);
    let upcoming = format!("/doctors/{}/upcoming", clinic.doctor_id);

    for query in ["?page=0", "?limit=-5", "?page=abc", "?limit=101"] {
        let (status, body) = send(&app, "GET", &format!("{}{}", upcoming, query), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {}", query);
        assert!(body["error"].is_string());
    }

    let (status, _) = send(&app, "POST", "/book", Some(json!({ "doctor_id": clinic.doctor_id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/book", Some(booking_body(&clinic, "25:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/availability?doctor_id=nope&location=x&date=2026-10-20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_owners_are_not_found() {
    let clinic = setup().await;
    let app = create_test_app(&clinic);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/availability?doctor_id={}&location=Main%20Clinic&date={}", Uuid::new_v4(), day(1)),
        None,
    ).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/availability?doctor_id={}&location=Nowhere&date={}", clinic.doctor_id, day(1)),
        None,
    ).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Nowhere"));

    let (status, _) = send(&app, "GET", &format!("/patients/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
