// libs/appointment-cell/tests/router_test.rs

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::handlers::SchedulingState;
use appointment_cell::router::{appointment_routes, schedule_routes};

use common::*;

fn app(start: NaiveDate) -> Router {
    let state = Arc::new(SchedulingState {
        booking: service_with(vec![], registry_from(start, 7)),
    });

    Router::new()
        .nest("/schedule", schedule_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn booking_body(date: NaiveDate, hm: &str, room: &str, therapist: &str) -> Value {
    json!({
        "date": date.to_string(),
        "time": hm,
        "roomNumber": room,
        "therapist_ids": [therapist],
        "client_id": "p1"
    })
}

#[tokio::test]
async fn test_matrix_route() {
    let date = upcoming_tuesday();
    let app = app(date);

    let (status, body) = send(&app, "GET", &format!("/schedule/matrix?date={}", date), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"].as_array().unwrap().len(), 3);
    assert_eq!(body["rooms"][0]["cells"].as_array().unwrap().len(), 9);
    assert_eq!(body["rooms"][0]["cells"][0]["slot"], "07:00");
    assert_eq!(body["rooms"][0]["cells"][0]["is_room_available"], true);

    let (status, body) = send(&app, "GET", "/schedule/matrix?date=20-05-2025", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_booking_flow() {
    let date = upcoming_tuesday();
    let app = app(date);

    let (status, body) = send(&app, "POST", "/appointments", Some(booking_body(date, "09:00", "r1", "t1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let id = body["appointment"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", "/appointments", Some(booking_body(date, "09:00", "r1", "t2"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let candidate = json!({
        "therapistIds": ["t1"],
        "roomNumber": "r2",
        "date": date.to_string(),
        "slot": "09:00"
    });
    let (status, body) = send(&app, "POST", "/schedule/can-book", Some(candidate)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["can_book"], false);

    let (_, body) = send(&app, "GET", &format!("/appointments?from={}&to={}", date, date), None).await;
    assert_eq!(body["total"], 1);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/appointments/{}/reschedule", id),
        Some(json!({ "slot": "10:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["slot"], "10:00");

    let (status, body) = send(&app, "POST", &format!("/appointments/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "cancelled");

    let (status, _) = send(&app, "POST", &format!("/appointments/{}/cancel", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_rejections_map_to_status_codes() {
    let date = upcoming_tuesday();
    let app = app(date);
    let sunday = date + Duration::days(5);

    let (status, _) = send(&app, "POST", "/appointments", Some(booking_body(sunday, "09:00", "r1", "t1"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "POST", "/appointments", Some(booking_body(date, "09:00", "r9", "t1"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/appointments", Some(booking_body(date, "13:00", "r1", "t1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PATCH",
        "/appointments/6f1c1a52-2f55-4d2e-9a4f-3c2b1c0e9d11/reschedule",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_alternatives_and_recurring_routes() {
    let date = upcoming_tuesday();
    let app = app(date);
    let wednesday = date + Duration::days(1);

    let (status, _) = send(&app, "POST", "/appointments", Some(booking_body(wednesday, "09:00", "r1", "t2"))).await;
    assert_eq!(status, StatusCode::OK);

    let request = json!({
        "start_date": date.to_string(),
        "duration": { "kind": "preset", "days": 3 },
        "slot": "09:00",
        "selected_therapists": ["t1"],
        "roomNumber": "r1",
        "patient_id": "p1"
    });

    let (status, body) = send(&app, "POST", "/schedule/alternatives", Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"], 3);
    assert_eq!(body["results"][date.to_string()]["available"], true);
    let conflicted = &body["results"][wednesday.to_string()];
    assert_eq!(conflicted["available"], false);
    assert_eq!(conflicted["reason"], "Selected Room is not available");
    assert_eq!(conflicted["alternatives"][0], json!({ "slot": "09:00", "roomNumber": "r2" }));

    let (status, body) = send(&app, "POST", "/appointments/recurring", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booked"].as_array().unwrap().len(), 2);
    assert_eq!(body["skipped"][0]["date"], wednesday.to_string());
}

#[tokio::test]
async fn test_request_dates_must_be_plain_calendar_dates() {
    let date = upcoming_tuesday();
    let app = app(date);

    let request = json!({
        "start_date": "+262142-12-31",
        "duration": { "kind": "preset", "days": 3 },
        "slot": "09:00",
        "selected_therapists": ["t1"],
        "roomNumber": "r1",
        "patient_id": "p1"
    });
    let (status, _) = send(&app, "POST", "/schedule/alternatives", Some(request)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut body = booking_body(date, "09:00", "r1", "t1");
    body["date"] = json!("2025-5-20");
    let (status, _) = send(&app, "POST", "/appointments", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
