use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::accounts::{Role, VerificationStatus};
use crate::appointments::appointment_router;
use crate::appointments::router::{availability_handler, cancel_handler, AvailabilityQuery};
use crate::notifications::NotificationCenter;
use crate::store::memory::{MemoryAccounts, MemoryAppointments};
use crate::testing::{read_json_body, request, Sessions};

#[tokio::test]
async fn availability_handler_lists_open_increments() {
    let fixture = build_fixture();
    let response = availability_handler::<MemoryAppointments, MemoryAccounts, NotificationCenter>(
        State(fixture.service),
        Path(fixture.advisor.user_id),
        Query(AvailabilityQuery {
            date: Some(chrono::NaiveDate::from_ymd_opt(2020, 1, 6).expect("valid date")),
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]), "past dates have no availability");
}

#[tokio::test]
async fn cancel_handler_rejects_terminal_appointments() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    let appointment = book(&fixture, &student, 9, 0);
    fixture
        .service
        .cancel(&student, &appointment.id, None, now())
        .expect("cancelled");

    let response = cancel_handler::<MemoryAppointments, MemoryAccounts, NotificationCenter>(
        State(fixture.service),
        student,
        Path(appointment.id),
        None,
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        read_json_body(response).await["error"],
        "cannot cancel an appointment that is cancelled"
    );
}

#[tokio::test]
async fn next_available_refuses_an_oversized_horizon() {
    let fixture = build_fixture();
    let router = appointment_router(fixture.service.clone())
        .layer(Extension(Sessions::new().registry.clone()));

    let uri = format!(
        "/api/v1/appointments/availability/{}/next?horizon_days=100000",
        fixture.advisor.user_id
    );
    let response = router
        .oneshot(request(Method::GET, &uri, None, None))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["fields"].get("horizon_days").is_some(), "{body}");
}

#[tokio::test]
async fn booking_round_trip_over_http() {
    let fixture = build_fixture();
    let sessions = Sessions::new();
    let (_, token) = sessions.enroll(Role::Student, VerificationStatus::Verified);
    let router =
        appointment_router(fixture.service.clone()).layer(Extension(sessions.registry.clone()));

    let slots = format!("/api/v1/appointments/availability/{}", fixture.advisor.user_id);
    let response = router
        .clone()
        .oneshot(request(Method::GET, &format!("{slots}/next"), None, None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/appointments",
            Some(&token),
            Some(json!({
                "recipient": fixture.advisor.user_id,
                "schedule_time": "2031-03-03T09:00:00",
                "duration_minutes": 30,
                "subject": "Scholarship options"
            })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["end_time"], "2031-03-03T09:30:00");

    let response = router
        .oneshot(request(Method::GET, "/api/v1/appointments", None, None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
