use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::domain::{
    Appointment, AppointmentRequest, AppointmentSlot, AppointmentStatus, AvailableSlot,
    CancelRequest, ExceptionDraft, NextAvailable, RescheduleRequest, SlotDraft,
};
use super::repository::AppointmentRepository;
use super::service::AppointmentService;
use crate::accounts::AccountRepository;
use crate::auth::Actor;
use crate::error::AppError;
use crate::ids::{AppointmentId, SlotId, UserId};
use crate::local_now;
use crate::notifications::Notifier;

#[derive(Debug, Default, Deserialize)]
pub struct SlotQuery {
    #[serde(default)]
    pub owner: Option<UserId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextAvailableQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub horizon_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQuery {
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

type Shared<R, U, N> = State<Arc<AppointmentService<R, U, N>>>;

pub fn appointment_router<R, U, N>(service: Arc<AppointmentService<R, U, N>>) -> Router
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/appointments/slots",
            get(slots_handler::<R, U, N>).post(create_slot_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/slots/:slot_id",
            delete(delete_slot_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/exceptions",
            post(exception_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/availability/:user_id",
            get(availability_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/availability/:user_id/next",
            get(next_available_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments",
            get(list_handler::<R, U, N>).post(request_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/:appointment_id",
            get(detail_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/:appointment_id/confirm",
            post(confirm_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/:appointment_id/cancel",
            post(cancel_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/:appointment_id/complete",
            post(complete_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/:appointment_id/no-show",
            post(no_show_handler::<R, U, N>),
        )
        .route(
            "/api/v1/appointments/:appointment_id/reschedule",
            post(reschedule_handler::<R, U, N>),
        )
        .with_state(service)
}

async fn slots_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<AppointmentSlot>>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let owner = query.owner.unwrap_or(actor.user_id);
    Ok(Json(service.slots_for(&actor, &owner)?))
}

pub(crate) async fn create_slot_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Json(draft): Json<SlotDraft>,
) -> Result<Response, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let slot = service.create_slot(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(slot)).into_response())
}

async fn delete_slot_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Path(slot_id): Path<SlotId>,
) -> Result<StatusCode, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    service.deactivate_slot(&actor, &slot_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn exception_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Json(draft): Json<ExceptionDraft>,
) -> Result<Response, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let exception = service.add_exception(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(exception)).into_response())
}

pub(crate) async fn availability_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    Path(user_id): Path<UserId>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<AvailableSlot>>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let now = local_now();
    let date = query.date.unwrap_or_else(|| now.date());
    Ok(Json(service.availability(&user_id, date, now)?))
}

async fn next_available_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    Path(user_id): Path<UserId>,
    Query(query): Query<NextAvailableQuery>,
) -> Result<Json<Option<NextAvailable>>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let next = service.next_available(&user_id, query.from, query.horizon_days, local_now())?;
    Ok(Json(next))
}

async fn list_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Vec<Appointment>>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.list_for(&actor, query.status)?))
}

pub(crate) async fn request_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Json(request): Json<AppointmentRequest>,
) -> Result<Response, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let appointment = service.request(&actor, request, local_now())?;
    Ok((StatusCode::CREATED, Json(appointment)).into_response())
}

async fn detail_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Appointment>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.get(&actor, &appointment_id)?))
}

async fn confirm_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Appointment>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.confirm(&actor, &appointment_id, local_now())?))
}

pub(crate) async fn cancel_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Path(appointment_id): Path<AppointmentId>,
    body: Option<Json<CancelRequest>>,
) -> Result<Json<Appointment>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let reason = body.and_then(|Json(request)| request.reason);
    Ok(Json(service.cancel(&actor, &appointment_id, reason, local_now())?))
}

async fn complete_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Appointment>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.complete(&actor, &appointment_id, local_now())?))
}

async fn no_show_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Appointment>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.mark_no_show(&actor, &appointment_id, local_now())?))
}

async fn reschedule_handler<R, U, N>(
    State(service): Shared<R, U, N>,
    actor: Actor,
    Path(appointment_id): Path<AppointmentId>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Appointment>, AppError>
where
    R: AppointmentRepository + 'static,
    U: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.reschedule(&actor, &appointment_id, request, local_now())?))
}
