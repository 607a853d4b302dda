use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{
    LoginOutcome, PasswordChange, ProfileUpdate, RegistrationRequest, UserView,
    VerificationDecision,
};
use super::repository::AccountRepository;
use super::service::AccountService;
use crate::auth::{bearer_token, Actor, AuthError};
use crate::error::AppError;
use crate::ids::UserId;
use crate::local_now;
use crate::notifications::Notifier;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or e-mail.
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub document: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivityChange {
    pub active: bool,
}

/// Router builder exposing registration, sessions, profiles and verification review.
pub fn account_router<R, N>(service: Arc<AccountService<R, N>>) -> Router
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/auth/register", post(register_handler::<R, N>))
        .route("/api/v1/auth/login", post(login_handler::<R, N>))
        .route("/api/v1/auth/logout", post(logout_handler::<R, N>))
        .route(
            "/api/v1/accounts/me",
            get(profile_handler::<R, N>).patch(update_profile_handler::<R, N>),
        )
        .route(
            "/api/v1/accounts/me/password",
            post(change_password_handler::<R, N>),
        )
        .route(
            "/api/v1/accounts/me/verification",
            post(request_verification_handler::<R, N>),
        )
        .route(
            "/api/v1/accounts/verifications/pending",
            get(pending_handler::<R, N>),
        )
        .route(
            "/api/v1/accounts/:user_id/verification",
            post(decide_verification_handler::<R, N>),
        )
        .route(
            "/api/v1/accounts/:user_id/active",
            post(set_active_handler::<R, N>),
        )
        .with_state(service)
}

pub(crate) async fn register_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    Json(request): Json<RegistrationRequest>,
) -> Result<Response, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let user = service.register(request, local_now())?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

pub(crate) async fn login_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginOutcome>, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let outcome = service.login(&request.login, &request.password)?;
    Ok(Json(outcome))
}

async fn logout_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let token = bearer_token(&headers).ok_or(AuthError::MissingCredentials)?;
    service.logout(token)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn profile_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    actor: Actor,
) -> Result<Json<UserView>, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.profile(&actor)?))
}

async fn update_profile_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    actor: Actor,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserView>, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.update_profile(&actor, update)?))
}

async fn change_password_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    actor: Actor,
    Json(change): Json<PasswordChange>,
) -> Result<StatusCode, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    service.change_password(&actor, change)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn request_verification_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    actor: Actor,
    Json(request): Json<VerificationRequest>,
) -> Result<Json<UserView>, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.request_verification(&actor, request.document)?))
}

async fn pending_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    actor: Actor,
) -> Result<Json<Vec<UserView>>, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.pending_verifications(&actor)?))
}

pub(crate) async fn decide_verification_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    actor: Actor,
    Path(user_id): Path<UserId>,
    Json(decision): Json<VerificationDecision>,
) -> Result<Json<UserView>, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    let user = service.complete_verification(&actor, &user_id, decision, local_now())?;
    Ok(Json(user))
}

async fn set_active_handler<R, N>(
    State(service): State<Arc<AccountService<R, N>>>,
    actor: Actor,
    Path(user_id): Path<UserId>,
    Json(change): Json<ActivityChange>,
) -> Result<Json<UserView>, AppError>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.set_active(&actor, &user_id, change.active)?))
}
