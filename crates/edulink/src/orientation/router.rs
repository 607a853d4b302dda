use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::domain::{Assessment, AssessmentDraft, Attempt, AttemptSubmission, Recommendation};
use super::repository::OrientationRepository;
use super::service::OrientationService;
use crate::auth::Actor;
use crate::error::AppError;
use crate::ids::AssessmentId;
use crate::local_now;

#[derive(Debug, Serialize)]
pub struct AttemptHistory {
    pub attempts: Vec<Attempt>,
    pub latest_recommendations: Vec<Recommendation>,
}

pub fn orientation_router<R>(service: Arc<OrientationService<R>>) -> Router
where
    R: OrientationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/orientation/assessments",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/v1/orientation/assessments/:assessment_id/publish",
            post(publish_handler::<R>),
        )
        .route(
            "/api/v1/orientation/assessments/:assessment_id/attempts",
            post(attempt_handler::<R>),
        )
        .route("/api/v1/orientation/attempts", get(history_handler::<R>))
        .with_state(service)
}

async fn list_handler<R>(
    State(service): State<Arc<OrientationService<R>>>,
    actor: Actor,
) -> Result<Json<Vec<Assessment>>, AppError>
where
    R: OrientationRepository + 'static,
{
    Ok(Json(service.list(&actor)?))
}

async fn create_handler<R>(
    State(service): State<Arc<OrientationService<R>>>,
    actor: Actor,
    Json(draft): Json<AssessmentDraft>,
) -> Result<Response, AppError>
where
    R: OrientationRepository + 'static,
{
    let assessment = service.create_assessment(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(assessment)).into_response())
}

async fn publish_handler<R>(
    State(service): State<Arc<OrientationService<R>>>,
    actor: Actor,
    Path(assessment_id): Path<AssessmentId>,
) -> Result<Json<Assessment>, AppError>
where
    R: OrientationRepository + 'static,
{
    Ok(Json(service.publish(&actor, &assessment_id)?))
}

pub(crate) async fn attempt_handler<R>(
    State(service): State<Arc<OrientationService<R>>>,
    actor: Actor,
    Path(assessment_id): Path<AssessmentId>,
    Json(submission): Json<AttemptSubmission>,
) -> Result<Response, AppError>
where
    R: OrientationRepository + 'static,
{
    let attempt = service.submit_attempt(&actor, &assessment_id, submission, local_now())?;
    Ok((StatusCode::CREATED, Json(attempt)).into_response())
}

async fn history_handler<R>(
    State(service): State<Arc<OrientationService<R>>>,
    actor: Actor,
) -> Result<Json<AttemptHistory>, AppError>
where
    R: OrientationRepository + 'static,
{
    let attempts = service.attempts_for(&actor)?;
    let latest_recommendations = attempts
        .first()
        .map(|attempt| attempt.recommendations.clone())
        .unwrap_or_default();
    Ok(Json(AttemptHistory {
        attempts,
        latest_recommendations,
    }))
}
