use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::render::Artifact;
use super::report::ReportRequest;
use super::repository::ScheduledReportRepository;
use super::schedule::{ScheduleDraft, ScheduledReport};
use super::service::{AnalyticsService, Dashboard, ScheduledRun};
use crate::auth::Actor;
use crate::error::AppError;
use crate::ids::ScheduledReportId;
use crate::local_now;
use crate::notifications::Notifier;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

type Shared<S, N> = State<Arc<AnalyticsService<S, N>>>;

pub fn analytics_router<S, N>(service: Arc<AnalyticsService<S, N>>) -> Router
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/api/v1/reports", post(report_handler::<S, N>))
        .route("/api/v1/reports/dashboard", get(dashboard_handler::<S, N>))
        .route(
            "/api/v1/reports/scheduled",
            get(list_scheduled_handler::<S, N>).post(schedule_handler::<S, N>),
        )
        .route(
            "/api/v1/reports/scheduled/run",
            post(run_due_handler::<S, N>),
        )
        .route(
            "/api/v1/reports/scheduled/:report_id",
            get(scheduled_detail_handler::<S, N>),
        )
        .route(
            "/api/v1/reports/scheduled/:report_id/artifact",
            get(last_artifact_handler::<S, N>),
        )
        .with_state(service)
}

fn artifact_response(artifact: Artifact) -> Response {
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        artifact.bytes,
    )
        .into_response()
}

pub(crate) async fn report_handler<S, N>(
    State(service): Shared<S, N>,
    actor: Actor,
    Json(request): Json<ReportRequest>,
) -> Result<Response, AppError>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    let artifact = service.report(&actor, &request)?;
    Ok(artifact_response(artifact))
}

async fn dashboard_handler<S, N>(
    State(service): Shared<S, N>,
    actor: Actor,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    let today = query.date.unwrap_or_else(|| local_now().date());
    Ok(Json(service.dashboard(&actor, today)?))
}

async fn list_scheduled_handler<S, N>(
    State(service): Shared<S, N>,
    actor: Actor,
) -> Result<Json<Vec<ScheduledReport>>, AppError>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.scheduled_for(&actor)?))
}

pub(crate) async fn schedule_handler<S, N>(
    State(service): Shared<S, N>,
    actor: Actor,
    Json(draft): Json<ScheduleDraft>,
) -> Result<Response, AppError>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    let report = service.schedule(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(report)).into_response())
}

async fn run_due_handler<S, N>(
    State(service): Shared<S, N>,
    actor: Actor,
) -> Result<Json<Vec<ScheduledRun>>, AppError>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.run_due_as(&actor, local_now())?))
}

async fn scheduled_detail_handler<S, N>(
    State(service): Shared<S, N>,
    actor: Actor,
    Path(report_id): Path<ScheduledReportId>,
) -> Result<Json<ScheduledReport>, AppError>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.scheduled(&actor, &report_id)?))
}

async fn last_artifact_handler<S, N>(
    State(service): Shared<S, N>,
    actor: Actor,
    Path(report_id): Path<ScheduledReportId>,
) -> Result<Response, AppError>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    let artifact = service.last_artifact(&actor, &report_id)?;
    Ok(artifact_response(artifact))
}
