use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{NewDepartment, NewProgram, NewReview, NewSchool, School, SchoolDetail, SchoolSearch};
use super::repository::SchoolRepository;
use super::service::SchoolService;
use crate::auth::Actor;
use crate::error::AppError;
use crate::ids::SchoolId;
use crate::local_now;

pub fn school_router<R>(service: Arc<SchoolService<R>>) -> Router
where
    R: SchoolRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/schools",
            get(search_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/schools/:school_id", get(detail_handler::<R>))
        .route(
            "/api/v1/schools/:school_id/departments",
            post(department_handler::<R>),
        )
        .route(
            "/api/v1/schools/:school_id/programs",
            post(program_handler::<R>),
        )
        .route(
            "/api/v1/schools/:school_id/reviews",
            post(review_handler::<R>),
        )
        .with_state(service)
}

async fn search_handler<R>(
    State(service): State<Arc<SchoolService<R>>>,
    Query(filter): Query<SchoolSearch>,
) -> Result<Json<Vec<School>>, AppError>
where
    R: SchoolRepository + 'static,
{
    Ok(Json(service.search(&filter)?))
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<SchoolService<R>>>,
    actor: Actor,
    Json(draft): Json<NewSchool>,
) -> Result<Response, AppError>
where
    R: SchoolRepository + 'static,
{
    let school = service.create_school(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(school)).into_response())
}

async fn detail_handler<R>(
    State(service): State<Arc<SchoolService<R>>>,
    Path(school_id): Path<SchoolId>,
) -> Result<Json<SchoolDetail>, AppError>
where
    R: SchoolRepository + 'static,
{
    Ok(Json(service.school_detail(&school_id)?))
}

async fn department_handler<R>(
    State(service): State<Arc<SchoolService<R>>>,
    actor: Actor,
    Path(school_id): Path<SchoolId>,
    Json(draft): Json<NewDepartment>,
) -> Result<Response, AppError>
where
    R: SchoolRepository + 'static,
{
    let department = service.add_department(&actor, &school_id, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(department)).into_response())
}

async fn program_handler<R>(
    State(service): State<Arc<SchoolService<R>>>,
    actor: Actor,
    Path(school_id): Path<SchoolId>,
    Json(draft): Json<NewProgram>,
) -> Result<Response, AppError>
where
    R: SchoolRepository + 'static,
{
    let program = service.add_program(&actor, &school_id, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(program)).into_response())
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<SchoolService<R>>>,
    actor: Actor,
    Path(school_id): Path<SchoolId>,
    Json(draft): Json<NewReview>,
) -> Result<Response, AppError>
where
    R: SchoolRepository + 'static,
{
    let review = service.add_review(&actor, &school_id, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(review)).into_response())
}
