use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{
    Collection, LikeOutcome, NewCollection, NewComment, RatingSummary, ResourceDetail,
    ResourceDraft, ResourceFilter, ResourceView,
};
use super::repository::ResourceRepository;
use super::service::ResourceService;
use crate::auth::Actor;
use crate::error::AppError;
use crate::ids::{CollectionId, ResourceId};
use crate::local_now;

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub score: u8,
}

#[derive(Debug, Deserialize)]
pub struct CollectionItem {
    pub resource: ResourceId,
}

pub fn resource_router<R>(service: Arc<ResourceService<R>>) -> Router
where
    R: ResourceRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/resources",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/resources/:resource_id", get(detail_handler::<R>))
        .route(
            "/api/v1/resources/:resource_id/like",
            post(like_handler::<R>),
        )
        .route(
            "/api/v1/resources/:resource_id/ratings",
            post(rate_handler::<R>),
        )
        .route(
            "/api/v1/resources/:resource_id/comments",
            post(comment_handler::<R>),
        )
        .route(
            "/api/v1/collections",
            get(collections_handler::<R>).post(create_collection_handler::<R>),
        )
        .route(
            "/api/v1/collections/:collection_id/items",
            post(add_item_handler::<R>),
        )
        .route(
            "/api/v1/collections/:collection_id/items/:resource_id",
            delete(remove_item_handler::<R>),
        )
        .with_state(service)
}

async fn list_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Option<Actor>,
    Query(filter): Query<ResourceFilter>,
) -> Result<Json<Vec<ResourceView>>, AppError>
where
    R: ResourceRepository + 'static,
{
    Ok(Json(service.list(actor.as_ref(), &filter)?))
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
    Json(draft): Json<ResourceDraft>,
) -> Result<Response, AppError>
where
    R: ResourceRepository + 'static,
{
    let resource = service.create(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(resource)).into_response())
}

async fn detail_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Option<Actor>,
    Path(resource_id): Path<ResourceId>,
) -> Result<Json<ResourceDetail>, AppError>
where
    R: ResourceRepository + 'static,
{
    Ok(Json(service.view(actor.as_ref(), &resource_id)?))
}

pub(crate) async fn like_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
    Path(resource_id): Path<ResourceId>,
) -> Result<Json<LikeOutcome>, AppError>
where
    R: ResourceRepository + 'static,
{
    Ok(Json(service.toggle_like(&actor, &resource_id)?))
}

async fn rate_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
    Path(resource_id): Path<ResourceId>,
    Json(request): Json<RatingRequest>,
) -> Result<Json<RatingSummary>, AppError>
where
    R: ResourceRepository + 'static,
{
    Ok(Json(service.rate(&actor, &resource_id, request.score)?))
}

async fn comment_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
    Path(resource_id): Path<ResourceId>,
    Json(draft): Json<NewComment>,
) -> Result<Response, AppError>
where
    R: ResourceRepository + 'static,
{
    let comment = service.comment(&actor, &resource_id, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

async fn collections_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
) -> Result<Json<Vec<Collection>>, AppError>
where
    R: ResourceRepository + 'static,
{
    Ok(Json(service.collections_for(&actor)?))
}

async fn create_collection_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
    Json(draft): Json<NewCollection>,
) -> Result<Response, AppError>
where
    R: ResourceRepository + 'static,
{
    let collection = service.create_collection(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(collection)).into_response())
}

async fn add_item_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
    Path(collection_id): Path<CollectionId>,
    Json(item): Json<CollectionItem>,
) -> Result<Json<Collection>, AppError>
where
    R: ResourceRepository + 'static,
{
    Ok(Json(service.add_to_collection(
        &actor,
        &collection_id,
        &item.resource,
    )?))
}

async fn remove_item_handler<R>(
    State(service): State<Arc<ResourceService<R>>>,
    actor: Actor,
    Path((collection_id, resource_id)): Path<(CollectionId, ResourceId)>,
) -> Result<Json<Collection>, AppError>
where
    R: ResourceRepository + 'static,
{
    Ok(Json(service.remove_from_collection(
        &actor,
        &collection_id,
        &resource_id,
    )?))
}
