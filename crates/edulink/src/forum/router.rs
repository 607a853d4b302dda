use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{Category, Moderation, NewCategory, NewPost, NewTopic, Topic, TopicThread};
use super::repository::ForumRepository;
use super::service::ForumService;
use crate::auth::Actor;
use crate::error::AppError;
use crate::ids::{CategoryId, TopicId};
use crate::local_now;
use crate::notifications::Notifier;

pub fn forum_router<R, N>(service: Arc<ForumService<R, N>>) -> Router
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/forum/categories",
            get(categories_handler::<R, N>).post(create_category_handler::<R, N>),
        )
        .route(
            "/api/v1/forum/categories/:category_id/topics",
            get(topics_handler::<R, N>).post(create_topic_handler::<R, N>),
        )
        .route("/api/v1/forum/topics/:topic_id", get(thread_handler::<R, N>))
        .route(
            "/api/v1/forum/topics/:topic_id/posts",
            post(reply_handler::<R, N>),
        )
        .route(
            "/api/v1/forum/topics/:topic_id/moderation",
            post(moderation_handler::<R, N>),
        )
        .with_state(service)
}

async fn categories_handler<R, N>(
    State(service): State<Arc<ForumService<R, N>>>,
) -> Result<Json<Vec<Category>>, AppError>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.categories()?))
}

async fn create_category_handler<R, N>(
    State(service): State<Arc<ForumService<R, N>>>,
    actor: Actor,
    Json(draft): Json<NewCategory>,
) -> Result<Response, AppError>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    let category = service.create_category(&actor, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(category)).into_response())
}

async fn topics_handler<R, N>(
    State(service): State<Arc<ForumService<R, N>>>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Vec<Topic>>, AppError>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.list_topics(&category_id)?))
}

async fn create_topic_handler<R, N>(
    State(service): State<Arc<ForumService<R, N>>>,
    actor: Actor,
    Path(category_id): Path<CategoryId>,
    Json(draft): Json<NewTopic>,
) -> Result<Response, AppError>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    let thread = service.create_topic(&actor, &category_id, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(thread)).into_response())
}

async fn thread_handler<R, N>(
    State(service): State<Arc<ForumService<R, N>>>,
    Path(topic_id): Path<TopicId>,
) -> Result<Json<TopicThread>, AppError>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.topic_thread(&topic_id)?))
}

pub(crate) async fn reply_handler<R, N>(
    State(service): State<Arc<ForumService<R, N>>>,
    actor: Actor,
    Path(topic_id): Path<TopicId>,
    Json(draft): Json<NewPost>,
) -> Result<Response, AppError>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    let post = service.reply(&actor, &topic_id, draft, local_now())?;
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

async fn moderation_handler<R, N>(
    State(service): State<Arc<ForumService<R, N>>>,
    actor: Actor,
    Path(topic_id): Path<TopicId>,
    Json(moderation): Json<Moderation>,
) -> Result<Json<Topic>, AppError>
where
    R: ForumRepository + 'static,
    N: Notifier + 'static,
{
    Ok(Json(service.moderate(&actor, &topic_id, moderation)?))
}
