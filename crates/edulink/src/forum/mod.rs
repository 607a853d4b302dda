//! Discussion forum: categories, topics, posts and moderation.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Category, Moderation, NewCategory, NewPost, NewTopic, Post, Topic, TopicThread,
};
pub use repository::ForumRepository;
pub use router::forum_router;
pub use service::ForumService;

use crate::auth::AccessDenied;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ForumError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("category not found")]
    CategoryNotFound,
    #[error("topic not found")]
    TopicNotFound,
    #[error("topic is locked")]
    Locked,
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
