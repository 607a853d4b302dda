//! Resource library: tagged content with likes, ratings, comments and collections.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    normalize_tags, Collection, Comment, LikeOutcome, NewCollection, NewComment, RatingSummary,
    Resource, ResourceDetail, ResourceDraft, ResourceFilter, ResourceKind, ResourceView,
};
pub use repository::ResourceRepository;
pub use router::resource_router;
pub use service::ResourceService;

use crate::auth::AccessDenied;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("resource not found")]
    NotFound,
    #[error("collection not found")]
    CollectionNotFound,
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
