//! School directory: institutions, departments, programs and reviews.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Department, NewDepartment, NewProgram, NewReview, NewSchool, Program, Review, School,
    SchoolDetail, SchoolKind, SchoolSearch,
};
pub use repository::SchoolRepository;
pub use router::school_router;
pub use service::SchoolService;

use crate::auth::AccessDenied;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum SchoolError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("school not found")]
    NotFound,
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
