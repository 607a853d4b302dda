//! Orientation assessments: weighted questionnaires and career recommendations.

pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerOption, Assessment, AssessmentDraft, Attempt, AttemptSubmission, OptionDraft, Question,
    QuestionDraft, Recommendation,
};
pub use repository::OrientationRepository;
pub use router::orientation_router;
pub use service::OrientationService;

use crate::auth::AccessDenied;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum OrientationError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("assessment not found")]
    NotFound,
    #[error("assessment is not published")]
    NotPublished,
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
