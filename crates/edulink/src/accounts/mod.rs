//! Accounts, role profiles, sessions and the verification workflow.

pub mod domain;
pub mod password;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdminScope, AdministratorProfile, AdvisorProfile, LoginOutcome, PasswordChange,
    ProfileUpdate, PupilProfile, RegistrationRequest, Role, RoleProfile, StudentProfile,
    TeacherProfile, User, UserView, VerificationDecision, VerificationOutcome,
    VerificationStatus,
};
pub use repository::AccountRepository;
pub use router::account_router;
pub use service::AccountService;

use crate::auth::AccessDenied;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

/// Error raised by the account service.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is inactive")]
    Inactive,
    #[error("account not found")]
    NotFound,
    #[error("verification cannot move from {from} to {to}")]
    InvalidVerificationTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
