use super::domain::{Department, Program, Review, School};
use crate::ids::{SchoolId, UserId};
use crate::store::RepositoryError;

/// Storage abstraction for the school directory.
///
/// `insert_review` enforces one review per (author, school) and returns
/// [`RepositoryError::Conflict`] for a second one.
pub trait SchoolRepository: Send + Sync {
    fn insert_school(&self, school: School) -> Result<School, RepositoryError>;
    fn fetch_school(&self, id: &SchoolId) -> Result<Option<School>, RepositoryError>;
    fn list_schools(&self) -> Result<Vec<School>, RepositoryError>;
    fn insert_department(&self, department: Department) -> Result<Department, RepositoryError>;
    fn departments_for(&self, school: &SchoolId) -> Result<Vec<Department>, RepositoryError>;
    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError>;
    fn programs_for(&self, school: &SchoolId) -> Result<Vec<Program>, RepositoryError>;
    fn insert_review(&self, review: Review) -> Result<Review, RepositoryError>;
    fn reviews_for(&self, school: &SchoolId) -> Result<Vec<Review>, RepositoryError>;
    fn review_by(&self, school: &SchoolId, author: &UserId)
        -> Result<Option<Review>, RepositoryError>;
}
