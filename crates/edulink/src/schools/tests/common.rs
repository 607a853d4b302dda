use std::sync::Arc;

use crate::ids::{SchoolId, UserId};
use crate::schools::{
    Department, NewReview, NewSchool, Program, Review, School, SchoolKind, SchoolRepository,
    SchoolService,
};
use crate::store::memory::MemorySchools;
use crate::store::RepositoryError;

pub(super) fn build_service() -> (Arc<SchoolService<MemorySchools>>, Arc<MemorySchools>) {
    let repository = Arc::new(MemorySchools::default());
    (Arc::new(SchoolService::new(repository.clone())), repository)
}

pub(super) fn new_school(name: &str, city: &str, kind: SchoolKind) -> NewSchool {
    NewSchool {
        name: name.to_string(),
        city: city.to_string(),
        country: "Senegal".to_string(),
        kind,
        website: None,
    }
}

pub(super) fn review(rating: u8) -> NewReview {
    NewReview {
        rating,
        comment: "Helpful staff and a good library.".to_string(),
    }
}

/// Hides existing reviews from `review_by`, so the duplicate only surfaces at insert time.
#[derive(Default)]
pub(super) struct RacingReviews {
    pub(super) inner: MemorySchools,
}

impl SchoolRepository for RacingReviews {
    fn insert_school(&self, school: School) -> Result<School, RepositoryError> {
        self.inner.insert_school(school)
    }

    fn fetch_school(&self, id: &SchoolId) -> Result<Option<School>, RepositoryError> {
        self.inner.fetch_school(id)
    }

    fn list_schools(&self) -> Result<Vec<School>, RepositoryError> {
        self.inner.list_schools()
    }

    fn insert_department(&self, department: Department) -> Result<Department, RepositoryError> {
        self.inner.insert_department(department)
    }

    fn departments_for(&self, school: &SchoolId) -> Result<Vec<Department>, RepositoryError> {
        self.inner.departments_for(school)
    }

    fn insert_program(&self, program: Program) -> Result<Program, RepositoryError> {
        self.inner.insert_program(program)
    }

    fn programs_for(&self, school: &SchoolId) -> Result<Vec<Program>, RepositoryError> {
        self.inner.programs_for(school)
    }

    fn insert_review(&self, review: Review) -> Result<Review, RepositoryError> {
        self.inner.insert_review(review)
    }

    fn reviews_for(&self, school: &SchoolId) -> Result<Vec<Review>, RepositoryError> {
        self.inner.reviews_for(school)
    }

    fn review_by(
        &self,
        _school: &SchoolId,
        _author: &UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        Ok(None)
    }
}
