use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::domain::{
    Department, NewDepartment, NewProgram, NewReview, NewSchool, Program, Review, School,
    SchoolDetail, SchoolSearch,
};
use super::repository::SchoolRepository;
use super::SchoolError;
use crate::accounts::Role;
use crate::auth::Actor;
use crate::ids::{DepartmentId, ProgramId, ReviewId, SchoolId};
use crate::store::RepositoryError;
use crate::validation::{required_text, ValidationErrors};

const EDITORS: &[Role] = &[Role::Administrator, Role::Teacher];

pub struct SchoolService<R> {
    repository: Arc<R>,
}

impl<R> SchoolService<R>
where
    R: SchoolRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_school(
        &self,
        actor: &Actor,
        draft: NewSchool,
        now: NaiveDateTime,
    ) -> Result<School, SchoolError> {
        actor.require_role(EDITORS, "add schools")?;
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &draft.name, 200);
        let city = required_text(&mut errors, "city", &draft.city, 120);
        let country = required_text(&mut errors, "country", &draft.country, 120);
        let website = draft
            .website
            .map(|site| site.trim().to_string())
            .filter(|site| !site.is_empty());
        if let Some(site) = website.as_deref() {
            errors.check(
                !(site.starts_with("http://") || site.starts_with("https://")),
                "website",
                "enter a valid URL",
            );
        }
        errors.into_result()?;

        let school = self.repository.insert_school(School {
            id: SchoolId::new(),
            name,
            city,
            country,
            kind: draft.kind,
            website,
            created_by: actor.user_id,
            created_at: now,
        })?;
        info!(school_id = %school.id, kind = school.kind.label(), "school created");
        Ok(school)
    }

    pub fn add_department(
        &self,
        actor: &Actor,
        school: &SchoolId,
        draft: NewDepartment,
        now: NaiveDateTime,
    ) -> Result<Department, SchoolError> {
        actor.require_role(EDITORS, "edit schools")?;
        self.load(school)?;
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &draft.name, 200);
        let existing = self.repository.departments_for(school)?;
        errors.check(
            existing
                .iter()
                .any(|department| department.name.eq_ignore_ascii_case(&name)),
            "name",
            "this school already has a department with that name",
        );
        errors.into_result()?;

        let department = self.repository.insert_department(Department {
            id: DepartmentId::new(),
            school: *school,
            name,
            created_at: now,
        })?;
        info!(school_id = %school, department_id = %department.id, "department added");
        Ok(department)
    }

    pub fn add_program(
        &self,
        actor: &Actor,
        school: &SchoolId,
        draft: NewProgram,
        now: NaiveDateTime,
    ) -> Result<Program, SchoolError> {
        actor.require_role(EDITORS, "edit schools")?;
        self.load(school)?;
        let mut errors = ValidationErrors::new();
        let name = required_text(&mut errors, "name", &draft.name, 200);
        let degree_level = required_text(&mut errors, "degree_level", &draft.degree_level, 80);
        errors.check(
            !(1..=10).contains(&draft.duration_years),
            "duration_years",
            "duration must be between 1 and 10 years",
        );
        if let Some(department) = draft.department {
            let belongs = self
                .repository
                .departments_for(school)?
                .iter()
                .any(|candidate| candidate.id == department);
            errors.check(
                !belongs,
                "department",
                "department does not belong to this school",
            );
        }
        errors.into_result()?;

        let program = self.repository.insert_program(Program {
            id: ProgramId::new(),
            school: *school,
            department: draft.department,
            name,
            degree_level,
            duration_years: draft.duration_years,
            created_at: now,
        })?;
        info!(school_id = %school, program_id = %program.id, "program added");
        Ok(program)
    }

    pub fn search(&self, filter: &SchoolSearch) -> Result<Vec<School>, SchoolError> {
        let mut schools: Vec<School> = self
            .repository
            .list_schools()?
            .into_iter()
            .filter(|school| filter.matches(school))
            .collect();
        schools.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(schools)
    }

    pub fn school_detail(&self, id: &SchoolId) -> Result<SchoolDetail, SchoolError> {
        let school = self.load(id)?;
        let departments = self.repository.departments_for(id)?;
        let programs = self.repository.programs_for(id)?;
        let reviews = self.repository.reviews_for(id)?;
        Ok(SchoolDetail::assemble(school, departments, programs, reviews))
    }

    /// One review per author per school; a second attempt is a field error.
    pub fn add_review(
        &self,
        actor: &Actor,
        school: &SchoolId,
        draft: NewReview,
        now: NaiveDateTime,
    ) -> Result<Review, SchoolError> {
        self.load(school)?;
        let mut errors = ValidationErrors::new();
        errors.check(
            !(1..=5).contains(&draft.rating),
            "rating",
            "rating must be between 1 and 5",
        );
        errors.check(
            draft.comment.chars().count() > 2000,
            "comment",
            "ensure this field has at most 2000 characters",
        );
        errors.check(
            self.repository.review_by(school, &actor.user_id)?.is_some(),
            "school",
            "you have already reviewed this school",
        );
        errors.into_result()?;

        let review = Review {
            id: ReviewId::new(),
            school: *school,
            author: actor.user_id,
            rating: draft.rating,
            comment: draft.comment.trim().to_string(),
            created_at: now,
        };
        match self.repository.insert_review(review) {
            Ok(review) => {
                info!(school_id = %school, review_id = %review.id, rating = review.rating, "review added");
                Ok(review)
            }
            Err(RepositoryError::Conflict) => {
                debug!(school_id = %school, author = %actor.user_id, "duplicate review rejected");
                Err(ValidationErrors::single("school", "you have already reviewed this school").into())
            }
            Err(other) => Err(other.into()),
        }
    }

    fn load(&self, id: &SchoolId) -> Result<School, SchoolError> {
        self.repository
            .fetch_school(id)?
            .ok_or(SchoolError::NotFound)
    }
}
