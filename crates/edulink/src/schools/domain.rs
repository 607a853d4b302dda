use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::{DepartmentId, ProgramId, ReviewId, SchoolId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolKind {
    Primary,
    Secondary,
    University,
    Vocational,
    Other,
}

impl SchoolKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::University => "university",
            Self::Vocational => "vocational",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub city: String,
    pub country: String,
    pub kind: SchoolKind,
    pub website: Option<String>,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub school: SchoolId,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub school: SchoolId,
    pub department: Option<DepartmentId>,
    pub name: String,
    pub degree_level: String,
    pub duration_years: u8,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub school: SchoolId,
    pub author: UserId,
    pub rating: u8,
    pub comment: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub city: String,
    pub country: String,
    pub kind: SchoolKind,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDepartment {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProgram {
    #[serde(default)]
    pub department: Option<DepartmentId>,
    pub name: String,
    pub degree_level: String,
    pub duration_years: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Directory filter; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolSearch {
    #[serde(default, rename = "q")]
    pub query: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub kind: Option<SchoolKind>,
}

impl SchoolSearch {
    pub fn matches(&self, school: &School) -> bool {
        let name_matches = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map_or(true, |query| {
                school
                    .name
                    .to_lowercase()
                    .contains(&query.to_lowercase())
            });
        let city_matches = self
            .city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .map_or(true, |city| school.city.eq_ignore_ascii_case(city));
        let kind_matches = self.kind.map_or(true, |kind| school.kind == kind);
        name_matches && city_matches && kind_matches
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchoolDetail {
    pub school: School,
    pub departments: Vec<Department>,
    pub programs: Vec<Program>,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f32>,
    pub review_count: usize,
}

impl SchoolDetail {
    pub fn assemble(
        school: School,
        departments: Vec<Department>,
        programs: Vec<Program>,
        mut reviews: Vec<Review>,
    ) -> Self {
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let review_count = reviews.len();
        let average_rating = if review_count == 0 {
            None
        } else {
            let sum: u32 = reviews.iter().map(|review| u32::from(review.rating)).sum();
            Some(sum as f32 / review_count as f32)
        };
        Self {
            school,
            departments,
            programs,
            reviews,
            average_rating,
            review_count,
        }
    }
}
