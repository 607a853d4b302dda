use super::domain::{Assessment, Attempt};
use crate::ids::{AssessmentId, UserId};
use crate::store::RepositoryError;

pub trait OrientationRepository: Send + Sync {
    fn insert_assessment(&self, assessment: Assessment) -> Result<Assessment, RepositoryError>;
    fn update_assessment(&self, assessment: Assessment) -> Result<(), RepositoryError>;
    fn fetch_assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError>;
    fn list_assessments(&self) -> Result<Vec<Assessment>, RepositoryError>;
    fn insert_attempt(&self, attempt: Attempt) -> Result<Attempt, RepositoryError>;
    fn attempts_for(&self, user: &UserId) -> Result<Vec<Attempt>, RepositoryError>;
    fn all_attempts(&self) -> Result<Vec<Attempt>, RepositoryError>;
}
