use super::schedule::ScheduledReport;
use crate::ids::{ScheduledReportId, UserId};
use crate::store::RepositoryError;

pub trait ScheduledReportRepository: Send + Sync {
    fn insert(&self, report: ScheduledReport) -> Result<ScheduledReport, RepositoryError>;
    fn update(&self, report: ScheduledReport) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ScheduledReportId) -> Result<Option<ScheduledReport>, RepositoryError>;
    fn list(&self) -> Result<Vec<ScheduledReport>, RepositoryError>;
    fn owned_by(&self, owner: &UserId) -> Result<Vec<ScheduledReport>, RepositoryError>;
}
