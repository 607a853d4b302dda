//! Analytics: aggregate counts, rendered report artifacts, dashboards and
//! scheduled reports.

pub mod cache;
pub mod metrics;
pub mod render;
pub mod report;
pub mod repository;
pub mod router;
pub mod schedule;
pub mod service;

#[cfg(test)]
mod tests;

pub use cache::MetricCache;
pub use metrics::{Metric, MetricRecord, MetricSource, RepositoryMetricSource};
pub use render::{render, Artifact, ArtifactSummary};
pub use report::{GroupBy, ReportFormat, ReportKey, ReportRequest, ReportRow, ReportTable};
pub use repository::ScheduledReportRepository;
pub use router::analytics_router;
pub use schedule::{Frequency, ScheduleDraft, ScheduledReport};
pub use service::{AnalyticsService, Dashboard, ScheduledRun};

use crate::auth::AccessDenied;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("scheduled report not found")]
    NotFound,
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to encode report: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
