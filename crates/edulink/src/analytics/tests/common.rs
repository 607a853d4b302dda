use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::analytics::{
    AnalyticsService, Frequency, GroupBy, Metric, MetricRecord, MetricSource, ReportFormat,
    ReportRequest, ScheduleDraft,
};
use crate::config::ReportingConfig;
use crate::notifications::NotificationCenter;
use crate::store::memory::MemoryScheduledReports;
use crate::store::RepositoryError;

pub(super) type Service = AnalyticsService<MemoryScheduledReports, NotificationCenter>;

pub(super) fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, month, day).expect("valid date")
}

/// Fixed records per metric; counts how often the platform is read.
#[derive(Default)]
pub(super) struct StubSource {
    pub(super) reads: AtomicUsize,
    pub(super) broken: Option<Metric>,
}

impl StubSource {
    pub(super) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl MetricSource for StubSource {
    fn records(&self, metric: Metric) -> Result<Vec<MetricRecord>, RepositoryError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.broken == Some(metric) {
            return Err(RepositoryError::Unavailable("metrics offline".to_string()));
        }
        Ok(match metric {
            Metric::Users => vec![
                MetricRecord::new(day(1, 10), "verified", "teacher"),
                MetricRecord::new(day(1, 12), "pending", "advisor"),
                MetricRecord::new(day(2, 3), "unverified", "student"),
                MetricRecord::new(day(2, 20), "unverified", "pupil"),
                MetricRecord::new(day(3, 5), "verified", "administrator"),
            ],
            Metric::Resources => vec![
                MetricRecord::new(day(1, 15), "published", "video"),
                MetricRecord::new(day(2, 1), "draft", "document"),
            ],
            Metric::Appointments => vec![
                MetricRecord::new(day(2, 28), "completed", "up to 30 min"),
                MetricRecord::new(day(3, 3), "confirmed", "up to 30 min"),
                MetricRecord::new(day(3, 4), "cancelled", "31-60 min"),
                MetricRecord::new(day(3, 10), "pending", "31-60 min"),
            ],
            Metric::Assessments => vec![MetricRecord::new(
                day(2, 14),
                "Career interests",
                "engineering",
            )],
        })
    }
}

pub(super) struct Fixture {
    pub(super) service: Arc<Service>,
    pub(super) source: Arc<StubSource>,
    pub(super) inbox: Arc<NotificationCenter>,
}

pub(super) fn build_fixture(source: StubSource) -> Fixture {
    let source = Arc::new(source);
    let inbox = Arc::new(NotificationCenter::default());
    let service = Arc::new(AnalyticsService::new(
        source.clone(),
        Arc::new(MemoryScheduledReports::default()),
        inbox.clone(),
        &ReportingConfig::default(),
    ));
    Fixture {
        service,
        source,
        inbox,
    }
}

pub(super) fn users_request(group_by: GroupBy, format: ReportFormat) -> ReportRequest {
    ReportRequest {
        metric: Metric::Users,
        from: day(1, 1),
        to: day(2, 28),
        group_by,
        format,
    }
}

pub(super) fn weekly_draft(metric: Metric, first_run: NaiveDate) -> ScheduleDraft {
    ScheduleDraft {
        name: format!("Weekly {}", metric.label()),
        metric,
        group_by: GroupBy::Status,
        format: ReportFormat::Csv,
        frequency: Frequency::Weekly,
        window_days: 7,
        first_run: Some(first_run),
    }
}
