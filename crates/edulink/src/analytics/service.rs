use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::cache::MetricCache;
use super::metrics::{Metric, MetricRecord, MetricSource};
use super::render::{render, Artifact};
use super::report::{ReportRequest, ReportTable};
use super::repository::ScheduledReportRepository;
use super::schedule::{ScheduleDraft, ScheduledReport};
use super::ReportError;
use crate::auth::Actor;
use crate::config::ReportingConfig;
use crate::ids::{ScheduledReportId, UserId};
use crate::notifications::{notify_best_effort, Notification, NotificationKind, Notifier};

/// Headline counts for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub total_users: u64,
    pub verified_users: u64,
    pub pending_verifications: u64,
    pub published_resources: u64,
    pub upcoming_appointments: u64,
    pub completed_attempts: u64,
}

/// Outcome of one scheduled report executed by `run_due`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledRun {
    pub report: ScheduledReportId,
    pub owner: UserId,
    pub name: String,
    pub filename: String,
    pub next_run: NaiveDate,
}

pub struct AnalyticsService<S, N> {
    source: Arc<dyn MetricSource>,
    schedules: Arc<S>,
    notifier: Arc<N>,
    cache: MetricCache,
}

impl<S, N> AnalyticsService<S, N>
where
    S: ScheduledReportRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        source: Arc<dyn MetricSource>,
        schedules: Arc<S>,
        notifier: Arc<N>,
        config: &ReportingConfig,
    ) -> Self {
        Self {
            source,
            schedules,
            notifier,
            cache: MetricCache::new(config.cache_ttl()),
        }
    }

    /// Grouped counts for `request`, memoized per metric, range and grouping.
    pub fn table(&self, request: &ReportRequest) -> Result<ReportTable, ReportError> {
        request.validate()?;
        let key = request.cache_key();
        self.cache.get_or_compute(key, || {
            let records = self.source.records(key.metric)?;
            Ok(ReportTable::aggregate(key, &records))
        })
    }

    /// Render without an authorization check; used by the CLI.
    pub fn export(&self, request: &ReportRequest) -> Result<Artifact, ReportError> {
        let table = self.table(request)?;
        render(&table, request.format)
    }

    pub fn report(&self, actor: &Actor, request: &ReportRequest) -> Result<Artifact, ReportError> {
        actor.require_admin("run reports")?;
        let artifact = self.export(request)?;
        info!(
            metric = request.metric.label(),
            format = request.format.label(),
            bytes = artifact.bytes.len(),
            "report rendered"
        );
        Ok(artifact)
    }

    pub fn dashboard(&self, actor: &Actor, today: NaiveDate) -> Result<Dashboard, ReportError> {
        actor.require_admin("view the dashboard")?;
        self.headline(today)
    }

    pub fn headline(&self, today: NaiveDate) -> Result<Dashboard, ReportError> {
        let users = self.source.records(Metric::Users)?;
        let resources = self.source.records(Metric::Resources)?;
        let appointments = self.source.records(Metric::Appointments)?;
        let attempts = self.source.records(Metric::Assessments)?;

        Ok(Dashboard {
            as_of: today,
            total_users: users.len() as u64,
            verified_users: count_where(&users, |record| record.status == "verified"),
            pending_verifications: count_where(&users, |record| record.status == "pending"),
            published_resources: count_where(&resources, |record| record.status == "published"),
            upcoming_appointments: count_where(&appointments, |record| {
                record.date >= today
                    && matches!(record.status.as_str(), "pending" | "confirmed" | "rescheduled")
            }),
            completed_attempts: attempts.len() as u64,
        })
    }

    pub fn schedule(
        &self,
        actor: &Actor,
        draft: ScheduleDraft,
        now: NaiveDateTime,
    ) -> Result<ScheduledReport, ReportError> {
        actor.require_admin("schedule reports")?;
        draft.validate(now.date())?;
        let report = ScheduledReport::new(actor.user_id, draft, now);
        let stored = self.schedules.insert(report)?;
        info!(
            report_id = %stored.id,
            frequency = stored.frequency.label(),
            next_run = %stored.next_run,
            "report scheduled"
        );
        Ok(stored)
    }

    pub fn scheduled_for(&self, actor: &Actor) -> Result<Vec<ScheduledReport>, ReportError> {
        actor.require_admin("list scheduled reports")?;
        let mut reports = self.schedules.owned_by(&actor.user_id)?;
        reports.sort_by(|a, b| a.next_run.cmp(&b.next_run).then_with(|| a.name.cmp(&b.name)));
        Ok(reports)
    }

    pub fn scheduled(
        &self,
        actor: &Actor,
        id: &ScheduledReportId,
    ) -> Result<ScheduledReport, ReportError> {
        actor.require_admin("view scheduled reports")?;
        self.schedules.fetch(id)?.ok_or(ReportError::NotFound)
    }

    /// The artifact stored by the report's most recent run.
    pub fn last_artifact(
        &self,
        actor: &Actor,
        id: &ScheduledReportId,
    ) -> Result<Artifact, ReportError> {
        let report = self.scheduled(actor, id)?;
        match (report.last_artifact, report.last_bytes) {
            (Some(summary), Some(bytes)) => Ok(Artifact {
                format: report.format,
                content_type: summary.content_type,
                filename: summary.filename,
                bytes,
            }),
            _ => Err(ReportError::NotFound),
        }
    }

    pub fn run_due_as(
        &self,
        actor: &Actor,
        now: NaiveDateTime,
    ) -> Result<Vec<ScheduledRun>, ReportError> {
        actor.require_admin("run scheduled reports")?;
        self.run_due(now)
    }

    /// Generate every report whose `next_run` is on or before today.
    ///
    /// A report that fails to render is logged and left due; the others still run.
    pub fn run_due(&self, now: NaiveDateTime) -> Result<Vec<ScheduledRun>, ReportError> {
        let today = now.date();
        let mut due: Vec<ScheduledReport> = self
            .schedules
            .list()?
            .into_iter()
            .filter(|report| report.is_due(today))
            .collect();
        due.sort_by(|a, b| a.next_run.cmp(&b.next_run));

        let mut runs = Vec::with_capacity(due.len());
        for mut report in due {
            let artifact = match report.generate(self.source.as_ref(), now) {
                Ok(artifact) => artifact,
                Err(err) => {
                    warn!(report_id = %report.id, error = %err, "scheduled report failed");
                    continue;
                }
            };
            self.schedules.update(report.clone())?;
            info!(
                report_id = %report.id,
                filename = %artifact.filename,
                next_run = %report.next_run,
                "scheduled report generated"
            );
            notify_best_effort(
                self.notifier.as_ref(),
                Notification::new(
                    report.owner,
                    NotificationKind::Report,
                    format!("Report \"{}\" is ready: {}", report.name, artifact.filename),
                    now,
                ),
            );
            runs.push(ScheduledRun {
                report: report.id,
                owner: report.owner,
                name: report.name,
                filename: artifact.filename,
                next_run: report.next_run,
            });
        }
        if runs.is_empty() {
            debug!(%today, "no scheduled reports due");
        }
        Ok(runs)
    }
}

fn count_where(records: &[MetricRecord], predicate: impl Fn(&MetricRecord) -> bool) -> u64 {
    records.iter().filter(|record| predicate(record)).count() as u64
}
