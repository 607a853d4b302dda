//! Recurring reports generated on demand by `run_due`.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::metrics::{Metric, MetricSource};
use super::render::{render, Artifact, ArtifactSummary};
use super::report::{GroupBy, ReportFormat, ReportRequest, ReportTable};
use super::ReportError;
use crate::ids::{ScheduledReportId, UserId};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date + Duration::days(1),
            Self::Weekly => date + Duration::days(7),
            Self::Monthly => date
                .checked_add_months(Months::new(1))
                .unwrap_or(date + Duration::days(30)),
        }
    }

    /// First run strictly after `today`, jumping over missed periods in one step.
    pub fn next_after(self, scheduled: NaiveDate, today: NaiveDate) -> NaiveDate {
        let mut next = self.advance(scheduled);
        if next > today {
            return next;
        }
        let behind = (today - next).num_days();
        next = match self {
            Self::Daily => today,
            Self::Weekly => next + Duration::days(behind - behind % 7),
            Self::Monthly => {
                let months = (today.year() - next.year()) * 12 + today.month0() as i32
                    - next.month0() as i32;
                next.checked_add_months(Months::new(u32::try_from(months).unwrap_or(0)))
                    .unwrap_or(today)
            }
        };
        while next <= today {
            next = self.advance(next);
        }
        next
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleDraft {
    pub name: String,
    pub metric: Metric,
    #[serde(default)]
    pub group_by: GroupBy,
    #[serde(default)]
    pub format: ReportFormat,
    pub frequency: Frequency,
    pub window_days: u32,
    #[serde(default)]
    pub first_run: Option<NaiveDate>,
}

impl ScheduleDraft {
    /// `first_run` may lie in the past by at most one window.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "must not be blank");
        errors.check(self.name.chars().count() > 120, "name", "is too long");
        errors.check(
            self.window_days == 0 || self.window_days > 366,
            "window_days",
            "must be between 1 and 366",
        );
        let earliest = today - Duration::days(i64::from(self.window_days));
        errors.check(
            self.first_run.map_or(false, |first_run| first_run < earliest),
            "first_run",
            "must not be earlier than one window before today",
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledReport {
    pub id: ScheduledReportId,
    pub owner: UserId,
    pub name: String,
    pub metric: Metric,
    pub group_by: GroupBy,
    pub format: ReportFormat,
    pub frequency: Frequency,
    pub window_days: u32,
    pub next_run: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_artifact: Option<ArtifactSummary>,
    #[serde(skip)]
    pub last_bytes: Option<Vec<u8>>,
    pub created_at: NaiveDateTime,
}

impl ScheduledReport {
    pub fn new(owner: UserId, draft: ScheduleDraft, now: NaiveDateTime) -> Self {
        Self {
            id: ScheduledReportId::new(),
            owner,
            name: draft.name.trim().to_string(),
            metric: draft.metric,
            group_by: draft.group_by,
            format: draft.format,
            frequency: draft.frequency,
            window_days: draft.window_days,
            next_run: draft.first_run.unwrap_or_else(|| now.date()),
            last_run: None,
            last_artifact: None,
            last_bytes: None,
            created_at: now,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_run <= today
    }

    /// The request covering `[today - window_days + 1, today]`.
    pub fn request_for(&self, today: NaiveDate) -> ReportRequest {
        let span = i64::from(self.window_days.max(1)) - 1;
        ReportRequest {
            metric: self.metric,
            from: today - Duration::days(span),
            to: today,
            group_by: self.group_by,
            format: self.format,
        }
    }

    /// Render the report for `now`, store the artifact, and move `next_run` forward.
    pub fn generate(
        &mut self,
        source: &dyn MetricSource,
        now: NaiveDateTime,
    ) -> Result<Artifact, ReportError> {
        let today = now.date();
        let request = self.request_for(today);
        let records = source.records(request.metric)?;
        let table = ReportTable::aggregate(request.cache_key(), &records);
        let artifact = render(&table, request.format)?;

        self.last_artifact = Some(ArtifactSummary::from(&artifact));
        self.last_bytes = Some(artifact.bytes.clone());
        self.last_run = Some(now);
        self.next_run = self.frequency.next_after(self.next_run, today);
        Ok(artifact)
    }
}
