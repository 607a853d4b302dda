//! Metric records: a flat, per-entity view of the platform used by reports.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountRepository;
use crate::appointments::AppointmentRepository;
use crate::orientation::OrientationRepository;
use crate::resources::ResourceRepository;
use crate::store::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Users,
    Resources,
    Appointments,
    Assessments,
}

impl Metric {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Users,
            Self::Resources,
            Self::Appointments,
            Self::Assessments,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Resources => "resources",
            Self::Appointments => "appointments",
            Self::Assessments => "assessments",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|metric| metric.label().eq_ignore_ascii_case(raw.trim()))
    }
}

/// One countable entity: the date it falls on plus its status and type dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    pub date: NaiveDate,
    pub status: String,
    pub kind: String,
}

impl MetricRecord {
    pub fn new(date: NaiveDate, status: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            date,
            status: status.into(),
            kind: kind.into(),
        }
    }
}

/// Read side of the platform as seen by analytics.
pub trait MetricSource: Send + Sync {
    fn records(&self, metric: Metric) -> Result<Vec<MetricRecord>, RepositoryError>;
}

/// Appointment lengths bucketed for the `type` dimension.
pub fn duration_bucket(minutes: u32) -> &'static str {
    match minutes {
        0..=30 => "up to 30 min",
        31..=60 => "31-60 min",
        _ => "over 60 min",
    }
}

/// [`MetricSource`] reading straight from the component repositories.
pub struct RepositoryMetricSource<A, R, P, O> {
    accounts: Arc<A>,
    resources: Arc<R>,
    appointments: Arc<P>,
    orientation: Arc<O>,
}

impl<A, R, P, O> RepositoryMetricSource<A, R, P, O> {
    pub fn new(
        accounts: Arc<A>,
        resources: Arc<R>,
        appointments: Arc<P>,
        orientation: Arc<O>,
    ) -> Self {
        Self {
            accounts,
            resources,
            appointments,
            orientation,
        }
    }
}

impl<A, R, P, O> MetricSource for RepositoryMetricSource<A, R, P, O>
where
    A: AccountRepository,
    R: ResourceRepository,
    P: AppointmentRepository,
    O: OrientationRepository,
{
    fn records(&self, metric: Metric) -> Result<Vec<MetricRecord>, RepositoryError> {
        let records = match metric {
            Metric::Users => self
                .accounts
                .list()?
                .into_iter()
                .map(|user| {
                    MetricRecord::new(
                        user.created_at.date(),
                        user.verification.label(),
                        user.role.label(),
                    )
                })
                .collect(),
            Metric::Resources => self
                .resources
                .list()?
                .into_iter()
                .map(|resource| {
                    MetricRecord::new(
                        resource.created_at.date(),
                        if resource.published { "published" } else { "draft" },
                        resource.kind.label(),
                    )
                })
                .collect(),
            Metric::Appointments => self
                .appointments
                .all_appointments()?
                .into_iter()
                .map(|appointment| {
                    MetricRecord::new(
                        appointment.schedule_time.date(),
                        appointment.status.label(),
                        duration_bucket(appointment.duration_minutes),
                    )
                })
                .collect(),
            Metric::Assessments => {
                let titles: HashMap<_, _> = self
                    .orientation
                    .list_assessments()?
                    .into_iter()
                    .map(|assessment| (assessment.id, assessment.title))
                    .collect();
                self.orientation
                    .all_attempts()?
                    .into_iter()
                    .map(|attempt| {
                        let title = titles
                            .get(&attempt.assessment)
                            .cloned()
                            .unwrap_or_else(|| "unknown assessment".to_string());
                        let top = attempt.top_field().unwrap_or("none").to_string();
                        MetricRecord::new(attempt.completed_at.date(), title, top)
                    })
                    .collect()
            }
        };
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_labels_round_trip_through_parse() {
        for metric in Metric::ordered() {
            assert_eq!(Metric::parse(metric.label()), Some(metric));
        }
        assert_eq!(Metric::parse(" USERS "), Some(Metric::Users));
        assert_eq!(Metric::parse("revenue"), None);
    }

    #[test]
    fn durations_fall_into_three_buckets() {
        assert_eq!(duration_bucket(30), "up to 30 min");
        assert_eq!(duration_bucket(45), "31-60 min");
        assert_eq!(duration_bucket(90), "over 60 min");
    }
}
