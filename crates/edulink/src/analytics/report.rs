//! Report requests and the grouped count table every output format renders.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::{Metric, MetricRecord};
use crate::validation::ValidationErrors;

/// Longest range a single report may cover.
pub const MAX_RANGE_DAYS: i64 = 3660;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    None,
    Status,
    Type,
    Day,
    Month,
}

impl GroupBy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Status => "status",
            Self::Type => "type",
            Self::Day => "day",
            Self::Month => "month",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [Self::None, Self::Status, Self::Type, Self::Day, Self::Month]
            .into_iter()
            .find(|group| group.label().eq_ignore_ascii_case(raw.trim()))
    }

    fn key(self, record: &MetricRecord) -> String {
        match self {
            Self::None => "total".to_string(),
            Self::Status => record.status.clone(),
            Self::Type => record.kind.clone(),
            Self::Day => record.date.format("%Y-%m-%d").to_string(),
            Self::Month => record.date.format("%Y-%m").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Pdf,
    Xlsx,
    Csv,
    #[default]
    Json,
    Html,
}

impl ReportFormat {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Html => "html",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [Self::Pdf, Self::Xlsx, Self::Csv, Self::Json, Self::Html]
            .into_iter()
            .find(|format| format.label().eq_ignore_ascii_case(raw.trim()))
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            // Printable HTML until a real PDF renderer is wired in.
            Self::Pdf | Self::Html => "text/html; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf | Self::Html => "html",
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub metric: Metric,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub group_by: GroupBy,
    #[serde(default)]
    pub format: ReportFormat,
}

impl ReportRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.from > self.to, "to", "must not be before from");
        errors.check(
            (self.to - self.from).num_days() > MAX_RANGE_DAYS,
            "to",
            "range is too long",
        );
        errors.into_result()
    }

    pub fn cache_key(&self) -> ReportKey {
        ReportKey {
            metric: self.metric,
            from: self.from,
            to: self.to,
            group_by: self.group_by,
        }
    }
}

/// Identity of a computed table, independent of the output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub metric: Metric,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub metric: Metric,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub group_by: GroupBy,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub total: u64,
}

impl ReportTable {
    /// Count `records` dated inside `[from, to]`, grouped per `group_by`.
    pub fn aggregate(key: ReportKey, records: &[MetricRecord]) -> Self {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for record in records
            .iter()
            .filter(|record| record.date >= key.from && record.date <= key.to)
        {
            *counts.entry(key.group_by.key(record)).or_insert(0) += 1;
        }
        if key.group_by == GroupBy::None {
            counts.entry("total".to_string()).or_insert(0);
        }

        let rows: Vec<ReportRow> = counts
            .into_iter()
            .map(|(label, count)| ReportRow { label, count })
            .collect();
        let total = rows.iter().map(|row| row.count).sum();
        let dimension = match key.group_by {
            GroupBy::None => "label",
            other => other.label(),
        };

        Self {
            title: format!(
                "{} {} to {}",
                title_case(key.metric.label()),
                key.from.format("%Y-%m-%d"),
                key.to.format("%Y-%m-%d")
            ),
            metric: key.metric,
            from: key.from,
            to: key.to,
            group_by: key.group_by,
            columns: vec![dimension.to_string(), "count".to_string()],
            rows,
            total,
        }
    }

    pub fn range_label(&self) -> String {
        format!(
            "{} to {}",
            self.from.format("%Y-%m-%d"),
            self.to.format("%Y-%m-%d")
        )
    }
}

fn title_case(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
