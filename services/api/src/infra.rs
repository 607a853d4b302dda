use chrono::NaiveDate;
use edulink::analytics::{GroupBy, Metric, ReportFormat};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_metric(raw: &str) -> Result<Metric, String> {
    Metric::parse(raw).ok_or_else(|| {
        format!("unknown metric '{raw}' (expected users, resources, appointments or assessments)")
    })
}

pub(crate) fn parse_group_by(raw: &str) -> Result<GroupBy, String> {
    GroupBy::parse(raw)
        .ok_or_else(|| format!("unknown grouping '{raw}' (expected none, status, type, day or month)"))
}

pub(crate) fn parse_format(raw: &str) -> Result<ReportFormat, String> {
    ReportFormat::parse(raw)
        .ok_or_else(|| format!("unknown format '{raw}' (expected pdf, xlsx, csv, json or html)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsers_accept_labels_case_insensitively() {
        assert_eq!(parse_metric("Appointments"), Ok(Metric::Appointments));
        assert_eq!(parse_group_by("MONTH"), Ok(GroupBy::Month));
        assert_eq!(parse_format("xlsx"), Ok(ReportFormat::Xlsx));
        assert!(parse_metric("revenue").is_err());
    }

    #[test]
    fn parse_date_reports_the_offending_input() {
        assert_eq!(
            parse_date(" 2031-03-03 "),
            Ok(NaiveDate::from_ymd_opt(2031, 3, 3).expect("valid date"))
        );
        let error = parse_date("03/03/2031").expect_err("wrong format");
        assert!(error.contains("03/03/2031"));
    }
}
