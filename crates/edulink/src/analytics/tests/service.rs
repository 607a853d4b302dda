use super::common::*;
use crate::accounts::Role;
use crate::analytics::{GroupBy, Metric, ReportError, ReportFormat};
use crate::notifications::NotificationKind;
use crate::testing::{actor, at};

#[test]
fn status_table_counts_only_records_in_range() {
    let fixture = build_fixture(StubSource::default());
    let table = fixture
        .service
        .table(&users_request(GroupBy::Status, ReportFormat::Json))
        .expect("table");

    let rows: Vec<(&str, u64)> = table
        .rows
        .iter()
        .map(|row| (row.label.as_str(), row.count))
        .collect();
    assert_eq!(rows, vec![("pending", 1), ("unverified", 2), ("verified", 1)]);
    assert_eq!(table.total, 4);
    assert_eq!(table.columns, vec!["status".to_string(), "count".to_string()]);
}

#[test]
fn csv_total_row_matches_the_sum_of_rows() {
    let fixture = build_fixture(StubSource::default());
    let artifact = fixture
        .service
        .report(&actor(Role::Administrator), &users_request(GroupBy::Month, ReportFormat::Csv))
        .expect("csv");
    assert_eq!(artifact.filename, "users-month-20310101-20310228.csv");

    let text = String::from_utf8(artifact.bytes).expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["month,count", "2031-01,2", "2031-02,2", "total,4"]);
}

#[test]
fn tables_are_cached_per_range_and_grouping() {
    let fixture = build_fixture(StubSource::default());
    let request = users_request(GroupBy::Type, ReportFormat::Json);
    fixture.service.table(&request).expect("first");
    let mut as_csv = request.clone();
    as_csv.format = ReportFormat::Csv;
    fixture.service.export(&as_csv).expect("same table, other format");
    assert_eq!(fixture.source.reads(), 1);

    let mut other = request;
    other.group_by = GroupBy::Day;
    fixture.service.table(&other).expect("different grouping");
    assert_eq!(fixture.source.reads(), 2);
}

#[test]
fn inverted_ranges_are_rejected() {
    let fixture = build_fixture(StubSource::default());
    let mut request = users_request(GroupBy::None, ReportFormat::Json);
    request.from = day(3, 1);
    let error = fixture.service.table(&request).expect_err("from after to");
    assert!(matches!(error, ReportError::Validation(ref errors) if errors.has("to")));
}

#[test]
fn reports_and_dashboard_are_admin_only() {
    let fixture = build_fixture(StubSource::default());
    let error = fixture
        .service
        .report(&actor(Role::Advisor), &users_request(GroupBy::None, ReportFormat::Html))
        .expect_err("advisors cannot run reports");
    assert!(matches!(error, ReportError::Forbidden(_)));

    let error = fixture
        .service
        .dashboard(&actor(Role::Teacher), day(3, 1))
        .expect_err("teachers cannot see the dashboard");
    assert!(matches!(error, ReportError::Forbidden(_)));
}

#[test]
fn dashboard_headline_counts() {
    let fixture = build_fixture(StubSource::default());
    let dashboard = fixture
        .service
        .dashboard(&actor(Role::Administrator), day(3, 3))
        .expect("dashboard");

    assert_eq!(dashboard.total_users, 5);
    assert_eq!(dashboard.verified_users, 2);
    assert_eq!(dashboard.pending_verifications, 1);
    assert_eq!(dashboard.published_resources, 1);
    assert_eq!(dashboard.upcoming_appointments, 2, "confirmed today plus pending later");
    assert_eq!(dashboard.completed_attempts, 1);
}

#[test]
fn run_due_generates_notifies_and_advances() {
    let fixture = build_fixture(StubSource::default());
    let admin = actor(Role::Administrator);
    let report = fixture
        .service
        .schedule(&admin, weekly_draft(Metric::Appointments, day(3, 3)), at(3, 1, 9, 0))
        .expect("scheduled");

    assert!(fixture.service.run_due(at(3, 2, 6, 0)).expect("run").is_empty());

    let runs = fixture.service.run_due(at(3, 4, 6, 0)).expect("run");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].report, report.id);
    assert_eq!(runs[0].filename, "appointments-status-20310226-20310304.csv");
    assert_eq!(runs[0].next_run, day(3, 10));

    let inbox = fixture.inbox.list_for(&admin.user_id).expect("inbox");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::Report);

    let artifact = fixture
        .service
        .last_artifact(&admin, &report.id)
        .expect("stored artifact");
    let text = String::from_utf8(artifact.bytes).expect("utf-8");
    assert!(text.ends_with("total,3\n"));

    assert!(fixture.service.run_due(at(3, 5, 6, 0)).expect("run").is_empty());
}

#[test]
fn a_failing_report_stays_due_while_others_run() {
    let fixture = build_fixture(StubSource {
        broken: Some(Metric::Resources),
        ..StubSource::default()
    });
    let admin = actor(Role::Administrator);
    let broken = fixture
        .service
        .schedule(&admin, weekly_draft(Metric::Resources, day(3, 1)), at(3, 1, 9, 0))
        .expect("scheduled");
    fixture
        .service
        .schedule(&admin, weekly_draft(Metric::Users, day(3, 1)), at(3, 1, 9, 0))
        .expect("scheduled");

    let runs = fixture.service.run_due(at(3, 1, 9, 5)).expect("run");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].name, "Weekly users");

    let still_due = fixture.service.scheduled(&admin, &broken.id).expect("report");
    assert_eq!(still_due.next_run, day(3, 1));
    assert!(still_due.last_run.is_none());
    assert!(matches!(
        fixture.service.last_artifact(&admin, &broken.id),
        Err(ReportError::NotFound)
    ));
}

#[test]
fn schedule_drafts_are_validated() {
    let fixture = build_fixture(StubSource::default());
    let mut draft = weekly_draft(Metric::Users, day(3, 1));
    draft.name = "  ".to_string();
    draft.window_days = 0;

    match fixture.service.schedule(&actor(Role::Administrator), draft, at(3, 1, 9, 0)) {
        Err(ReportError::Validation(errors)) => {
            assert!(errors.has("name"));
            assert!(errors.has("window_days"));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn schedules_cannot_start_long_before_today() {
    let fixture = build_fixture(StubSource::default());
    let draft = weekly_draft(Metric::Users, chrono::NaiveDate::MIN);

    match fixture.service.schedule(&actor(Role::Administrator), draft, at(3, 1, 9, 0)) {
        Err(ReportError::Validation(errors)) => assert!(errors.has("first_run")),
        other => panic!("expected a first_run error, got {other:?}"),
    }

    let recent = weekly_draft(Metric::Users, day(2, 22));
    let stored = fixture
        .service
        .schedule(&actor(Role::Administrator), recent, at(3, 1, 9, 0))
        .expect("one window back is accepted");
    assert_eq!(stored.next_run, day(2, 22));
}
