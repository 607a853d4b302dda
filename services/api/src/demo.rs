use crate::infra::{parse_date, parse_format, parse_group_by, parse_metric};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use edulink::accounts::{
    AdminScope, AdministratorProfile, AdvisorProfile, PupilProfile, RegistrationRequest,
    RoleProfile, StudentProfile, TeacherProfile, UserView, VerificationDecision,
    VerificationOutcome,
};
use edulink::analytics::{
    Artifact, Frequency, GroupBy, Metric, ReportFormat, ReportRequest, ScheduleDraft,
};
use edulink::appointments::{weekday_index, AppointmentRequest, AvailableSlot, SlotDraft};
use edulink::auth::Actor;
use edulink::config::AppConfig;
use edulink::error::AppError;
use edulink::forum::{NewCategory, NewPost, NewTopic};
use edulink::orientation::{AssessmentDraft, AttemptSubmission, OptionDraft, QuestionDraft};
use edulink::platform::Platform;
use edulink::resources::{ResourceDraft, ResourceKind};
use edulink::schools::{NewReview, NewSchool, SchoolKind};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Shared password for every seeded account.
pub(crate) const PASSWORD: &str = "edulink2031";

#[derive(Args, Debug)]
pub(crate) struct AvailabilityArgs {
    /// Date to resolve (YYYY-MM-DD). Defaults to the next Monday.
    #[arg(long, value_parser = parse_date)]
    pub(crate) demo_date: Option<NaiveDate>,
    /// Days to scan when the date has no bookable increments
    #[arg(long)]
    pub(crate) horizon_days: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// users, resources, appointments or assessments
    #[arg(long, default_value = "users", value_parser = parse_metric)]
    pub(crate) metric: Metric,
    /// First day of the range (YYYY-MM-DD). Defaults to 30 days ago.
    #[arg(long, value_parser = parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Last day of the range (YYYY-MM-DD). Defaults to 30 days ahead.
    #[arg(long, value_parser = parse_date)]
    pub(crate) to: Option<NaiveDate>,
    /// none, status, type, day or month
    #[arg(long, default_value = "none", value_parser = parse_group_by)]
    pub(crate) group_by: GroupBy,
    /// pdf, xlsx, csv, json or html
    #[arg(long, default_value = "json", value_parser = parse_format)]
    pub(crate) format: ReportFormat,
    /// Write the artifact here instead of printing it
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RunDueArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Anchor date for the seeded data (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// An in-memory platform populated with one account per role and a little
/// activity in every component.
pub(crate) struct DemoData {
    pub(crate) platform: Platform,
    pub(crate) admin_login: String,
    pub(crate) admin: Actor,
    pub(crate) advisor: Actor,
    pub(crate) teacher: Actor,
    pub(crate) student: Actor,
    pub(crate) pupil: Actor,
    /// First Monday after the anchor; the advisor's seeded booking day.
    pub(crate) monday: NaiveDate,
    pub(crate) now: NaiveDateTime,
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

fn hhmm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn next_monday(anchor: NaiveDate) -> NaiveDate {
    let offset = 7 - i64::from(anchor.weekday().num_days_from_monday());
    anchor + Duration::days(offset)
}

fn registration(username: &str, display_name: &str, profile: RoleProfile) -> RegistrationRequest {
    let document = matches!(profile, RoleProfile::Teacher(_) | RoleProfile::Advisor(_))
        .then(|| format!("{username}-credentials.pdf"));
    RegistrationRequest {
        username: username.to_string(),
        email: format!("{username}@edulink.test"),
        display_name: display_name.to_string(),
        password: PASSWORD.to_string(),
        password_confirmation: PASSWORD.to_string(),
        profile,
        verification_document: document,
    }
}

fn verified(
    platform: &Platform,
    admin: &Actor,
    view: UserView,
    now: NaiveDateTime,
) -> Result<Actor, AppError> {
    let decision = VerificationDecision {
        outcome: VerificationOutcome::Verified,
        reason: None,
    };
    let view = platform
        .accounts
        .complete_verification(admin, &view.id, decision, now)?;
    Ok(Actor::from_view(&view))
}

fn weights(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
    pairs
        .iter()
        .map(|(field, points)| (field.to_string(), *points))
        .collect()
}

fn option(label: &str, pairs: &[(&str, i64)]) -> OptionDraft {
    OptionDraft {
        label: label.to_string(),
        weights: weights(pairs),
    }
}

pub(crate) fn seed(config: &AppConfig, anchor: NaiveDate) -> Result<DemoData, AppError> {
    let platform = Platform::in_memory(config);
    let now = at(anchor, 8, 0);
    let monday = next_monday(anchor);
    let wednesday = monday + Duration::days(2);

    let admin_login = "admin".to_string();
    let admin = platform.accounts.provision_administrator(
        &admin_login,
        "admin@edulink.test",
        "Platform Admin",
        PASSWORD,
        RoleProfile::Administrator(AdministratorProfile {
            scope: AdminScope::Platform,
        }),
        now,
    )?;
    let admin = Actor::from_view(&admin);

    let advisor = platform.accounts.register(
        registration(
            "advisor",
            "Amina Diallo",
            RoleProfile::Advisor(AdvisorProfile {
                specialties: vec!["career".to_string(), "higher education".to_string()],
                organization: "EduLink Guidance".to_string(),
                cv_document: None,
            }),
        ),
        now,
    )?;
    let advisor = verified(&platform, &admin, advisor, now)?;

    let teacher = platform.accounts.register(
        registration(
            "teacher",
            "Jonas Weber",
            RoleProfile::Teacher(TeacherProfile {
                subjects: vec!["mathematics".to_string(), "physics".to_string()],
                school: None,
            }),
        ),
        now,
    )?;
    let teacher = verified(&platform, &admin, teacher, now)?;

    let student = platform.accounts.register(
        registration(
            "student",
            "Lea Martin",
            RoleProfile::Student(StudentProfile {
                institution: None,
                field_of_study: "computer science".to_string(),
                level: "bachelor".to_string(),
            }),
        ),
        now,
    )?;
    let student = Actor::from_view(&student);

    let pupil = platform.accounts.register(
        registration(
            "pupil",
            "Noah Rossi",
            RoleProfile::Pupil(PupilProfile {
                grade: "11".to_string(),
                guardian_email: Some("guardian@edulink.test".to_string()),
            }),
        ),
        now,
    )?;
    let pupil = Actor::from_view(&pupil);

    let windows = [
        (monday, hhmm(9, 0), hhmm(11, 0)),
        (wednesday, hhmm(14, 0), hhmm(16, 0)),
    ];
    for (day, start, end) in windows {
        platform.appointments.create_slot(
            &advisor,
            SlotDraft {
                day_of_week: weekday_index(day),
                start_time: start,
                end_time: end,
                recurring: true,
                start_date: None,
                end_date: None,
            },
            now,
        )?;
    }

    let booked = platform.appointments.request(
        &student,
        AppointmentRequest {
            recipient: advisor.user_id,
            schedule_time: at(monday, 9, 30),
            duration_minutes: 30,
            subject: "Choosing a master's programme".to_string(),
            notes: None,
        },
        now,
    )?;
    platform.appointments.confirm(&advisor, &booked.id, now)?;
    platform.appointments.request(
        &pupil,
        AppointmentRequest {
            recipient: advisor.user_id,
            schedule_time: at(wednesday, 14, 0),
            duration_minutes: 60,
            subject: "Orientation after secondary school".to_string(),
            notes: Some("My guardian will join.".to_string()),
        },
        now,
    )?;

    platform.resources.create(
        &teacher,
        ResourceDraft {
            title: "Linear algebra refresher".to_string(),
            description: "Worked exercises on matrices and vector spaces.".to_string(),
            kind: ResourceKind::Exercise,
            url: None,
            tags: vec!["Mathematics".to_string(), "algebra".to_string()],
            publish: true,
        },
        now,
    )?;
    platform.resources.create(
        &teacher,
        ResourceDraft {
            title: "Mechanics lecture notes".to_string(),
            description: String::new(),
            kind: ResourceKind::Document,
            url: None,
            tags: vec!["physics".to_string()],
            publish: false,
        },
        now,
    )?;

    let school = platform.schools.create_school(
        &admin,
        NewSchool {
            name: "Riverside University".to_string(),
            city: "Lyon".to_string(),
            country: "France".to_string(),
            kind: SchoolKind::University,
            website: Some("https://riverside.example.edu".to_string()),
        },
        now,
    )?;
    platform.schools.add_review(
        &student,
        &school.id,
        NewReview {
            rating: 4,
            comment: "Helpful staff and a good library.".to_string(),
        },
        now,
    )?;

    let category = platform.forum.create_category(
        &admin,
        NewCategory {
            name: "Study tips".to_string(),
            description: "Share how you prepare for exams.".to_string(),
        },
        now,
    )?;
    let thread = platform.forum.create_topic(
        &student,
        &category.id,
        NewTopic {
            title: "How do you plan revision weeks?".to_string(),
            body: "I always run out of time before finals.".to_string(),
        },
        now,
    )?;
    platform.forum.reply(
        &teacher,
        &thread.topic.id,
        NewPost {
            body: "Start with a weekly grid and leave one slack day.".to_string(),
        },
        now,
    )?;

    let assessment = platform.orientation.create_assessment(
        &advisor,
        AssessmentDraft {
            title: "Which field suits you?".to_string(),
            description: "A short interest inventory.".to_string(),
            questions: vec![
                QuestionDraft {
                    prompt: "What do you enjoy most?".to_string(),
                    options: vec![
                        option("Building things", &[("engineering", 3)]),
                        option("Helping people", &[("health", 3), ("education", 1)]),
                        option("Creating art", &[("arts", 3)]),
                    ],
                },
                QuestionDraft {
                    prompt: "Pick a weekend project".to_string(),
                    options: vec![
                        option("Repair a bike", &[("engineering", 2), ("health", 1)]),
                        option("Tutor a friend", &[("education", 2), ("arts", 2)]),
                    ],
                },
            ],
        },
        now,
    )?;
    let assessment = platform.orientation.publish(&advisor, &assessment.id)?;
    let answers = assessment
        .questions
        .iter()
        .filter_map(|question| question.options.first().map(|option| (question.id, option.id)))
        .collect();
    platform.orientation.submit_attempt(
        &pupil,
        &assessment.id,
        AttemptSubmission { answers },
        now,
    )?;

    Ok(DemoData {
        platform,
        admin_login,
        admin,
        advisor,
        teacher,
        student,
        pupil,
        monday,
        now,
    })
}

fn labels(slots: &[AvailableSlot]) -> Vec<String> {
    slots
        .iter()
        .map(|slot| format!("{}-{}", slot.start.format("%H:%M"), slot.end.format("%H:%M")))
        .collect()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn run_availability(args: AvailabilityArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let anchor = match args.demo_date {
        Some(date) => date - Duration::days(7),
        None => today(),
    };
    let demo = seed(&config, anchor)?;
    let date = args.demo_date.unwrap_or(demo.monday);
    let appointments = &demo.platform.appointments;

    let slots = appointments.availability(&demo.advisor.user_id, date, demo.now)?;
    println!("Advisor availability for {date} ({})", date.format("%A"));
    if !slots.is_empty() {
        for label in labels(&slots) {
            println!("  {label}");
        }
        return Ok(());
    }

    println!("  no bookable increments");
    let next = appointments.next_available(
        &demo.advisor.user_id,
        Some(date),
        args.horizon_days,
        demo.now,
    )?;
    match next {
        Some(next) => println!(
            "  next available on {}: {}",
            next.date,
            labels(&next.slots).join(", ")
        ),
        None => println!("  nothing free within the search horizon"),
    }
    Ok(())
}

fn emit(artifact: &Artifact, output: Option<PathBuf>) -> Result<(), AppError> {
    let textual = !matches!(artifact.format, ReportFormat::Xlsx);
    match output {
        None if textual => {
            print!("{}", String::from_utf8_lossy(&artifact.bytes));
        }
        target => {
            let path = target.unwrap_or_else(|| PathBuf::from(&artifact.filename));
            std::fs::write(&path, &artifact.bytes)?;
            println!(
                "wrote {} ({} bytes, {})",
                path.display(),
                artifact.bytes.len(),
                artifact.content_type
            );
        }
    }
    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = today();
    let demo = seed(&config, today)?;
    let request = ReportRequest {
        metric: args.metric,
        from: args.from.unwrap_or(today - Duration::days(30)),
        to: args.to.unwrap_or(today + Duration::days(30)),
        group_by: args.group_by,
        format: args.format,
    };
    let artifact = demo.platform.analytics.report(&demo.admin, &request)?;
    emit(&artifact, args.output)
}

pub(crate) fn run_due_reports(args: RunDueArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let today = args.today.unwrap_or_else(today);
    let demo = seed(&config, today)?;
    let analytics = &demo.platform.analytics;
    analytics.schedule(
        &demo.admin,
        ScheduleDraft {
            name: "Weekly appointments".to_string(),
            metric: Metric::Appointments,
            group_by: GroupBy::Status,
            format: ReportFormat::Csv,
            frequency: Frequency::Weekly,
            window_days: 7,
            first_run: Some(today),
        },
        demo.now,
    )?;

    let runs = analytics.run_due_as(&demo.admin, demo.now)?;
    println!("Generated {} scheduled report(s)", runs.len());
    for run in runs {
        println!("  {}: {} (next run {})", run.name, run.filename, run.next_run);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let anchor = args.today.unwrap_or_else(today);
    let demo = seed(&config, anchor)?;
    let platform = &demo.platform;

    println!("EduLink demo (anchor {anchor})");
    println!(
        "  accounts: admin, advisor, teacher, student, pupil (password {PASSWORD})"
    );

    let slots = platform
        .appointments
        .availability(&demo.advisor.user_id, demo.monday, demo.now)?;
    println!(
        "\nAdvisor availability on {}: {}",
        demo.monday,
        labels(&slots).join(", ")
    );
    let booked = platform.appointments.list_for(&demo.student, None)?;
    for appointment in &booked {
        println!(
            "  student booking: {} at {} ({})",
            appointment.subject,
            appointment.schedule_time,
            appointment.status.label()
        );
    }

    let dashboard = platform.analytics.dashboard(&demo.admin, anchor)?;
    println!("\nDashboard as of {}", dashboard.as_of);
    println!(
        "  users {} (verified {}, pending {})",
        dashboard.total_users, dashboard.verified_users, dashboard.pending_verifications
    );
    println!(
        "  published resources {}, upcoming appointments {}, completed attempts {}",
        dashboard.published_resources, dashboard.upcoming_appointments, dashboard.completed_attempts
    );

    let request = ReportRequest {
        metric: Metric::Appointments,
        from: anchor,
        to: anchor + Duration::days(14),
        group_by: GroupBy::Status,
        format: ReportFormat::Csv,
    };
    let artifact = platform.analytics.report(&demo.admin, &request)?;
    println!("\nReport {}", artifact.filename);
    print!("{}", String::from_utf8_lossy(&artifact.bytes));

    let reminder_time = at(demo.monday - Duration::days(1), 9, 30);
    let sent = platform.appointments.dispatch_due_reminders(reminder_time)?;
    println!("\nReminders dispatched at {reminder_time}: {sent}");
    for actor in [&demo.student, &demo.advisor] {
        for notification in platform.notifications.list_for(&actor.user_id)? {
            println!("  [{}] {}", actor.role.label(), notification.message);
        }
    }

    let attempts = platform.orientation.attempts_for(&demo.pupil)?;
    if let Some(field) = attempts.last().and_then(|attempt| attempt.top_field()) {
        println!("\nPupil's top orientation field: {field}");
    }
    let topics = platform.forum.categories()?;
    println!("Forum categories: {}", topics.len());
    println!("Teacher account verified: {}", demo.teacher.is_verified());
    Ok(())
}
