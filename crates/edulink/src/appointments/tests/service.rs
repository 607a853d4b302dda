use std::thread;

use super::common::*;
use crate::accounts::Role;
use crate::appointments::{
    AppointmentError, AppointmentRepository, AppointmentStatus, ExceptionDraft, RescheduleRequest,
};
use crate::notifications::NotificationKind;
use crate::store::RepositoryError;
use crate::testing::{actor, at};

#[test]
fn monday_availability_skips_the_confirmed_appointment() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    let appointment = book(&fixture, &student, 9, 30);

    let before = fixture
        .service
        .availability(&fixture.advisor.user_id, monday(), now())
        .expect("availability");
    assert_eq!(before.len(), 4, "pending requests do not hold time");

    fixture
        .service
        .confirm(&fixture.advisor, &appointment.id, now())
        .expect("confirmed");
    let after = fixture
        .service
        .availability(&fixture.advisor.user_id, monday(), now())
        .expect("availability");
    assert_eq!(labels(&after), vec!["09:00-09:30", "10:00-10:30", "10:30-11:00"]);
}

#[test]
fn all_day_exception_leaves_no_availability() {
    let fixture = build_fixture();
    fixture
        .service
        .add_exception(
            &fixture.advisor,
            ExceptionDraft {
                date: monday(),
                start_time: None,
                end_time: None,
                all_day: true,
                reason: Some("Conference".to_string()),
            },
            now(),
        )
        .expect("exception");

    let slots = fixture
        .service
        .availability(&fixture.advisor.user_id, monday(), now())
        .expect("availability");
    assert!(slots.is_empty());

    let student = enroll(&fixture.accounts, Role::Student);
    let error = fixture
        .service
        .request(&student, booking(&fixture.advisor, 9, 0, 30), now())
        .expect_err("day blocked");
    assert!(matches!(error, AppointmentError::Unavailable));
}

#[test]
fn bookings_outside_the_slot_are_unavailable() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    let error = fixture
        .service
        .request(&student, booking(&fixture.advisor, 10, 30, 60), now())
        .expect_err("runs past 11:00");
    assert!(matches!(error, AppointmentError::Unavailable));
}

#[test]
fn request_validation_collects_every_field() {
    let fixture = build_fixture();
    let mut request = booking(&fixture.advisor, 9, 0, 0);
    request.recipient = fixture.advisor.user_id;
    request.schedule_time = at(2, 1, 9, 0);

    match fixture.service.request(&fixture.advisor, request, now()) {
        Err(AppointmentError::Validation(errors)) => {
            assert!(errors.has("recipient"));
            assert!(errors.has("duration_minutes"));
            assert!(errors.has("schedule_time"));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn concurrent_requests_for_one_window_book_exactly_once() {
    let fixture = build_fixture();
    let requesters: Vec<_> = (0..8)
        .map(|_| enroll(&fixture.accounts, Role::Student))
        .collect();

    let outcomes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = requesters
            .iter()
            .map(|requester| {
                let service = fixture.service.clone();
                let request = booking(&fixture.advisor, 10, 0, 30);
                scope.spawn(move || service.request(requester, request, now()))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread finished"))
            .collect()
    });

    let booked = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let refused = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(AppointmentError::DoubleBooked)))
        .count();
    assert_eq!(booked, 1);
    assert_eq!(refused, 7);
}

#[test]
fn terminal_appointments_cannot_be_cancelled() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    let appointment = book(&fixture, &student, 9, 0);

    let cancelled = fixture
        .service
        .cancel(&student, &appointment.id, Some("  exam clash ".to_string()), now())
        .expect("cancelled");
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("exam clash"));

    let error = fixture
        .service
        .cancel(&fixture.advisor, &appointment.id, None, now())
        .expect_err("already cancelled");
    assert!(matches!(error, AppointmentError::InvalidTransition { .. }));

    let second = book(&fixture, &student, 9, 0);
    fixture.service.confirm(&fixture.advisor, &second.id, now()).expect("confirm");
    fixture
        .service
        .complete(&fixture.advisor, &second.id, at(3, 3, 9, 40))
        .expect("complete");
    let error = fixture
        .service
        .cancel(&student, &second.id, None, at(3, 3, 10, 0))
        .expect_err("completed");
    assert!(matches!(error, AppointmentError::InvalidTransition { from: "completed", .. }));
}

#[test]
fn writes_from_a_stale_read_are_refused() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    let appointment = book(&fixture, &student, 9, 0);
    fixture.service.confirm(&fixture.advisor, &appointment.id, now()).expect("confirm");

    let mut stale = fixture
        .repository
        .fetch(&appointment.id)
        .expect("fetch")
        .expect("stored");
    fixture
        .service
        .cancel(&student, &appointment.id, None, now())
        .expect("cancelled");

    stale.status = AppointmentStatus::Completed;
    let result = fixture
        .repository
        .update_if_status(stale.clone(), AppointmentStatus::Confirmed);
    assert_eq!(result, Err(RepositoryError::Stale));

    stale.schedule_time = monday().and_time(time(10, 0));
    let result = fixture
        .repository
        .update_if_free(stale, AppointmentStatus::Confirmed, Vec::new());
    assert!(matches!(result, Err(RepositoryError::Stale)));

    let stored = fixture
        .service
        .get(&student, &appointment.id)
        .expect("readable");
    assert_eq!(stored.status, AppointmentStatus::Cancelled);
    assert_eq!(stored.schedule_time, monday().and_time(time(9, 0)));
}

#[test]
fn racing_cancel_and_complete_settle_on_one_outcome() {
    for _ in 0..16 {
        let fixture = build_fixture();
        let student = enroll(&fixture.accounts, Role::Student);
        let appointment = book(&fixture, &student, 9, 0);
        fixture.service.confirm(&fixture.advisor, &appointment.id, now()).expect("confirm");

        let (cancelled, completed) = thread::scope(|scope| {
            let cancel = scope.spawn(|| {
                fixture
                    .service
                    .cancel(&student, &appointment.id, None, at(3, 3, 9, 40))
            });
            let complete = scope.spawn(|| {
                fixture
                    .service
                    .complete(&fixture.advisor, &appointment.id, at(3, 3, 9, 40))
            });
            (
                cancel.join().expect("thread finished"),
                complete.join().expect("thread finished"),
            )
        });

        assert_ne!(cancelled.is_ok(), completed.is_ok(), "exactly one transition wins");
        let loser = cancelled.as_ref().err().or(completed.as_ref().err());
        assert!(matches!(loser, Some(AppointmentError::InvalidTransition { .. })));

        let stored = fixture
            .service
            .get(&student, &appointment.id)
            .expect("readable");
        let winner = cancelled.or(completed).expect("one transition succeeded");
        assert_eq!(stored.status, winner.status);
        assert!(stored.status.is_terminal());
    }
}

#[test]
fn only_the_recipient_confirms_and_strangers_cannot_look() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    let appointment = book(&fixture, &student, 9, 0);

    let error = fixture
        .service
        .confirm(&student, &appointment.id, now())
        .expect_err("requester cannot confirm");
    assert!(matches!(error, AppointmentError::Forbidden(_)));

    let error = fixture
        .service
        .get(&actor(Role::Student), &appointment.id)
        .expect_err("stranger");
    assert!(matches!(error, AppointmentError::Forbidden(_)));
    fixture
        .service
        .get(&actor(Role::Administrator), &appointment.id)
        .expect("admins may read");
}

#[test]
fn reschedule_moves_the_window_and_checks_collisions() {
    let fixture = build_fixture();
    let first = enroll(&fixture.accounts, Role::Student);
    let second = enroll(&fixture.accounts, Role::Pupil);
    let appointment = book(&fixture, &first, 9, 0);
    book(&fixture, &second, 10, 0);

    let moved = fixture
        .service
        .reschedule(
            &first,
            &appointment.id,
            RescheduleRequest {
                schedule_time: monday().and_time(time(9, 30)),
                duration_minutes: None,
            },
            now(),
        )
        .expect("overlapping its own old window is fine");
    assert_eq!(moved.status, AppointmentStatus::Rescheduled);
    assert_eq!(moved.end_time, monday().and_time(time(10, 0)));

    let error = fixture
        .service
        .reschedule(
            &first,
            &appointment.id,
            RescheduleRequest {
                schedule_time: monday().and_time(time(10, 0)),
                duration_minutes: Some(60),
            },
            now(),
        )
        .expect_err("collides with the 10:00 booking");
    assert!(matches!(error, AppointmentError::DoubleBooked));
}

#[test]
fn reminders_are_sent_once_to_both_participants() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    book(&fixture, &student, 9, 0);

    assert_eq!(
        fixture.service.dispatch_due_reminders(at(3, 2, 8, 59)).expect("dispatch"),
        0
    );
    assert_eq!(
        fixture.service.dispatch_due_reminders(at(3, 2, 9, 0)).expect("dispatch"),
        1,
        "the day-before reminder"
    );
    assert_eq!(
        fixture.service.dispatch_due_reminders(at(3, 2, 12, 0)).expect("dispatch"),
        0
    );

    let reminders: Vec<_> = fixture
        .inbox
        .list_for(&student.user_id)
        .expect("inbox")
        .into_iter()
        .filter(|notification| notification.message.starts_with("Reminder"))
        .collect();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].kind, NotificationKind::Appointment);
    assert!(reminders[0].message.ends_with("in 1 day"));

    let advisor_inbox = fixture.inbox.list_for(&fixture.advisor.user_id).expect("inbox");
    assert_eq!(advisor_inbox.len(), 2, "request notice plus reminder");
}

#[test]
fn cancelled_appointments_drop_pending_reminders() {
    let fixture = build_fixture();
    let student = enroll(&fixture.accounts, Role::Student);
    let appointment = book(&fixture, &student, 9, 0);
    fixture
        .service
        .cancel(&student, &appointment.id, None, now())
        .expect("cancelled");

    assert_eq!(
        fixture.service.dispatch_due_reminders(at(3, 3, 8, 30)).expect("dispatch"),
        0
    );
}

#[test]
fn next_available_finds_the_coming_monday() {
    let fixture = build_fixture();
    let found = fixture
        .service
        .next_available(&fixture.advisor.user_id, None, None, now())
        .expect("scan")
        .expect("monday has time");
    assert_eq!(found.date, monday());
    assert_eq!(found.slots.len(), 4);

    let none = fixture
        .service
        .next_available(&fixture.advisor.user_id, None, Some(2), now())
        .expect("scan");
    assert!(none.is_none());
}

#[test]
fn next_available_rejects_horizons_outside_one_year() {
    let fixture = build_fixture();
    for horizon in [0, 366, 100_000] {
        match fixture
            .service
            .next_available(&fixture.advisor.user_id, None, Some(horizon), now())
        {
            Err(AppointmentError::Validation(errors)) => assert!(errors.has("horizon_days")),
            other => panic!("expected a horizon error for {horizon}, got {other:?}"),
        }
    }
    assert!(fixture
        .service
        .next_available(&fixture.advisor.user_id, None, Some(365), now())
        .expect("full year scan")
        .is_some());
}
