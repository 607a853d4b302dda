use super::common::*;
use crate::accounts::Role;
use crate::ids::{AssessmentId, OptionId};
use crate::orientation::OrientationError;
use crate::testing::{actor, at};

#[test]
fn only_authors_create_assessments() {
    let service = build_service();
    let error = service
        .create_assessment(&actor(Role::Teacher), career_draft(), at(2, 1, 9, 0))
        .expect_err("teachers do not author assessments");
    assert!(matches!(error, OrientationError::Forbidden(_)));
}

#[test]
fn invalid_drafts_report_indexed_fields() {
    let service = build_service();
    let mut draft = career_draft();
    draft.questions[1].options.truncate(1);
    draft.questions[0].options[0]
        .weights
        .insert("medicine".to_string(), -2);

    match service.create_assessment(&actor(Role::Administrator), draft, at(2, 1, 9, 0)) {
        Err(OrientationError::Validation(errors)) => {
            assert!(errors.has("questions[1].options"));
            assert!(errors.has("questions[0].options[0].weights.medicine"));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn weights_are_normalised_to_lowercase_fields() {
    let service = build_service();
    let assessment = authored(&service, false);
    let first = &assessment.questions[0].options[0];
    assert_eq!(first.weights.get("engineering"), Some(&3));
    assert!(!assessment.published);
}

#[test]
fn unpublished_assessments_refuse_attempts() {
    let service = build_service();
    let assessment = authored(&service, false);
    let error = service
        .submit_attempt(&actor(Role::Pupil), &assessment.id, answers(&assessment, &[0, 0]), at(2, 2, 9, 0))
        .expect_err("draft");
    assert!(matches!(error, OrientationError::NotPublished));

    let error = service
        .submit_attempt(&actor(Role::Pupil), &AssessmentId::new(), answers(&assessment, &[0, 0]), at(2, 2, 9, 0))
        .expect_err("unknown");
    assert!(matches!(error, OrientationError::NotFound));
}

#[test]
fn drafts_are_listed_for_authors_only() {
    let service = build_service();
    authored(&service, false);
    assert!(service.list(&actor(Role::Student)).expect("list").is_empty());
    assert_eq!(service.list(&actor(Role::Advisor)).expect("list").len(), 1);
}

#[test]
fn attempt_ranks_career_fields() {
    let service = build_service();
    let assessment = authored(&service, true);
    let pupil = actor(Role::Pupil);

    let attempt = service
        .submit_attempt(&pupil, &assessment.id, answers(&assessment, &[0, 0]), at(2, 2, 9, 0))
        .expect("scored");
    assert_eq!(attempt.scores.get("engineering"), Some(&5));
    assert_eq!(attempt.scores.get("health"), Some(&1));
    assert_eq!(attempt.top_field(), Some("engineering"));
    assert_eq!(attempt.recommendations[0].rank, 1);
    assert!((attempt.recommendations[0].share - 5.0 / 6.0).abs() < 1e-9);

    service
        .submit_attempt(&pupil, &assessment.id, answers(&assessment, &[2, 1]), at(2, 3, 9, 0))
        .expect("scored");
    let latest = service.latest_recommendations(&pupil).expect("latest");
    assert_eq!(latest[0].field, "arts");
    assert_eq!(service.attempts_for(&pupil).expect("history").len(), 2);
}

#[test]
fn every_question_needs_a_known_answer() {
    let service = build_service();
    let assessment = authored(&service, true);
    let mut submission = answers(&assessment, &[0]);
    let first = assessment.questions[0].id;
    submission.answers.insert(first, OptionId::new());

    let error = service
        .submit_attempt(&actor(Role::Student), &assessment.id, submission, at(2, 2, 9, 0))
        .expect_err("incomplete answers");
    match error {
        OrientationError::Validation(errors) => {
            assert!(errors.has(&format!("answers.{first}")));
            assert!(errors.has(&format!("answers.{}", assessment.questions[1].id)));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}
