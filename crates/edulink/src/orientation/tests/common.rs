use std::collections::BTreeMap;
use std::sync::Arc;

use crate::accounts::Role;
use crate::ids::{OptionId, QuestionId};
use crate::orientation::{
    Assessment, AssessmentDraft, AttemptSubmission, OptionDraft, OrientationService, QuestionDraft,
};
use crate::store::memory::MemoryOrientation;
use crate::testing::{actor, at};

pub(super) type Service = OrientationService<MemoryOrientation>;

pub(super) fn build_service() -> Arc<Service> {
    Arc::new(OrientationService::new(Arc::new(MemoryOrientation::default())))
}

fn option(label: &str, weights: &[(&str, i64)]) -> OptionDraft {
    OptionDraft {
        label: label.to_string(),
        weights: weights
            .iter()
            .map(|(field, points)| (field.to_string(), *points))
            .collect(),
    }
}

/// Two questions leaning towards engineering, health or arts.
pub(super) fn career_draft() -> AssessmentDraft {
    AssessmentDraft {
        title: "Career interests".to_string(),
        description: "Which field suits you?".to_string(),
        questions: vec![
            QuestionDraft {
                prompt: "What do you enjoy most?".to_string(),
                options: vec![
                    option("Building things", &[("Engineering", 3)]),
                    option("Caring for people", &[("health", 3), ("education", 1)]),
                    option("Drawing", &[("arts", 3)]),
                ],
            },
            QuestionDraft {
                prompt: "Favourite subject?".to_string(),
                options: vec![
                    option("Physics", &[("engineering", 2), ("health", 1)]),
                    option("Literature", &[("arts", 2), ("education", 2)]),
                ],
            },
        ],
    }
}

pub(super) fn authored(service: &Service, publish: bool) -> Assessment {
    let advisor = actor(Role::Advisor);
    let assessment = service
        .create_assessment(&advisor, career_draft(), at(2, 1, 9, 0))
        .expect("assessment created");
    if publish {
        service.publish(&advisor, &assessment.id).expect("published")
    } else {
        assessment
    }
}

/// Choose the option at `choices[i]` for question `i`.
pub(super) fn answers(assessment: &Assessment, choices: &[usize]) -> AttemptSubmission {
    let answers: BTreeMap<QuestionId, OptionId> = assessment
        .questions
        .iter()
        .zip(choices)
        .map(|(question, choice)| (question.id, question.options[*choice].id))
        .collect();
    AttemptSubmission { answers }
}
