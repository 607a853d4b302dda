//! Attempt scoring: sum option weights per field and rank the fields.

use std::collections::BTreeMap;

use super::domain::{Assessment, Recommendation};
use crate::ids::{OptionId, QuestionId};
use crate::validation::ValidationErrors;

pub const RECOMMENDATION_LIMIT: usize = 3;

/// Sum the chosen options' weights; every question needs a known option.
pub fn score(
    assessment: &Assessment,
    answers: &BTreeMap<QuestionId, OptionId>,
) -> Result<BTreeMap<String, u32>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut totals: BTreeMap<String, u32> = BTreeMap::new();

    for question in &assessment.questions {
        let field = format!("answers.{}", question.id);
        let Some(choice) = answers.get(&question.id) else {
            errors.add(&field, "this question must be answered");
            continue;
        };
        match question.option(choice) {
            Some(option) => {
                for (career, points) in &option.weights {
                    let entry = totals.entry(career.clone()).or_default();
                    *entry = entry.saturating_add(*points);
                }
            }
            None => errors.add(&field, "unknown option for this question"),
        }
    }
    for question in answers.keys() {
        if !assessment.questions.iter().any(|known| known.id == *question) {
            errors.add(
                &format!("answers.{question}"),
                "question does not belong to this assessment",
            );
        }
    }

    errors.into_result()?;
    Ok(totals)
}

/// Highest scores first, ties broken by field name; at most three entries.
pub fn recommend(scores: &BTreeMap<String, u32>) -> Vec<Recommendation> {
    let total: u64 = scores.values().map(|score| u64::from(*score)).sum();
    let mut ranked: Vec<(&String, &u32)> = scores.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(RECOMMENDATION_LIMIT)
        .enumerate()
        .map(|(index, (field, score))| Recommendation {
            field: field.clone(),
            score: *score,
            share: if total == 0 {
                0.0
            } else {
                f64::from(*score) / total as f64
            },
            rank: index + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AssessmentId, UserId};
    use crate::orientation::domain::{AnswerOption, Question};
    use chrono::NaiveDate;

    fn option(label: &str, weights: &[(&str, u32)]) -> AnswerOption {
        AnswerOption {
            id: OptionId::new(),
            label: label.to_string(),
            weights: weights
                .iter()
                .map(|(field, points)| (field.to_string(), *points))
                .collect(),
        }
    }

    fn assessment() -> Assessment {
        Assessment {
            id: AssessmentId::new(),
            title: "Interests".to_string(),
            description: String::new(),
            questions: vec![
                Question {
                    id: QuestionId::new(),
                    prompt: "Favourite subject?".to_string(),
                    options: vec![
                        option("Physics", &[("engineering", 3), ("science", 2)]),
                        option("Drawing", &[("arts", 3)]),
                    ],
                },
                Question {
                    id: QuestionId::new(),
                    prompt: "Weekend project?".to_string(),
                    options: vec![
                        option("Build a robot", &[("engineering", 2)]),
                        option("Volunteer", &[("health", 2), ("education", 1)]),
                    ],
                },
            ],
            published: true,
            created_by: UserId::new(),
            created_at: NaiveDate::from_ymd_opt(2031, 1, 1)
                .and_then(|date| date.and_hms_opt(8, 0, 0))
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn scores_sum_per_field() {
        let assessment = assessment();
        let answers = BTreeMap::from([
            (assessment.questions[0].id, assessment.questions[0].options[0].id),
            (assessment.questions[1].id, assessment.questions[1].options[1].id),
        ]);
        let scores = score(&assessment, &answers).expect("complete answers");
        assert_eq!(scores.get("engineering"), Some(&3));
        assert_eq!(scores.get("health"), Some(&2));
        assert_eq!(scores.get("arts"), None);
    }

    #[test]
    fn unanswered_and_unknown_options_are_reported() {
        let assessment = assessment();
        let answers = BTreeMap::from([(assessment.questions[0].id, OptionId::new())]);
        let errors = score(&assessment, &answers).expect_err("incomplete");
        assert!(errors.has(&format!("answers.{}", assessment.questions[0].id)));
        assert!(errors.has(&format!("answers.{}", assessment.questions[1].id)));
    }

    #[test]
    fn recommendations_rank_top_three_with_shares() {
        let scores = BTreeMap::from([
            ("arts".to_string(), 2),
            ("engineering".to_string(), 5),
            ("health".to_string(), 2),
            ("science".to_string(), 1),
        ]);
        let ranked = recommend(&scores);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].field, "engineering");
        assert_eq!(ranked[0].rank, 1);
        assert!((ranked[0].share - 0.5).abs() < f64::EPSILON);
        assert_eq!(ranked[1].field, "arts");
        assert_eq!(ranked[2].field, "health");
    }

    #[test]
    fn zero_total_yields_zero_shares() {
        let scores = BTreeMap::from([("arts".to_string(), 0)]);
        let ranked = recommend(&scores);
        assert_eq!(ranked[0].share, 0.0);
    }
}
