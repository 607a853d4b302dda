use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ids::{AssessmentId, AttemptId, OptionId, QuestionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub label: String,
    /// Points contributed to each career field when this option is chosen.
    pub weights: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == *id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub published: bool,
    pub created_by: UserId,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub field: String,
    pub score: u32,
    /// Share of the attempt's total score, between 0 and 1.
    pub share: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub assessment: AssessmentId,
    pub user: UserId,
    pub answers: BTreeMap<QuestionId, OptionId>,
    pub scores: BTreeMap<String, u32>,
    pub recommendations: Vec<Recommendation>,
    pub completed_at: NaiveDateTime,
}

impl Attempt {
    pub fn top_field(&self) -> Option<&str> {
        self.recommendations
            .first()
            .map(|recommendation| recommendation.field.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionDraft {
    pub label: String,
    #[serde(default)]
    pub weights: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: Vec<OptionDraft>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttemptSubmission {
    pub answers: BTreeMap<QuestionId, OptionId>,
}
