use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use super::domain::{
    AnswerOption, Assessment, AssessmentDraft, Attempt, AttemptSubmission, Question,
    Recommendation,
};
use super::repository::OrientationRepository;
use super::scoring;
use super::OrientationError;
use crate::accounts::Role;
use crate::auth::Actor;
use crate::ids::{AssessmentId, AttemptId, OptionId, QuestionId};
use crate::validation::{required_text, ValidationErrors};

const AUTHORS: &[Role] = &[Role::Administrator, Role::Advisor];

pub struct OrientationService<R> {
    repository: Arc<R>,
}

impl<R> OrientationService<R>
where
    R: OrientationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create_assessment(
        &self,
        actor: &Actor,
        draft: AssessmentDraft,
        now: NaiveDateTime,
    ) -> Result<Assessment, OrientationError> {
        actor.require_role(AUTHORS, "author assessments")?;
        let mut errors = ValidationErrors::new();
        let title = required_text(&mut errors, "title", &draft.title, 200);
        errors.check(
            draft.questions.is_empty(),
            "questions",
            "an assessment needs at least one question",
        );

        let mut questions = Vec::with_capacity(draft.questions.len());
        for (q_index, question) in draft.questions.into_iter().enumerate() {
            let prefix = format!("questions[{q_index}]");
            let prompt = required_text(&mut errors, &format!("{prefix}.prompt"), &question.prompt, 500);
            errors.check(
                question.options.len() < 2,
                &format!("{prefix}.options"),
                "each question needs at least two options",
            );
            let mut options = Vec::with_capacity(question.options.len());
            for (o_index, option) in question.options.into_iter().enumerate() {
                let option_prefix = format!("{prefix}.options[{o_index}]");
                let label = required_text(&mut errors, &format!("{option_prefix}.label"), &option.label, 200);
                let mut weights = BTreeMap::new();
                for (field, points) in option.weights {
                    let field = field.trim().to_lowercase();
                    if field.is_empty() {
                        errors.add(&format!("{option_prefix}.weights"), "career field may not be blank");
                        continue;
                    }
                    match u32::try_from(points) {
                        Ok(points) => {
                            weights.insert(field, points);
                        }
                        Err(_) => errors.add(
                            &format!("{option_prefix}.weights.{field}"),
                            "weights must be non-negative",
                        ),
                    }
                }
                options.push(AnswerOption {
                    id: OptionId::new(),
                    label,
                    weights,
                });
            }
            questions.push(Question {
                id: QuestionId::new(),
                prompt,
                options,
            });
        }
        errors.into_result()?;

        let assessment = self.repository.insert_assessment(Assessment {
            id: AssessmentId::new(),
            title,
            description: draft.description.trim().to_string(),
            questions,
            published: false,
            created_by: actor.user_id,
            created_at: now,
        })?;
        info!(
            assessment_id = %assessment.id,
            questions = assessment.questions.len(),
            "assessment created"
        );
        Ok(assessment)
    }

    pub fn publish(&self, actor: &Actor, id: &AssessmentId) -> Result<Assessment, OrientationError> {
        actor.require_role(AUTHORS, "publish assessments")?;
        let mut assessment = self.load(id)?;
        if !assessment.published {
            assessment.published = true;
            self.repository.update_assessment(assessment.clone())?;
            info!(assessment_id = %id, "assessment published");
        }
        Ok(assessment)
    }

    /// Published assessments, plus drafts for authors.
    pub fn list(&self, actor: &Actor) -> Result<Vec<Assessment>, OrientationError> {
        let can_author = AUTHORS.contains(&actor.role);
        let mut assessments: Vec<Assessment> = self
            .repository
            .list_assessments()?
            .into_iter()
            .filter(|assessment| assessment.published || can_author)
            .collect();
        assessments.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(assessments)
    }

    pub fn submit_attempt(
        &self,
        actor: &Actor,
        id: &AssessmentId,
        submission: AttemptSubmission,
        now: NaiveDateTime,
    ) -> Result<Attempt, OrientationError> {
        let assessment = self.load(id)?;
        if !assessment.published {
            return Err(OrientationError::NotPublished);
        }
        let scores = scoring::score(&assessment, &submission.answers)?;
        let recommendations = scoring::recommend(&scores);
        let attempt = self.repository.insert_attempt(Attempt {
            id: AttemptId::new(),
            assessment: assessment.id,
            user: actor.user_id,
            answers: submission.answers,
            scores,
            recommendations,
            completed_at: now,
        })?;
        info!(
            attempt_id = %attempt.id,
            assessment_id = %id,
            top = attempt.top_field().unwrap_or("none"),
            "attempt scored"
        );
        Ok(attempt)
    }

    /// The caller's attempts, newest first.
    pub fn attempts_for(&self, actor: &Actor) -> Result<Vec<Attempt>, OrientationError> {
        let mut attempts = self.repository.attempts_for(&actor.user_id)?;
        attempts.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(attempts)
    }

    pub fn latest_recommendations(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Recommendation>, OrientationError> {
        Ok(self
            .attempts_for(actor)?
            .into_iter()
            .next()
            .map(|attempt| attempt.recommendations)
            .unwrap_or_default())
    }

    fn load(&self, id: &AssessmentId) -> Result<Assessment, OrientationError> {
        self.repository
            .fetch_assessment(id)?
            .ok_or(OrientationError::NotFound)
    }
}
