use crate::ai::AiGateway;
use crate::form::question::{AnswerSet, QuestionDescriptor};
use crate::model::UserProfile;
use std::sync::Arc;

/// Turns scraped question descriptors into validated answers.
///
/// One batched AI call covers all questions on a step. Whatever comes back
/// is validated against each question's allowed values before it is acted
/// on; any gateway failure yields an empty answer set and the step
/// continues on fallbacks. The resolver never fails the task.
pub struct AnswerResolver {
    gateway: Arc<AiGateway>,
}

impl AnswerResolver {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self { gateway }
    }

    /// Resolve answers for one step. Empty input returns an empty map
    /// without issuing any AI call.
    pub fn resolve(
        &self,
        user_id: u64,
        questions: &[QuestionDescriptor],
        job_description: &str,
        resume_text: &str,
        profile: &UserProfile,
    ) -> AnswerSet {
        if questions.is_empty() {
            return AnswerSet::new();
        }

        let raw = match self.gateway.answer_questions(
            user_id,
            questions,
            job_description,
            resume_text,
            profile,
        ) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Answer resolution degraded to fallback: {}", e);
                return AnswerSet::new();
            }
        };

        validate_answers(questions, raw)
    }
}

/// Validate raw AI answers against the step's questions.
///
/// Answers for unknown question ids are dropped. For constrained kinds
/// (select/radio) the value must be a member of the allowed values: exact
/// match is kept, a case-insensitive match is corrected to canonical
/// casing, and anything else is substituted with the first allowed value.
/// Output preserves the on-page question order.
fn validate_answers(questions: &[QuestionDescriptor], raw: AnswerSet) -> AnswerSet {
    let mut validated = AnswerSet::new();

    for question in questions {
        let Some(answer) = raw.get(&question.id) else {
            continue;
        };

        if !question.kind.is_constrained() {
            validated.insert(question.id.clone(), answer.clone());
            continue;
        }

        match question.canonical_option(answer) {
            Some(canonical) => {
                validated.insert(question.id.clone(), canonical.to_string());
            }
            None => {
                if let Some(first) = question.first_option() {
                    log::warn!(
                        "Answer '{}' for '{}' is not an allowed value, substituting '{}'",
                        answer,
                        question.prompt,
                        first
                    );
                    validated.insert(question.id.clone(), first.to_string());
                } else {
                    log::warn!(
                        "Question '{}' is constrained but offers no values, dropping answer",
                        question.prompt
                    );
                }
            }
        }
    }

    validated
}
