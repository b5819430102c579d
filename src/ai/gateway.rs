use crate::ai::client::LanguageModel;
use crate::ai::ledger::UsageLedger;
use crate::ai::prompts;
use crate::error::EngineError;
use crate::form::question::{AnswerSet, QuestionDescriptor};
use crate::model::{CallKind, CallOutcome, ResumeCandidate, UsageRecord, UserProfile};
use std::sync::Arc;
use thiserror::Error;

/// Uniform failure surface for AI calls. Callers never see transport-level
/// errors; every variant means "no answer available, use the fallback".
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("call rejected by rate limit")]
    RateLimited,

    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("AI reply malformed: {0}")]
    Malformed(String),
}

impl From<GatewayError> for EngineError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RateLimited => EngineError::AiRateLimited,
            GatewayError::Unavailable(msg) => EngineError::AiUnavailable(msg),
            GatewayError::Malformed(msg) => EngineError::AiMalformedResponse(msg),
        }
    }
}

/// Rate-limited wrapper around the answering model.
///
/// Every attempted call is accounted in the [`UsageLedger`] with token
/// counts and outcome, whether or not it succeeded. A rejected call (rate
/// limit) is never sent to the model at all.
pub struct AiGateway {
    model: Box<dyn LanguageModel>,
    ledger: Arc<UsageLedger>,
}

impl AiGateway {
    pub fn new(model: Box<dyn LanguageModel>, ledger: Arc<UsageLedger>) -> Self {
        Self { model, ledger }
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// One batched call answering every question on a step. The reply is
    /// shape-validated into an id → answer map; membership validation of
    /// constrained answers is the resolver's job.
    pub fn answer_questions(
        &self,
        user_id: u64,
        questions: &[QuestionDescriptor],
        job_description: &str,
        resume_text: &str,
        profile: &UserProfile,
    ) -> Result<AnswerSet, GatewayError> {
        let prompt =
            prompts::answer_questions_prompt(questions, job_description, resume_text, profile);
        let text = self.call(user_id, CallKind::AnswerQuestions, &prompt)?;

        let body = strip_json_fences(&text);
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body)
            .map_err(|e| GatewayError::Malformed(format!("expected JSON object: {}", e)))?;

        let mut answers = AnswerSet::new();
        for (id, value) in raw {
            let answer = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    log::warn!("Dropping non-scalar answer for '{}': {}", id, other);
                    continue;
                }
            };
            answers.insert(id, answer);
        }
        Ok(answers)
    }

    /// One ranking call. The reply is parsed as a bare resume id;
    /// membership in the candidate set is the selector's job.
    pub fn rank_resumes(
        &self,
        user_id: u64,
        job_description: &str,
        candidates: &[ResumeCandidate],
    ) -> Result<u64, GatewayError> {
        let prompt = prompts::rank_resumes_prompt(job_description, candidates);
        let text = self.call(user_id, CallKind::RankResumes, &prompt)?;

        strip_json_fences(&text)
            .trim()
            .parse::<u64>()
            .map_err(|_| GatewayError::Malformed(format!("expected a resume id, got '{}'", text.trim())))
    }

    /// Rate check, model call, usage accounting. The accounting entry is
    /// written for every attempted call regardless of outcome.
    fn call(&self, user_id: u64, kind: CallKind, prompt: &str) -> Result<String, GatewayError> {
        if !self.ledger.try_acquire(user_id) {
            log::warn!("Rate limit rejected {:?} call for user {}", kind, user_id);
            return Err(GatewayError::RateLimited);
        }

        match self.model.generate(prompt) {
            Ok(completion) => {
                self.ledger.record(UsageRecord {
                    user_id,
                    kind,
                    input_tokens: completion.input_tokens,
                    output_tokens: completion.output_tokens,
                    outcome: CallOutcome::Success,
                    error: None,
                    at: chrono::Utc::now(),
                });
                Ok(completion.text)
            }
            Err(e) => {
                self.ledger.record(UsageRecord {
                    user_id,
                    kind,
                    input_tokens: 0,
                    output_tokens: 0,
                    outcome: CallOutcome::Error,
                    error: Some(e.to_string()),
                    at: chrono::Utc::now(),
                });
                Err(GatewayError::Unavailable(e.to_string()))
            }
        }
    }
}

/// Strip ```json ... ``` or ``` ... ``` fences models like to wrap JSON in.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim_start())
    } else {
        text
    }
}
