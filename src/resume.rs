use crate::ai::AiGateway;
use crate::model::ResumeCandidate;
use std::sync::Arc;

/// Picks the resume to submit with an application.
///
/// Trivial cases never touch the AI: no candidates means no resume, and a
/// single candidate is used as-is. With multiple candidates the gateway
/// ranks them against the job description; if the ranking call fails or
/// names an id outside the candidate set, the most recently used resume
/// stands in.
pub struct ResumeSelector {
    gateway: Arc<AiGateway>,
}

impl ResumeSelector {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the id of the chosen candidate, or `None` when the user has
    /// no resumes at all.
    pub fn select(
        &self,
        user_id: u64,
        job_description: &str,
        candidates: &[ResumeCandidate],
    ) -> Option<u64> {
        match candidates {
            [] => None,
            [only] => Some(only.id),
            _ => self.rank(user_id, job_description, candidates),
        }
    }

    fn rank(
        &self,
        user_id: u64,
        job_description: &str,
        candidates: &[ResumeCandidate],
    ) -> Option<u64> {
        match self.gateway.rank_resumes(user_id, job_description, candidates) {
            Ok(id) if candidates.iter().any(|c| c.id == id) => Some(id),
            Ok(id) => {
                log::warn!(
                    "Ranking returned id {} which is not among the candidates, falling back",
                    id
                );
                fallback(candidates)
            }
            Err(e) => {
                log::warn!("Resume ranking failed, falling back to most recent: {}", e);
                fallback(candidates)
            }
        }
    }
}

/// Most recently used candidate, or the first one when none has ever been
/// used.
fn fallback(candidates: &[ResumeCandidate]) -> Option<u64> {
    candidates
        .iter()
        .filter(|c| c.last_used_at.is_some())
        .max_by_key(|c| c.last_used_at)
        .or_else(|| candidates.first())
        .map(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::{Completion, LanguageModel, ModelError};
    use crate::ai::UsageLedger;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubModel {
        reply: Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    impl LanguageModel for StubModel {
        fn generate(&self, _prompt: &str) -> Result<Completion, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(Completion {
                    text: text.clone(),
                    input_tokens: 1,
                    output_tokens: 1,
                }),
                Err(message) => Err(ModelError::Api {
                    status: 503,
                    message: message.clone(),
                }),
            }
        }
    }

    fn selector_with(reply: Result<&str, &str>) -> (ResumeSelector, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = StubModel {
            reply: reply.map(str::to_string).map_err(str::to_string),
            calls: calls.clone(),
        };
        let gateway = AiGateway::new(
            Box::new(model),
            Arc::new(UsageLedger::new(100, Duration::from_secs(60))),
        );
        (ResumeSelector::new(Arc::new(gateway)), calls)
    }

    fn candidate(id: u64, text: &str, used_days_ago: Option<i64>) -> ResumeCandidate {
        ResumeCandidate {
            id,
            file_name: format!("resume_{}.pdf", id),
            text: text.to_string(),
            last_used_at: used_days_ago.map(|d| Utc::now() - ChronoDuration::days(d)),
            path: None,
        }
    }

    #[test]
    fn test_no_candidates_means_no_resume_and_no_call() {
        let (selector, calls) = selector_with(Ok("1"));
        assert_eq!(selector.select(1, "job", &[]), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_single_candidate_used_without_ranking() {
        let (selector, calls) = selector_with(Ok("99"));
        let candidates = vec![candidate(7, "resume", None)];

        assert_eq!(selector.select(1, "job", &candidates), Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ranking_picks_best_match() {
        let (selector, calls) = selector_with(Ok("2"));
        let candidates = vec![
            candidate(1, "Java developer, Spring, Hibernate", Some(3)),
            candidate(2, "Go engineer, Kubernetes, gRPC", Some(30)),
        ];

        assert_eq!(selector.select(1, "Go engineer role", &candidates), Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_ranking_failure_falls_back_to_most_recent() {
        let (selector, _) = selector_with(Err("backend down"));
        let candidates = vec![
            candidate(1, "first", Some(10)),
            candidate(2, "second", Some(2)),
            candidate(3, "third", None),
        ];

        assert_eq!(selector.select(1, "job", &candidates), Some(2));
    }

    #[test]
    fn test_invalid_id_from_ranking_falls_back() {
        let (selector, _) = selector_with(Ok("404"));
        let candidates = vec![candidate(1, "first", Some(5)), candidate(2, "second", Some(1))];

        assert_eq!(selector.select(1, "job", &candidates), Some(2));
    }

    #[test]
    fn test_fallback_without_usage_history_takes_first() {
        let (selector, _) = selector_with(Err("backend down"));
        let candidates = vec![candidate(4, "first", None), candidate(5, "second", None)];

        assert_eq!(selector.select(1, "job", &candidates), Some(4));
    }
}
