use std::time::Duration;

/// Policy for questions the platform marks required but the resolver left
/// unanswered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAnswerPolicy {
    /// Fill a platform-appropriate default (first option for select/radio)
    /// and continue.
    FillDefault,
    /// Leave the question untouched and let the platform validate.
    Skip,
}

/// Engine-wide tuning knobs.
///
/// Defaults match production behavior; tests override individual fields via
/// the builder methods.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum step-loop iterations before the task is failed.
    pub max_steps: usize,

    /// Calls allowed per user inside the trailing rate window.
    pub rate_limit_calls: usize,

    /// Width of the per-user sliding rate window.
    pub rate_limit_window: Duration,

    /// Timeout applied to each individual AI call.
    pub ai_call_timeout: Duration,

    /// Hard wall-clock budget for one task invocation.
    pub task_budget: Duration,

    /// What to do with required-but-unanswered questions.
    pub required_answer_policy: RequiredAnswerPolicy,

    /// Delay after navigation/advance to let dynamic content settle.
    pub settle_delay: Duration,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the step cap.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder method: set the rate limit (calls per window).
    pub fn rate_limit(mut self, calls: usize, window: Duration) -> Self {
        self.rate_limit_calls = calls;
        self.rate_limit_window = window;
        self
    }

    /// Builder method: set the AI call timeout.
    pub fn ai_call_timeout(mut self, timeout: Duration) -> Self {
        self.ai_call_timeout = timeout;
        self
    }

    /// Builder method: set the task wall-clock budget.
    pub fn task_budget(mut self, budget: Duration) -> Self {
        self.task_budget = budget;
        self
    }

    /// Builder method: set the required-question policy.
    pub fn required_answer_policy(mut self, policy: RequiredAnswerPolicy) -> Self {
        self.required_answer_policy = policy;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            rate_limit_calls: 15,
            rate_limit_window: Duration::from_secs(60),
            ai_call_timeout: Duration::from_secs(20),
            task_budget: Duration::from_secs(30 * 60),
            required_answer_policy: RequiredAnswerPolicy::FillDefault,
            settle_delay: Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.rate_limit_calls, 15);
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.task_budget, Duration::from_secs(1800));
        assert_eq!(
            config.required_answer_policy,
            RequiredAnswerPolicy::FillDefault
        );
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .max_steps(3)
            .rate_limit(2, Duration::from_secs(10))
            .required_answer_policy(RequiredAnswerPolicy::Skip);

        assert_eq!(config.max_steps, 3);
        assert_eq!(config.rate_limit_calls, 2);
        assert_eq!(config.rate_limit_window, Duration::from_secs(10));
        assert_eq!(config.required_answer_policy, RequiredAnswerPolicy::Skip);
    }
}
