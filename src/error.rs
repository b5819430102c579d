use thiserror::Error;

/// Errors produced while running an application task.
///
/// Variants are split between fatal task-level failures (session loss,
/// security challenges, exhausted step budget) and recoverable component
/// failures (AI gateway problems degrade to deterministic fallbacks and
/// never cross the task boundary on their own).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The browser session could not be established. Fatal for the task,
    /// never retried within the same attempt.
    #[error("Browser session unavailable: {0}")]
    SessionUnavailable(String),

    /// The platform raised a CAPTCHA/2FA/security checkpoint. Fatal and
    /// flagged for manual intervention; never auto-retried.
    #[error("Security challenge detected: {0}")]
    ChallengeDetected(String),

    /// The step loop reached its configured maximum without a terminal
    /// outcome.
    #[error("Step limit exceeded after {0} steps")]
    StepLimitExceeded(usize),

    /// No submit, review, or continue control was found on the current step.
    #[error("No advance control found: {0}")]
    Stuck(String),

    /// The wall-clock budget for the task ran out.
    #[error("Task time budget exceeded")]
    BudgetExceeded,

    /// The AI service could not be reached or returned an error.
    #[error("AI service unavailable: {0}")]
    AiUnavailable(String),

    /// The per-user rate limit window rejected the call before it was made.
    #[error("AI call rejected by rate limit")]
    AiRateLimited,

    /// The AI reply could not be parsed into the expected shape.
    #[error("AI response malformed: {0}")]
    AiMalformedResponse(String),

    /// An element expected on the page was not present.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Question extraction from the current step failed.
    #[error("Form scrape failed: {0}")]
    ScrapeFailed(String),

    /// A browser action (click, type, select) failed.
    #[error("Step action '{action}' failed: {reason}")]
    ExecutionFailed { action: String, reason: String },

    /// A failure snapshot could not be captured or persisted.
    #[error("Snapshot capture failed: {0}")]
    SnapshotFailed(String),

    /// The task or record store rejected an operation.
    #[error("Store operation failed: {0}")]
    StoreFailed(String),

    /// Navigation to a URL failed.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript evaluation in the page failed.
    #[error("Script evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = EngineError::ExecutionFailed {
            action: "click".to_string(),
            reason: "node detached".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("click"));
        assert!(msg.contains("node detached"));
    }
}
