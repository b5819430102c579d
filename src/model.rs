use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle of one application attempt.
///
/// `Pending → InProgress` happens atomically when the engine claims the
/// task; `Applied` and `Failed` are terminal. An external collaborator may
/// reset a `Failed` task back to `Pending` for retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Applied,
    Failed,
}

/// Platform a job was sourced from. Each variant maps to one
/// `FormStepStrategy` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    Linkedin,
    Indeed,
}

/// One attempt to submit one application. Owned by the requesting user and
/// mutated only by the engine while `InProgress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationTask {
    pub id: u64,
    pub user_id: u64,
    pub job_id: u64,

    /// Resume chosen before the step loop started, if any.
    pub resume_id: Option<u64>,

    pub status: TaskStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,

    /// Lowest-level cause of a terminal failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Append-only ordered record of every decision and action.
    #[serde(default)]
    pub log: Vec<String>,

    /// Reference to a failure snapshot persisted outside the task store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_ref: Option<String>,
}

impl ApplicationTask {
    pub fn new(id: u64, user_id: u64, job_id: u64) -> Self {
        Self {
            id,
            user_id,
            job_id,
            resume_id: None,
            status: TaskStatus::Pending,
            applied_at: None,
            error: None,
            log: Vec::new(),
            snapshot_ref: None,
        }
    }

    /// Clear the outcome of a failed attempt so the task can be dispatched
    /// again.
    pub fn reset(&mut self) {
        self.status = TaskStatus::Pending;
        self.applied_at = None;
        self.error = None;
        self.log.clear();
        self.snapshot_ref = None;
    }
}

/// Fully-resolved job record handed to the engine by the persistence
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: u64,
    pub title: String,
    pub company: String,
    pub description: String,
    pub source: JobSource,
    pub url: String,
}

/// Applicant profile used to answer form questions.
///
/// `auth_cookie` is the stored platform session cookie. It is injected into
/// the browser session and must never appear in AI prompts; use
/// [`UserProfile::sanitized`] when building prompt context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_cookie: Option<String>,
}

impl UserProfile {
    /// Copy of the profile with authentication secrets removed, safe to
    /// serialize into an AI prompt.
    pub fn sanitized(&self) -> UserProfile {
        UserProfile {
            auth_cookie: None,
            ..self.clone()
        }
    }
}

/// One resume available for selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeCandidate {
    pub id: u64,
    pub file_name: String,

    /// Text extracted from the resume document.
    pub text: String,

    /// When this resume was last used for an application, from the platform
    /// if known, otherwise from local usage history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,

    /// Local file path for direct upload, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Kind of outbound AI call, for usage accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    AnswerQuestions,
    RankResumes,
}

/// Outcome of one attempted AI call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Success,
    Error,
}

/// Append-only accounting entry, one per attempted AI call regardless of
/// whether it succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: u64,
    pub kind: CallKind,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub outcome: CallOutcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_reset_clears_outcome() {
        let mut task = ApplicationTask::new(1, 2, 3);
        task.status = TaskStatus::Failed;
        task.error = Some("boom".to_string());
        task.log.push("step 1".to_string());
        task.snapshot_ref = Some("/snaps/1.png".to_string());
        task.applied_at = Some(Utc::now());

        task.reset();

        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.error.is_none());
        assert!(task.log.is_empty());
        assert!(task.snapshot_ref.is_none());
        assert!(task.applied_at.is_none());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let status: TaskStatus = serde_json::from_str("\"applied\"").unwrap();
        assert_eq!(status, TaskStatus::Applied);
    }

    #[test]
    fn test_sanitized_profile_drops_cookie() {
        let profile = UserProfile {
            user_id: 7,
            phone: Some("555-0100".to_string()),
            location: None,
            linkedin_url: None,
            skills: vec!["Rust".to_string()],
            experience_years: Some(5),
            auth_cookie: Some("secret-session-cookie".to_string()),
        };

        let clean = profile.sanitized();
        assert!(clean.auth_cookie.is_none());
        assert_eq!(clean.phone.as_deref(), Some("555-0100"));

        let json = serde_json::to_string(&clean).unwrap();
        assert!(!json.contains("secret-session-cookie"));
    }
}
