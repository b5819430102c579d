//! Prompt construction for the two AI call kinds.
//!
//! All free-form context is excerpted to fixed bounds before it reaches a
//! prompt, both to cap token spend and to keep call latency predictable.

use crate::form::question::QuestionDescriptor;
use crate::model::{ResumeCandidate, UserProfile};

/// Bound on job description text included in any prompt.
pub const JOB_EXCERPT_CHARS: usize = 5_000;

/// Bound on resume text when answering questions.
pub const RESUME_EXCERPT_CHARS: usize = 10_000;

/// Bound on each candidate's resume text when ranking.
pub const RANKING_EXCERPT_CHARS: usize = 2_000;

/// Truncate to at most `max` characters on a char boundary.
pub fn excerpt(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Batched question-answering prompt: one call covers every question on
/// the step. The reply must be a JSON object keyed by question id.
pub fn answer_questions_prompt(
    questions: &[QuestionDescriptor],
    job_description: &str,
    resume_text: &str,
    profile: &UserProfile,
) -> String {
    let sanitized = profile.sanitized();
    let profile_json =
        serde_json::to_string(&sanitized).unwrap_or_else(|_| "{}".to_string());

    let mut question_lines = String::new();
    for q in questions {
        question_lines.push_str(&format!("- id: {}\n  question: {}\n  kind: {:?}\n", q.id, q.prompt, q.kind));
        if !q.options.is_empty() {
            question_lines.push_str(&format!(
                "  allowed answers (pick exactly one): {}\n",
                q.options.join(" | ")
            ));
        }
    }

    format!(
        "You are a smart applicant assistant filling a job application form.\n\
         \n\
         Resume:\n{resume}\n\
         \n\
         Applicant profile (JSON):\n{profile}\n\
         \n\
         Job description:\n{job}\n\
         \n\
         Questions:\n{questions}\n\
         \n\
         Task:\n\
         Answer every question on behalf of the applicant, using the resume and\n\
         profile. For questions with allowed answers, reply with one of the\n\
         allowed answers verbatim. Return ONLY a JSON object mapping each\n\
         question id to its answer string. No other text.",
        resume = excerpt(resume_text, RESUME_EXCERPT_CHARS),
        profile = profile_json,
        job = excerpt(job_description, JOB_EXCERPT_CHARS),
        questions = question_lines,
    )
}

/// Resume-ranking prompt. The reply must be a bare resume id.
pub fn rank_resumes_prompt(job_description: &str, candidates: &[ResumeCandidate]) -> String {
    let mut resume_lines = String::new();
    for c in candidates {
        resume_lines.push_str(&format!(
            "- id: {}\n  text: {}\n",
            c.id,
            excerpt(&c.text, RANKING_EXCERPT_CHARS)
        ));
    }

    format!(
        "You are an expert HR recruiter.\n\
         \n\
         Job description:\n{job}\n\
         \n\
         Resumes:\n{resumes}\n\
         \n\
         Task:\n\
         Select the resume id that best matches this job description.\n\
         Return ONLY the resume id as an integer, nothing else.",
        job = excerpt(job_description, JOB_EXCERPT_CHARS),
        resumes = resume_lines,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::question::QuestionKind;

    fn profile_with_cookie() -> UserProfile {
        UserProfile {
            user_id: 1,
            phone: Some("555-0100".to_string()),
            location: None,
            linkedin_url: None,
            skills: vec![],
            experience_years: None,
            auth_cookie: Some("li_at_secret".to_string()),
        }
    }

    #[test]
    fn test_excerpt_bounds() {
        assert_eq!(excerpt("hello", 10), "hello");
        assert_eq!(excerpt("hello", 3), "hel");
        // Multi-byte chars are cut on a boundary, not mid-codepoint.
        assert_eq!(excerpt("héllo", 2), "hé");
    }

    #[test]
    fn test_answer_prompt_excludes_auth_secrets() {
        let questions = vec![QuestionDescriptor {
            id: "q1".to_string(),
            prompt: "Years of experience?".to_string(),
            kind: QuestionKind::Text,
            options: vec![],
            required: false,
            selector: "#q1".to_string(),
        }];

        let prompt =
            answer_questions_prompt(&questions, "A job", "A resume", &profile_with_cookie());

        assert!(prompt.contains("Years of experience?"));
        assert!(prompt.contains("555-0100"));
        assert!(!prompt.contains("li_at_secret"));
    }

    #[test]
    fn test_answer_prompt_lists_allowed_values() {
        let questions = vec![QuestionDescriptor {
            id: "auth".to_string(),
            prompt: "Authorized to work?".to_string(),
            kind: QuestionKind::Select,
            options: vec!["Yes".to_string(), "No".to_string()],
            required: true,
            selector: "#auth".to_string(),
        }];

        let prompt = answer_questions_prompt(&questions, "", "", &profile_with_cookie());
        assert!(prompt.contains("Yes | No"));
    }

    #[test]
    fn test_ranking_prompt_truncates_each_candidate() {
        let long_text = "x".repeat(RANKING_EXCERPT_CHARS + 500);
        let candidates = vec![ResumeCandidate {
            id: 9,
            file_name: "resume.pdf".to_string(),
            text: long_text,
            last_used_at: None,
            path: None,
        }];

        let prompt = rank_resumes_prompt("job", &candidates);
        assert!(prompt.contains("- id: 9"));
        assert!(prompt.len() < RANKING_EXCERPT_CHARS + 1_000);
    }
}
