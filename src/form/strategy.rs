use crate::model::JobSource;

/// Where the platform's stored session cookie belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCookieSpec {
    /// Origin to visit before writing the cookie.
    pub origin: &'static str,
    /// Cookie name.
    pub name: &'static str,
    /// Domain the cookie is scoped to.
    pub domain: &'static str,
}

/// Platform-specific selector vocabulary for one form wizard.
///
/// New platforms are added by implementing this trait; the navigation loop
/// and the scraper consume it generically and never branch on the platform.
/// All selector lists are in priority order: the first match wins.
pub trait FormStepStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Controls that open the in-page application wizard from the job page.
    fn apply_entry_selectors(&self) -> &[&str];

    /// Containers to scan for questions, tried in order; the first scope
    /// yielding a non-empty question list is accepted.
    fn question_scopes(&self) -> &[&str];

    /// Markers that identify a resume-selection step.
    fn resume_step_markers(&self) -> &[&str];

    /// Already-offered resume cards on a resume step, most recent first as
    /// the platform renders them.
    fn offered_resume_selectors(&self) -> &[&str];

    /// File input for direct resume upload when nothing is offered.
    fn upload_input_selector(&self) -> &str;

    /// Submit-class controls (terminal on click).
    fn submit_selectors(&self) -> &[&str];

    /// Review-class controls (clicking is a non-terminal advance).
    fn review_selectors(&self) -> &[&str];

    /// Next/continue-class controls.
    fn next_selectors(&self) -> &[&str];

    /// URL substrings that indicate a security challenge (CAPTCHA/2FA).
    fn challenge_markers(&self) -> &[&str];

    /// Stored-cookie authentication, when the platform supports it.
    fn auth_cookie(&self) -> Option<AuthCookieSpec>;
}

/// LinkedIn Easy Apply wizard.
#[derive(Debug, Default)]
pub struct LinkedinStrategy;

impl FormStepStrategy for LinkedinStrategy {
    fn name(&self) -> &str {
        "linkedin"
    }

    fn apply_entry_selectors(&self) -> &[&str] {
        &["button.jobs-apply-button", ".jobs-apply-button--top-card button"]
    }

    fn question_scopes(&self) -> &[&str] {
        &[
            ".jobs-easy-apply-content",
            ".jobs-easy-apply-modal",
            "div[data-test-modal] form",
            "form",
        ]
    }

    fn resume_step_markers(&self) -> &[&str] {
        &[
            ".jobs-document-upload__container",
            "div[class*='jobs-resume-picker']",
        ]
    }

    fn offered_resume_selectors(&self) -> &[&str] {
        &[
            "div[class*='jobs-resume-picker'] input[type='radio']",
            ".jobs-document-upload__container label",
        ]
    }

    fn upload_input_selector(&self) -> &str {
        "input[type='file']"
    }

    fn submit_selectors(&self) -> &[&str] {
        &["button[aria-label*='Submit application']", "button[aria-label*='Submit']"]
    }

    fn review_selectors(&self) -> &[&str] {
        &["button[aria-label*='Review your application']", "button[aria-label*='Review']"]
    }

    fn next_selectors(&self) -> &[&str] {
        &[
            "button[aria-label*='Continue to next step']",
            "button[aria-label*='Continue']",
            "button[aria-label*='Next']",
        ]
    }

    fn challenge_markers(&self) -> &[&str] {
        &["checkpoint", "challenge"]
    }

    fn auth_cookie(&self) -> Option<AuthCookieSpec> {
        Some(AuthCookieSpec {
            origin: "https://www.linkedin.com",
            name: "li_at",
            domain: ".linkedin.com",
        })
    }
}

/// Indeed apply flow.
#[derive(Debug, Default)]
pub struct IndeedStrategy;

impl FormStepStrategy for IndeedStrategy {
    fn name(&self) -> &str {
        "indeed"
    }

    fn apply_entry_selectors(&self) -> &[&str] {
        &["#indeedApplyButton", "button[id*='indeedApplyButton']"]
    }

    fn question_scopes(&self) -> &[&str] {
        &[
            ".ia-BasePage-component",
            "#ia-container form",
            "form",
        ]
    }

    fn resume_step_markers(&self) -> &[&str] {
        &["[data-testid='resume-selection']", ".ia-ResumePicker"]
    }

    fn offered_resume_selectors(&self) -> &[&str] {
        &["[data-testid='resume-card']", ".ia-ResumePicker input[type='radio']"]
    }

    fn upload_input_selector(&self) -> &str {
        "input[type='file']"
    }

    fn submit_selectors(&self) -> &[&str] {
        &["button[type='submit']", "button[data-testid='submit-application']"]
    }

    fn review_selectors(&self) -> &[&str] {
        &["button[data-testid='review-application']"]
    }

    fn next_selectors(&self) -> &[&str] {
        &["button[data-testid='continue-button']", "button.ia-continueButton"]
    }

    fn challenge_markers(&self) -> &[&str] {
        &["captcha", "challenge"]
    }

    fn auth_cookie(&self) -> Option<AuthCookieSpec> {
        None
    }
}

/// Pick the strategy for a job's source platform.
pub fn strategy_for(source: JobSource) -> Box<dyn FormStepStrategy> {
    match source {
        JobSource::Linkedin => Box::new(LinkedinStrategy),
        JobSource::Indeed => Box::new(IndeedStrategy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_for_source() {
        assert_eq!(strategy_for(JobSource::Linkedin).name(), "linkedin");
        assert_eq!(strategy_for(JobSource::Indeed).name(), "indeed");
    }

    #[test]
    fn test_vocabularies_are_non_empty() {
        for strategy in [
            strategy_for(JobSource::Linkedin),
            strategy_for(JobSource::Indeed),
        ] {
            assert!(!strategy.apply_entry_selectors().is_empty());
            assert!(!strategy.question_scopes().is_empty());
            assert!(!strategy.submit_selectors().is_empty());
            assert!(!strategy.next_selectors().is_empty());
            assert!(!strategy.challenge_markers().is_empty());
        }
    }

    #[test]
    fn test_linkedin_auth_cookie_scope() {
        let spec = LinkedinStrategy.auth_cookie().unwrap();
        assert_eq!(spec.name, "li_at");
        assert_eq!(spec.domain, ".linkedin.com");
        assert!(spec.origin.starts_with("https://"));
    }

    #[test]
    fn test_generic_form_scope_is_last_resort() {
        // Every platform must end its scope list with a bare form fallback
        // so renders without the expected markers still scrape.
        assert_eq!(*LinkedinStrategy.question_scopes().last().unwrap(), "form");
        let indeed = IndeedStrategy;
        assert_eq!(*indeed.question_scopes().last().unwrap(), "form");
    }
}
