use crate::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use crate::config::RequiredAnswerPolicy;
use crate::error::{EngineError, Result};
use crate::form::executor::{self, AdvanceOutcome};
use crate::form::question::{AnswerSet, QuestionDescriptor};
use crate::form::scraper;
use crate::form::strategy::{strategy_for, FormStepStrategy};
use crate::model::{JobRecord, ResumeCandidate, UserProfile};
use std::time::Duration;

/// What kind of wizard step the driver is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// The platform is asking which resume to attach.
    ResumeSelection,
    /// A form step that may carry questions.
    Questions,
    /// A security challenge (CAPTCHA, checkpoint, 2FA). Unresolvable
    /// without a human.
    Challenge,
    /// Nothing recognizable; the loop falls through to advancing.
    Unrecognized,
}

/// How a resume-selection step was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeStepAction {
    /// An already-offered resume card was picked.
    SelectedOffered,
    /// The chosen resume file was uploaded directly.
    Uploaded,
    /// Nothing was offered and nothing could be uploaded; the step is left
    /// for the platform's own defaults.
    NothingToDo,
}

/// Everything the navigation loop needs from a live application wizard.
///
/// The production implementation drives a real browser; tests substitute a
/// scripted fake so step semantics can be exercised without Chrome.
pub trait StepDriver {
    /// Open the job page and enter the application wizard.
    fn open_application(&mut self) -> Result<()>;

    /// Classify the step currently on screen.
    fn detect_step(&mut self) -> Result<StepKind>;

    /// Extract the questions on the current step.
    fn scrape(&mut self) -> Result<Vec<QuestionDescriptor>>;

    /// Satisfy a resume-selection step with the chosen candidate.
    fn handle_resume_step(&mut self, resume: Option<&ResumeCandidate>)
        -> Result<ResumeStepAction>;

    /// Apply resolved answers to the current step. Returns how many were
    /// applied.
    fn apply(&mut self, questions: &[QuestionDescriptor], answers: &AnswerSet) -> Result<usize>;

    /// Click the best advance control on the current step.
    fn advance(&mut self) -> Result<AdvanceOutcome>;

    /// Capture a PNG of the current page for failure forensics.
    fn snapshot(&mut self) -> Result<Vec<u8>>;

    /// Tear the underlying session down. Idempotent.
    fn close(&mut self);
}

/// Creates one driver per task. The engine is generic over this seam so the
/// whole run path is testable without a browser.
pub trait DriverFactory: Send + Sync {
    type Driver: StepDriver;

    fn create(&self, job: &JobRecord, profile: &UserProfile) -> Result<Self::Driver>;
}

/// [`StepDriver`] backed by a real browser session and a platform strategy.
pub struct BrowserDriver {
    session: BrowserSession,
    strategy: Box<dyn FormStepStrategy>,
    job_url: String,
    auth_cookie: Option<String>,
    policy: RequiredAnswerPolicy,
    settle: Duration,
}

impl BrowserDriver {
    pub fn new(
        session: BrowserSession,
        strategy: Box<dyn FormStepStrategy>,
        job_url: String,
        auth_cookie: Option<String>,
        policy: RequiredAnswerPolicy,
        settle: Duration,
    ) -> Self {
        Self {
            session,
            strategy,
            job_url,
            auth_cookie,
            policy,
            settle,
        }
    }

    /// Let client-side rendering catch up after a navigation or click.
    fn settle(&self) {
        std::thread::sleep(self.settle);
    }
}

impl StepDriver for BrowserDriver {
    fn open_application(&mut self) -> Result<()> {
        if let (Some(spec), Some(cookie)) = (self.strategy.auth_cookie(), &self.auth_cookie) {
            self.session
                .inject_auth_cookie(spec.origin, spec.name, cookie, spec.domain)?;
        }

        self.session.navigate(&self.job_url)?;
        self.session.wait_for_navigation()?;
        self.settle();

        let tab = self.session.tab()?;
        for selector in self.strategy.apply_entry_selectors() {
            if let Some(element) = self.session.try_find(&tab, selector) {
                element.click().map_err(|e| EngineError::ExecutionFailed {
                    action: "open application".to_string(),
                    reason: e.to_string(),
                })?;
                log::info!("Opened application wizard via '{}'", selector);
                self.settle();
                return Ok(());
            }
        }

        Err(EngineError::ElementNotFound(format!(
            "No apply control on {} ({})",
            self.job_url,
            self.strategy.name()
        )))
    }

    fn detect_step(&mut self) -> Result<StepKind> {
        let url = self.session.current_url()?.to_lowercase();
        for marker in self.strategy.challenge_markers() {
            if url.contains(marker) {
                return Ok(StepKind::Challenge);
            }
        }

        let tab = self.session.tab()?;
        for marker in self.strategy.resume_step_markers() {
            if self.session.try_find(&tab, marker).is_some() {
                return Ok(StepKind::ResumeSelection);
            }
        }

        for scope in self.strategy.question_scopes() {
            if self.session.try_find(&tab, scope).is_some() {
                return Ok(StepKind::Questions);
            }
        }

        Ok(StepKind::Unrecognized)
    }

    fn scrape(&mut self) -> Result<Vec<QuestionDescriptor>> {
        scraper::scrape_questions(&self.session, self.strategy.as_ref())
    }

    fn handle_resume_step(
        &mut self,
        resume: Option<&ResumeCandidate>,
    ) -> Result<ResumeStepAction> {
        let tab = self.session.tab()?;

        for selector in self.strategy.offered_resume_selectors() {
            if let Some(element) = self.session.try_find(&tab, selector) {
                element.click().map_err(|e| EngineError::ExecutionFailed {
                    action: "select resume".to_string(),
                    reason: e.to_string(),
                })?;
                self.settle();
                return Ok(ResumeStepAction::SelectedOffered);
            }
        }

        if let Some(path) = resume.and_then(|r| r.path.as_deref()) {
            if let Some(input) = self
                .session
                .try_find(&tab, self.strategy.upload_input_selector())
            {
                self.session.set_input_file(&input, path)?;
                self.settle();
                return Ok(ResumeStepAction::Uploaded);
            }
        }

        Ok(ResumeStepAction::NothingToDo)
    }

    fn apply(&mut self, questions: &[QuestionDescriptor], answers: &AnswerSet) -> Result<usize> {
        executor::apply_answers(&self.session, questions, answers, self.policy)
    }

    fn advance(&mut self) -> Result<AdvanceOutcome> {
        let outcome = executor::advance(&self.session, self.strategy.as_ref())?;
        if outcome != AdvanceOutcome::Stuck {
            self.settle();
        }
        Ok(outcome)
    }

    fn snapshot(&mut self) -> Result<Vec<u8>> {
        self.session.capture_screenshot()
    }

    fn close(&mut self) {
        self.session.close();
    }
}

/// Builds a [`BrowserDriver`] per task, launching a local browser or
/// attaching to a remote one depending on configuration.
pub struct BrowserDriverFactory {
    launch: LaunchOptions,
    connection: Option<ConnectionOptions>,
    policy: RequiredAnswerPolicy,
    settle: Duration,
}

impl BrowserDriverFactory {
    pub fn new(launch: LaunchOptions, policy: RequiredAnswerPolicy, settle: Duration) -> Self {
        Self {
            launch,
            connection: None,
            policy,
            settle,
        }
    }

    /// Attach to a running browser instead of launching one.
    pub fn with_connection(mut self, connection: ConnectionOptions) -> Self {
        self.connection = Some(connection);
        self
    }
}

impl DriverFactory for BrowserDriverFactory {
    type Driver = BrowserDriver;

    fn create(&self, job: &JobRecord, profile: &UserProfile) -> Result<BrowserDriver> {
        let session = match &self.connection {
            Some(connection) => BrowserSession::connect(connection)?,
            None => BrowserSession::launch(&self.launch)?,
        };

        Ok(BrowserDriver::new(
            session,
            strategy_for(job.source),
            job.url.clone(),
            profile.auth_cookie.clone(),
            self.policy,
            self.settle,
        ))
    }
}
