use crate::audit::AuditLog;
use crate::config::EngineConfig;
use crate::engine::driver::{ResumeStepAction, StepDriver, StepKind};
use crate::error::{EngineError, Result};
use crate::form::executor::AdvanceOutcome;
use crate::model::{JobRecord, ResumeCandidate, UserProfile};
use crate::resolver::AnswerResolver;
use std::time::Instant;

/// Everything about the task that step handling needs to read.
pub struct TaskContext<'a> {
    pub user_id: u64,
    pub job: &'a JobRecord,
    pub profile: &'a UserProfile,
    pub resume: Option<&'a ResumeCandidate>,
}

/// Drive the application wizard from entry to submission.
///
/// Each iteration classifies the current step, satisfies it, and advances.
/// The loop is bounded twice: by the step cap and by the wall-clock
/// deadline. Every decision is appended to the audit log before the
/// corresponding page mutation runs, so a crash mid-action still leaves the
/// intent on record.
pub fn run_steps<D: StepDriver>(
    driver: &mut D,
    resolver: &AnswerResolver,
    ctx: &TaskContext<'_>,
    config: &EngineConfig,
    audit: &mut AuditLog,
    deadline: Instant,
) -> Result<()> {
    audit.push(format!("opening application for job {}", ctx.job.id));
    driver.open_application()?;

    for step in 1..=config.max_steps {
        if Instant::now() >= deadline {
            audit.push("task budget exceeded");
            return Err(EngineError::BudgetExceeded);
        }

        match driver.detect_step()? {
            StepKind::Challenge => {
                audit.push(format!("step {}: security challenge encountered", step));
                return Err(EngineError::ChallengeDetected(
                    "security challenge encountered".to_string(),
                ));
            }
            StepKind::ResumeSelection => {
                audit.push(format!("step {}: resume selection", step));
                match driver.handle_resume_step(ctx.resume)? {
                    ResumeStepAction::SelectedOffered => {
                        audit.push(format!("step {}: picked offered resume", step));
                    }
                    ResumeStepAction::Uploaded => {
                        audit.push(format!("step {}: uploaded resume", step));
                    }
                    ResumeStepAction::NothingToDo => {
                        audit.push(format!("step {}: left platform resume default", step));
                    }
                }
            }
            StepKind::Questions => {
                let questions = driver.scrape()?;
                audit.push(format!("step {}: scraped {} questions", step, questions.len()));

                if !questions.is_empty() {
                    let resume_text = ctx.resume.map(|r| r.text.as_str()).unwrap_or("");
                    let answers = resolver.resolve(
                        ctx.user_id,
                        &questions,
                        &ctx.job.description,
                        resume_text,
                        ctx.profile,
                    );
                    audit.push(format!(
                        "step {}: applying {} resolved answers",
                        step,
                        answers.len()
                    ));
                    let applied = driver.apply(&questions, &answers)?;
                    audit.push(format!("step {}: applied {} answers", step, applied));
                }
            }
            StepKind::Unrecognized => {
                audit.push(format!("step {}: unrecognized step, advancing", step));
            }
        }

        audit.push(format!("step {}: advancing", step));
        match driver.advance()? {
            AdvanceOutcome::ReachedTerminal => {
                audit.push("application submitted");
                return Ok(());
            }
            AdvanceOutcome::Continued => {
                audit.push(format!("step {}: advanced", step));
            }
            AdvanceOutcome::Stuck => {
                audit.push(format!("step {}: no advance control found", step));
                return Err(EngineError::Stuck(format!(
                    "no advance control on step {}",
                    step
                )));
            }
        }
    }

    audit.push("step limit exceeded");
    Err(EngineError::StepLimitExceeded(config.max_steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::{Completion, LanguageModel, ModelError};
    use crate::ai::{AiGateway, UsageLedger};
    use crate::form::question::{AnswerSet, QuestionDescriptor};
    use crate::model::JobSource;
    use std::sync::Arc;
    use std::time::Duration;

    struct SilentModel;

    impl LanguageModel for SilentModel {
        fn generate(&self, _prompt: &str) -> std::result::Result<Completion, ModelError> {
            Ok(Completion {
                text: "{}".to_string(),
                input_tokens: 0,
                output_tokens: 0,
            })
        }
    }

    fn resolver() -> AnswerResolver {
        AnswerResolver::new(Arc::new(AiGateway::new(
            Box::new(SilentModel),
            Arc::new(UsageLedger::new(100, Duration::from_secs(60))),
        )))
    }

    fn job() -> JobRecord {
        JobRecord {
            id: 1,
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            description: "A job".to_string(),
            source: JobSource::Linkedin,
            url: "https://example.com/jobs/1".to_string(),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            user_id: 1,
            phone: None,
            location: None,
            linkedin_url: None,
            skills: vec![],
            experience_years: None,
            auth_cookie: None,
        }
    }

    /// Scripted driver: one (kind, outcome) pair per step.
    struct FakeDriver {
        script: Vec<(StepKind, AdvanceOutcome)>,
        position: usize,
    }

    impl FakeDriver {
        fn new(script: Vec<(StepKind, AdvanceOutcome)>) -> Self {
            Self {
                script,
                position: 0,
            }
        }

        fn current(&self) -> (StepKind, AdvanceOutcome) {
            // Repeat the last scripted step once the script runs out so
            // unbounded loops are exercised against the cap.
            self.script
                .get(self.position)
                .or_else(|| self.script.last())
                .copied()
                .expect("script must not be empty")
        }
    }

    impl StepDriver for FakeDriver {
        fn open_application(&mut self) -> Result<()> {
            Ok(())
        }

        fn detect_step(&mut self) -> Result<StepKind> {
            Ok(self.current().0)
        }

        fn scrape(&mut self) -> Result<Vec<QuestionDescriptor>> {
            Ok(vec![])
        }

        fn handle_resume_step(
            &mut self,
            _resume: Option<&ResumeCandidate>,
        ) -> Result<ResumeStepAction> {
            Ok(ResumeStepAction::NothingToDo)
        }

        fn apply(&mut self, _q: &[QuestionDescriptor], _a: &AnswerSet) -> Result<usize> {
            Ok(0)
        }

        fn advance(&mut self) -> Result<AdvanceOutcome> {
            let outcome = self.current().1;
            self.position += 1;
            Ok(outcome)
        }

        fn snapshot(&mut self) -> Result<Vec<u8>> {
            Ok(vec![0x89, b'P', b'N', b'G'])
        }

        fn close(&mut self) {}
    }

    fn run(
        driver: &mut FakeDriver,
        config: &EngineConfig,
        audit: &mut AuditLog,
    ) -> Result<()> {
        let job = job();
        let profile = profile();
        let ctx = TaskContext {
            user_id: 1,
            job: &job,
            profile: &profile,
            resume: None,
        };
        let deadline = Instant::now() + config.task_budget;
        run_steps(driver, &resolver(), &ctx, config, audit, deadline)
    }

    #[test]
    fn test_submission_path() {
        let mut driver = FakeDriver::new(vec![
            (StepKind::Questions, AdvanceOutcome::Continued),
            (StepKind::ResumeSelection, AdvanceOutcome::Continued),
            (StepKind::Questions, AdvanceOutcome::ReachedTerminal),
        ]);
        let mut audit = AuditLog::new();

        run(&mut driver, &EngineConfig::default(), &mut audit).unwrap();
        assert_eq!(audit.entries().last().map(String::as_str), Some("application submitted"));
    }

    #[test]
    fn test_step_cap_terminates_endless_wizard() {
        // A wizard that always claims to continue must still terminate.
        let mut driver = FakeDriver::new(vec![(StepKind::Questions, AdvanceOutcome::Continued)]);
        let config = EngineConfig::default().max_steps(4);
        let mut audit = AuditLog::new();

        let err = run(&mut driver, &config, &mut audit).unwrap_err();
        assert!(matches!(err, EngineError::StepLimitExceeded(4)));
        assert_eq!(audit.entries().last().map(String::as_str), Some("step limit exceeded"));
    }

    #[test]
    fn test_stuck_step_fails_the_run() {
        let mut driver = FakeDriver::new(vec![
            (StepKind::Questions, AdvanceOutcome::Continued),
            (StepKind::Unrecognized, AdvanceOutcome::Stuck),
        ]);
        let mut audit = AuditLog::new();

        let err = run(&mut driver, &EngineConfig::default(), &mut audit).unwrap_err();
        assert!(matches!(err, EngineError::Stuck(_)));
    }

    #[test]
    fn test_challenge_aborts_immediately() {
        let mut driver = FakeDriver::new(vec![(StepKind::Challenge, AdvanceOutcome::Continued)]);
        let mut audit = AuditLog::new();

        let err = run(&mut driver, &EngineConfig::default(), &mut audit).unwrap_err();
        assert!(matches!(err, EngineError::ChallengeDetected(_)));
        // The challenge was recorded but no advance happened after it.
        assert!(audit
            .entries()
            .iter()
            .any(|e| e.contains("security challenge")));
    }

    #[test]
    fn test_deadline_in_the_past_exceeds_budget() {
        let mut driver = FakeDriver::new(vec![(StepKind::Questions, AdvanceOutcome::Continued)]);
        let mut audit = AuditLog::new();
        let job = job();
        let profile = profile();
        let ctx = TaskContext {
            user_id: 1,
            job: &job,
            profile: &profile,
            resume: None,
        };

        let err = run_steps(
            &mut driver,
            &resolver(),
            &ctx,
            &EngineConfig::default(),
            &mut audit,
            Instant::now() - Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::BudgetExceeded));
    }

    #[test]
    fn test_advance_intent_precedes_outcome() {
        let mut driver = FakeDriver::new(vec![(
            StepKind::Questions,
            AdvanceOutcome::ReachedTerminal,
        )]);
        let mut audit = AuditLog::new();

        run(&mut driver, &EngineConfig::default(), &mut audit).unwrap();

        // The intent entry lands before the click, so a failure inside the
        // advance still leaves the attempt on record.
        let entries = audit.entries();
        let intent = entries.iter().position(|e| e == "step 1: advancing");
        let outcome = entries.iter().position(|e| e == "application submitted");
        assert!(intent.unwrap() < outcome.unwrap());
    }

    #[test]
    fn test_audit_records_every_step() {
        let mut driver = FakeDriver::new(vec![
            (StepKind::Unrecognized, AdvanceOutcome::Continued),
            (StepKind::Questions, AdvanceOutcome::ReachedTerminal),
        ]);
        let mut audit = AuditLog::new();

        run(&mut driver, &EngineConfig::default(), &mut audit).unwrap();

        let entries = audit.entries();
        assert!(entries[0].contains("opening application"));
        assert!(entries.iter().any(|e| e.contains("step 1")));
        assert!(entries.iter().any(|e| e.contains("step 2")));
    }
}
