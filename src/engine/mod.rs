//! Task orchestration.
//!
//! [`Engine::run_task`] owns the full lifecycle of one application attempt:
//! claim the task, load its records, pick a resume, drive the wizard, and
//! persist the terminal outcome. Navigation failures are recorded on the
//! task rather than propagated; the only hard errors a caller sees are
//! store failures.

pub mod driver;
pub mod machine;

pub use driver::{
    BrowserDriver, BrowserDriverFactory, DriverFactory, ResumeStepAction, StepDriver, StepKind,
};
pub use machine::{run_steps, TaskContext};

use crate::ai::AiGateway;
use crate::audit::AuditLog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{ApplicationTask, TaskStatus};
use crate::resolver::AnswerResolver;
use crate::resume::ResumeSelector;
use crate::store::{RecordStore, SnapshotStore, TaskStore};
use std::sync::Arc;
use std::time::Instant;

/// One engine serves many tasks; each `run_task` call is self-contained and
/// owns its browser session for the whole attempt. The driver factory seam
/// keeps the engine testable without Chrome.
pub struct Engine<F: DriverFactory> {
    factory: F,
    resolver: AnswerResolver,
    resume_selector: ResumeSelector,
    config: EngineConfig,
    tasks: Arc<dyn TaskStore>,
    records: Arc<dyn RecordStore>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl<F: DriverFactory> Engine<F> {
    pub fn new(
        factory: F,
        gateway: Arc<AiGateway>,
        config: EngineConfig,
        tasks: Arc<dyn TaskStore>,
        records: Arc<dyn RecordStore>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            factory,
            resolver: AnswerResolver::new(gateway.clone()),
            resume_selector: ResumeSelector::new(gateway),
            config,
            tasks,
            records,
            snapshots,
        }
    }

    /// Run one application task to a terminal state.
    ///
    /// Returns the persisted task. A navigation or AI failure marks the
    /// task `Failed` and still returns `Ok`; only claiming or persisting
    /// failures surface as errors.
    pub fn run_task(&self, task_id: u64) -> Result<ApplicationTask> {
        let mut task = self.tasks.claim(task_id)?;
        log::info!(
            "Task {} claimed (user {}, job {})",
            task.id,
            task.user_id,
            task.job_id
        );

        let mut audit = AuditLog::new();
        match self.execute(&mut task, &mut audit) {
            Ok(()) => {
                task.status = TaskStatus::Applied;
                task.applied_at = Some(chrono::Utc::now());
                log::info!("Task {} applied", task.id);
            }
            Err(e) => {
                task.status = TaskStatus::Failed;
                task.error = Some(e.to_string());
                log::warn!("Task {} failed: {}", task.id, e);
            }
        }
        task.log = audit.into_entries();

        self.tasks.persist(&task)?;
        Ok(task)
    }

    fn execute(&self, task: &mut ApplicationTask, audit: &mut AuditLog) -> Result<()> {
        let deadline = Instant::now() + self.config.task_budget;

        let job = self.records.job(task.job_id)?;
        let profile = self.records.profile(task.user_id)?;
        let resumes = self.records.resumes(task.user_id)?;

        let resume_id = self
            .resume_selector
            .select(task.user_id, &job.description, &resumes);
        let resume = resume_id.and_then(|id| resumes.iter().find(|r| r.id == id));
        if let Some(r) = resume {
            task.resume_id = Some(r.id);
            audit.push(format!("selected resume {} ({})", r.id, r.file_name));
        }

        let mut driver = self.factory.create(&job, &profile)?;

        let ctx = TaskContext {
            user_id: task.user_id,
            job: &job,
            profile: &profile,
            resume,
        };
        let result = run_steps(&mut driver, &self.resolver, &ctx, &self.config, audit, deadline);

        if result.is_err() {
            match driver.snapshot() {
                Ok(png) => match self.snapshots.store(task.id, &png) {
                    Ok(reference) => {
                        audit.push(format!("failure snapshot stored at {}", reference));
                        task.snapshot_ref = Some(reference);
                    }
                    Err(e) => log::warn!("Failed to store snapshot for task {}: {}", task.id, e),
                },
                Err(e) => log::warn!("Failed to capture snapshot for task {}: {}", task.id, e),
            }
        }

        driver.close();
        result
    }
}
