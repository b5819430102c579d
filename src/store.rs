//! Seams to the persistence and storage collaborators.
//!
//! The engine only ever writes the single `ApplicationTask` row it is
//! running, reads user/job/resume records, and stores failure snapshots.
//! In-memory implementations back the tests and the CLI demo; production
//! deployments supply their own.

use crate::error::{EngineError, Result};
use crate::model::{ApplicationTask, JobRecord, ResumeCandidate, TaskStatus, UserProfile};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Write access to the task row being executed.
pub trait TaskStore: Send + Sync {
    /// Atomically transition the task `Pending → InProgress` and return it.
    /// A task in any other state is rejected, which is how a second dispatch
    /// on an already-running task is refused.
    fn claim(&self, task_id: u64) -> Result<ApplicationTask>;

    /// Persist the terminal state of the task (status, timestamp, error,
    /// log, snapshot reference).
    fn persist(&self, task: &ApplicationTask) -> Result<()>;
}

/// Read access to the records the engine needs to run a task.
pub trait RecordStore: Send + Sync {
    fn job(&self, job_id: u64) -> Result<JobRecord>;
    fn profile(&self, user_id: u64) -> Result<UserProfile>;
    fn resumes(&self, user_id: u64) -> Result<Vec<ResumeCandidate>>;
}

/// Write access for failure snapshots, external to the task store.
pub trait SnapshotStore: Send + Sync {
    /// Persist a PNG snapshot and return a reference usable later for
    /// inspection.
    fn store(&self, task_id: u64, png: &[u8]) -> Result<String>;
}

/// In-memory task store.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<HashMap<u64, ApplicationTask>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, task: ApplicationTask) {
        self.tasks.lock().unwrap().insert(task.id, task);
    }

    pub fn get(&self, task_id: u64) -> Option<ApplicationTask> {
        self.tasks.lock().unwrap().get(&task_id).cloned()
    }

    /// Reset a failed task back to `Pending`, clearing the prior outcome.
    /// This is the external retry path; the engine never calls it.
    pub fn reset(&self, task_id: u64) -> Result<()> {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| EngineError::StoreFailed(format!("No task {}", task_id)))?;
        if task.status != TaskStatus::Failed {
            return Err(EngineError::StoreFailed(format!(
                "Task {} is not failed, cannot reset",
                task_id
            )));
        }
        task.reset();
        Ok(())
    }
}

impl TaskStore for InMemoryTaskStore {
    fn claim(&self, task_id: u64) -> Result<ApplicationTask> {
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| EngineError::StoreFailed(format!("No task {}", task_id)))?;

        if task.status != TaskStatus::Pending {
            return Err(EngineError::StoreFailed(format!(
                "Task {} already dispatched (status {:?})",
                task_id, task.status
            )));
        }

        task.status = TaskStatus::InProgress;
        Ok(task.clone())
    }

    fn persist(&self, task: &ApplicationTask) -> Result<()> {
        self.tasks.lock().unwrap().insert(task.id, task.clone());
        Ok(())
    }
}

/// In-memory record store.
#[derive(Default)]
pub struct InMemoryRecordStore {
    jobs: Mutex<HashMap<u64, JobRecord>>,
    profiles: Mutex<HashMap<u64, UserProfile>>,
    resumes: Mutex<HashMap<u64, Vec<ResumeCandidate>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_job(&self, job: JobRecord) {
        self.jobs.lock().unwrap().insert(job.id, job);
    }

    pub fn insert_profile(&self, profile: UserProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile);
    }

    pub fn insert_resumes(&self, user_id: u64, resumes: Vec<ResumeCandidate>) {
        self.resumes.lock().unwrap().insert(user_id, resumes);
    }
}

impl RecordStore for InMemoryRecordStore {
    fn job(&self, job_id: u64) -> Result<JobRecord> {
        self.jobs
            .lock()
            .unwrap()
            .get(&job_id)
            .cloned()
            .ok_or_else(|| EngineError::StoreFailed(format!("No job {}", job_id)))
    }

    fn profile(&self, user_id: u64) -> Result<UserProfile> {
        self.profiles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| EngineError::StoreFailed(format!("No profile for user {}", user_id)))
    }

    fn resumes(&self, user_id: u64) -> Result<Vec<ResumeCandidate>> {
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Snapshot store that writes PNG files into a directory and returns the
/// file path as the reference.
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn store(&self, task_id: u64, png: &[u8]) -> Result<String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| EngineError::SnapshotFailed(format!("create dir: {}", e)))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let path = self
            .dir
            .join(format!("application_{}_{}.png", task_id, timestamp));

        std::fs::write(&path, png)
            .map_err(|e| EngineError::SnapshotFailed(format!("write {}: {}", path.display(), e)))?;

        Ok(path.display().to_string())
    }
}

/// Snapshot store that keeps bytes in memory.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<HashMap<u64, Vec<u8>>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: u64) -> Option<Vec<u8>> {
        self.snapshots.lock().unwrap().get(&task_id).cloned()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn store(&self, task_id: u64, png: &[u8]) -> Result<String> {
        self.snapshots
            .lock()
            .unwrap()
            .insert(task_id, png.to_vec());
        Ok(format!("memory://snapshots/{}", task_id))
    }
}
