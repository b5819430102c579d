//! Run one application task against a real browser.
//!
//! Loads the job, profile, and resumes from a JSON fixture file, runs the
//! engine on an in-memory task, and prints the terminal task record
//! (status, audit log, error, snapshot reference) as JSON.

use anyhow::Context;
use apply_engine::ai::{AiGateway, GeminiClient, UsageLedger};
use apply_engine::browser::{ConnectionOptions, LaunchOptions};
use apply_engine::config::EngineConfig;
use apply_engine::engine::{BrowserDriverFactory, Engine};
use apply_engine::model::{ApplicationTask, JobRecord, ResumeCandidate, UserProfile};
use apply_engine::store::{FileSnapshotStore, InMemoryRecordStore, InMemoryTaskStore};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "apply-task", version, about = "Submit one job application")]
struct Args {
    /// JSON fixture with the job, profile, and resumes.
    #[arg(long)]
    fixture: PathBuf,

    /// Gemini API key. Falls back to the GEMINI_API_KEY environment variable.
    #[arg(long, env = "GEMINI_API_KEY")]
    api_key: String,

    /// Launch the browser with a visible window.
    #[arg(long)]
    headed: bool,

    /// Attach to a running browser at this WebSocket URL instead of
    /// launching one.
    #[arg(long)]
    connect: Option<String>,

    /// Directory for failure snapshots.
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Step cap for the wizard loop.
    #[arg(long, default_value_t = 10)]
    max_steps: usize,
}

#[derive(Deserialize)]
struct Fixture {
    job: JobRecord,
    profile: UserProfile,
    #[serde(default)]
    resumes: Vec<ResumeCandidate>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.fixture)
        .with_context(|| format!("reading fixture {}", args.fixture.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw)
        .with_context(|| format!("parsing fixture {}", args.fixture.display()))?;

    let config = EngineConfig::new().max_steps(args.max_steps);

    let gateway = Arc::new(AiGateway::new(
        Box::new(GeminiClient::new(args.api_key, config.ai_call_timeout)),
        Arc::new(UsageLedger::new(
            config.rate_limit_calls,
            config.rate_limit_window,
        )),
    ));

    let mut factory = BrowserDriverFactory::new(
        LaunchOptions::new().headless(!args.headed),
        config.required_answer_policy,
        config.settle_delay,
    );
    if let Some(ws_url) = args.connect {
        factory = factory.with_connection(ConnectionOptions::new(ws_url));
    }

    let tasks = Arc::new(InMemoryTaskStore::new());
    let records = Arc::new(InMemoryRecordStore::new());
    records.insert_job(fixture.job.clone());
    records.insert_profile(fixture.profile.clone());
    records.insert_resumes(fixture.profile.user_id, fixture.resumes);

    let task = ApplicationTask::new(1, fixture.profile.user_id, fixture.job.id);
    tasks.insert(task);

    let engine = Engine::new(
        factory,
        gateway,
        config,
        tasks,
        records,
        Arc::new(FileSnapshotStore::new(args.snapshot_dir)),
    );

    let task = engine.run_task(1).context("running task")?;
    println!("{}", serde_json::to_string_pretty(&task)?);
    Ok(())
}
