//! # apply-engine
//!
//! Automated job-application submission. The engine drives a real browser
//! through a platform's multi-step application wizard, answering form
//! questions with AI assistance and deterministic fallbacks, and records an
//! auditable outcome on the task.
//!
//! ## Architecture
//!
//! One task is one attempt to submit one application. [`Engine::run_task`]
//! claims the task, picks a resume, opens a dedicated browser session, and
//! runs the bounded step loop until the wizard reaches a terminal state or
//! a fatal condition ends the attempt. Every decision lands in the task's
//! audit log; failures additionally capture a page snapshot.
//!
//! ```rust,no_run
//! use apply_engine::browser::LaunchOptions;
//! use apply_engine::config::EngineConfig;
//! use apply_engine::engine::{BrowserDriverFactory, Engine};
//! use apply_engine::ai::{AiGateway, GeminiClient, UsageLedger};
//! use apply_engine::store::{InMemoryRecordStore, InMemorySnapshotStore, InMemoryTaskStore};
//! use std::sync::Arc;
//!
//! # fn main() -> apply_engine::error::Result<()> {
//! let config = EngineConfig::default();
//! let gateway = Arc::new(AiGateway::new(
//!     Box::new(GeminiClient::new("api-key".into(), config.ai_call_timeout)),
//!     Arc::new(UsageLedger::new(config.rate_limit_calls, config.rate_limit_window)),
//! ));
//! let factory = BrowserDriverFactory::new(
//!     LaunchOptions::new().headless(true),
//!     config.required_answer_policy,
//!     config.settle_delay,
//! );
//!
//! let engine = Engine::new(
//!     factory,
//!     gateway,
//!     config,
//!     Arc::new(InMemoryTaskStore::new()),
//!     Arc::new(InMemoryRecordStore::new()),
//!     Arc::new(InMemorySnapshotStore::new()),
//! );
//! let task = engine.run_task(1)?;
//! println!("task finished with status {:?}", task.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`engine`]: task orchestration and the bounded step loop
//! - [`browser`]: hardened browser session management
//! - [`form`]: platform strategies, question scraping, answer execution
//! - [`ai`]: rate-limited gateway to the answering model
//! - [`resolver`] / [`resume`]: answer validation and resume selection
//! - [`store`]: persistence seams and in-memory implementations
//! - [`model`] / [`audit`] / [`config`] / [`error`]: shared types

pub mod ai;
pub mod audit;
pub mod browser;
pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod model;
pub mod resolver;
pub mod resume;
pub mod store;

pub use audit::AuditLog;
pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use config::{EngineConfig, RequiredAnswerPolicy};
pub use engine::{BrowserDriverFactory, DriverFactory, Engine, StepDriver};
pub use error::{EngineError, Result};
pub use model::{ApplicationTask, JobRecord, JobSource, ResumeCandidate, TaskStatus, UserProfile};
