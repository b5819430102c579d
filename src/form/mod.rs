//! Form step inspection and execution.
//!
//! This module turns the current wizard step into typed
//! [`QuestionDescriptor`]s, and applies resolved answers back to the live
//! page. Platform differences live entirely behind [`FormStepStrategy`];
//! the navigation loop never branches on the platform.

pub mod executor;
pub mod question;
pub mod scraper;
pub mod strategy;

pub use executor::{advance, apply_answers, effective_answers, AdvanceOutcome};
pub use question::{AnswerSet, QuestionDescriptor, QuestionKind};
pub use scraper::scrape_questions;
pub use strategy::{strategy_for, FormStepStrategy, IndeedStrategy, LinkedinStrategy};
