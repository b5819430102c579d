//! AI answering service access.
//!
//! Every outbound AI call in the engine goes through [`AiGateway`], which
//! enforces the per-user rate limit, records usage accounting for every
//! attempted call, and translates transport failures into uniform gateway
//! errors so callers only ever see "no answer available".

pub mod client;
pub mod gateway;
pub mod ledger;
pub mod prompts;

pub use client::{Completion, GeminiClient, LanguageModel, ModelError};
pub use gateway::{AiGateway, GatewayError};
pub use ledger::UsageLedger;
