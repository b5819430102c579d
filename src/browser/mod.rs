//! Browser session management.
//!
//! Owns the lifecycle of one Chrome/Chromium session per task: hardened
//! launch (or attach to a remote CDP endpoint), stored-cookie injection,
//! and guaranteed idempotent teardown.

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
