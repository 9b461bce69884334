//! CLI commands
//!
//! Command implementations for the `moments` binary.

mod args;
mod auth;
mod run;

pub use args::BotArgs;
pub use auth::{run_auth_setup, run_auth_test};
pub use run::run_bot;
