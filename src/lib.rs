//! moments-relay - publish chat messages as GitHub issues
//!
//! Turns a conversational stream of photos, videos, text, label picks and
//! edit/delete commands from a single owner into a small number of issues in a
//! GitHub repository. Submissions are held per user until a label is chosen,
//! media submissions auto-publish after a short wait.
//!
//! The [`relay::Relay`] owns all volatile state and talks to the outside world
//! through three capabilities: [`platform::RecordService`] (the issue API),
//! [`transport::ContentSource`] (fetching media bytes) and
//! [`transport::Notifier`] (outbound messages).

pub mod auth;
pub mod config;
pub mod error;
pub mod labels;
pub mod platform;
pub mod relay;
pub mod session;
pub mod transport;
pub mod types;
