//! Chat transport capabilities
//!
//! The relay talks back to users and pulls media through these traits. The
//! Telegram binding implements both; tests substitute recording mocks.

pub mod telegram;

pub use telegram::TelegramClient;

use crate::error::Result;
use crate::types::{Choice, UserId};
use async_trait::async_trait;

/// Source of media bytes referenced by a transport file id
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Download the referenced content, failing if it exceeds `max_bytes`
    async fn fetch_content_bytes(&self, file_id: &str, max_bytes: u64) -> Result<Vec<u8>>;
}

/// Outbound messages to a user
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send plain text
    async fn notify(&self, to: UserId, text: &str) -> Result<()>;

    /// Send text with rows of choice buttons
    async fn prompt(&self, to: UserId, text: &str, choices: &[Vec<Choice>]) -> Result<()>;
}
