//! Recording mock chat transport
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use moments_relay::error::{Error, Result};
use moments_relay::transport::{ContentSource, Notifier};
use moments_relay::types::{Choice, UserId};
use std::collections::HashMap;
use std::sync::Mutex;

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: UserId,
    pub text: String,
    pub choices: Vec<Vec<Choice>>,
}

impl SentMessage {
    /// All button payloads, row by row
    pub fn payloads(&self) -> Vec<String> {
        self.choices
            .iter()
            .flatten()
            .map(|c| c.payload.clone())
            .collect()
    }
}

/// Notifier that records everything it is asked to send
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.text).collect()
    }

    pub fn last(&self) -> Option<SentMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn last_text(&self) -> String {
        self.last().map(|m| m.text).unwrap_or_default()
    }

    /// Most recent message that carried buttons
    pub fn last_prompt(&self) -> Option<SentMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| !m.choices.is_empty())
            .cloned()
    }

    pub fn any_text_contains(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, to: UserId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(SentMessage {
            to,
            text: text.to_string(),
            choices: Vec::new(),
        });
        Ok(())
    }

    async fn prompt(&self, to: UserId, text: &str, choices: &[Vec<Choice>]) -> Result<()> {
        self.sent.lock().unwrap().push(SentMessage {
            to,
            text: text.to_string(),
            choices: choices.to_vec(),
        });
        Ok(())
    }
}

/// Content source serving in-memory files
#[derive(Default)]
pub struct MockContentSource {
    files: Mutex<HashMap<String, Vec<u8>>>,
    fetch_calls: Mutex<Vec<String>>,
    error_on_fetch: Mutex<Option<String>>,
}

impl MockContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, file_id: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(file_id.to_string(), bytes);
    }

    pub fn fail_fetch(&self, msg: &str) {
        *self.error_on_fetch.lock().unwrap() = Some(msg.to_string());
    }

    pub fn get_fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch_content_bytes(&self, file_id: &str, max_bytes: u64) -> Result<Vec<u8>> {
        self.fetch_calls.lock().unwrap().push(file_id.to_string());
        if let Some(msg) = self.error_on_fetch.lock().unwrap().as_ref() {
            return Err(Error::Telegram(msg.clone()));
        }

        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .unwrap_or_else(|| vec![0xFF, 0xD8, 0xFF]);
        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(Error::MediaTooLarge {
                size,
                limit: max_bytes,
            });
        }
        Ok(bytes)
    }
}
