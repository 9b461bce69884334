//! Telegram Bot API binding
//!
//! Long polling, message sending with inline keyboards, callback answers and
//! file downloads over plain HTTPS. Downloads are the only retried call.

use crate::error::{Error, Result};
use crate::relay::InboundEvent;
use crate::transport::{ContentSource, Notifier};
use crate::types::{Choice, MediaRef, UserId};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public Bot API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Longest message text the Bot API accepts
pub const MESSAGE_LIMIT: usize = 4096;

/// Default timeout for ordinary API calls
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Timeout for a single media download
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Download attempts before giving up
const DOWNLOAD_ATTEMPTS: u32 = 3;

/// Base delay between download attempts; attempt `n` waits `n` times this
const DOWNLOAD_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self, method: &str) -> Result<T> {
        if !self.ok {
            let description = self.description.unwrap_or_else(|| "unknown error".to_string());
            return Err(Error::Telegram(format!("{method}: {description}")));
        }
        self.result
            .ok_or_else(|| Error::Telegram(format!("{method}: missing result")))
    }
}

/// One item from `getUpdates`
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id, used as the polling offset
    pub update_id: i64,
    /// New incoming message
    pub message: Option<Message>,
    /// Inline button press
    pub callback_query: Option<CallbackQuery>,
}

/// Incoming message
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message id within the chat
    pub message_id: i64,
    /// Chat the message belongs to
    pub chat: Chat,
    /// Sender, absent for channel posts
    pub from: Option<User>,
    /// Text of a text message
    pub text: Option<String>,
    /// Caption of a media message
    pub caption: Option<String>,
    /// Available sizes of a photo
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
    /// Video attachment
    pub video: Option<Video>,
}

/// Chat reference
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat id; equals the user id in private chats
    pub id: i64,
}

/// Bot API user
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User id
    pub id: i64,
    /// Whether this is a bot account
    #[serde(default)]
    pub is_bot: bool,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Username without `@`
    pub username: Option<String>,
}

/// One resolution of a photo
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    /// File id for `getFile`
    pub file_id: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Size in bytes, if known
    pub file_size: Option<u64>,
}

/// Video attachment
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    /// File id for `getFile`
    pub file_id: String,
    /// Size in bytes, if known
    pub file_size: Option<u64>,
}

/// Inline button press
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Id to answer with `answerCallbackQuery`
    pub id: String,
    /// Who pressed the button
    pub from: User,
    /// Button payload
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct File {
    file_size: Option<u64>,
    file_path: Option<String>,
}

#[derive(Serialize)]
struct GetUpdatesPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: UserId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    callback_data: &'a str,
}

impl<'a> InlineKeyboardMarkup<'a> {
    fn from_choices(rows: &'a [Vec<Choice>]) -> Self {
        Self {
            inline_keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|choice| InlineKeyboardButton {
                            text: &choice.caption,
                            callback_data: &choice.payload,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct AnswerCallbackPayload<'a> {
    callback_query_id: &'a str,
}

#[derive(Serialize)]
struct GetFilePayload<'a> {
    file_id: &'a str,
}

/// Bot API client using reqwest
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
    download_attempts: u32,
    retry_delay: Duration,
}

impl TelegramClient {
    /// Create a client for the public Bot API
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client for a custom API base (local Bot API server, tests)
    pub fn with_api_base(token: String, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            download_attempts: DOWNLOAD_ATTEMPTS,
            retry_delay: DOWNLOAD_RETRY_DELAY,
        }
    }

    /// Override the download retry policy
    #[must_use]
    pub fn with_download_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.download_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{file_path}", self.api_base, self.token)
    }

    async fn call<T, P>(&self, method: &str, payload: &P, timeout: Duration) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + Sync + ?Sized,
    {
        let response: ApiResponse<T> = self
            .client
            .post(self.method_url(method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(redact)?
            .json()
            .await
            .map_err(redact)?;
        response.into_result(method)
    }

    /// The bot's own account
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({}), default_timeout())
            .await
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let payload = GetUpdatesPayload {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message", "callback_query"],
        };
        let timeout = Duration::from_secs(timeout_secs + DEFAULT_TIMEOUT_SECS);
        self.call("getUpdates", &payload, timeout).await
    }

    /// Send a message, optionally with inline buttons
    pub async fn send_message(
        &self,
        chat_id: UserId,
        text: &str,
        choices: Option<&[Vec<Choice>]>,
    ) -> Result<()> {
        let text = truncate_message(text);
        let payload = SendMessagePayload {
            chat_id,
            text: text.as_ref(),
            reply_markup: choices.map(InlineKeyboardMarkup::from_choices),
        };
        let _: serde_json::Value = self
            .call("sendMessage", &payload, default_timeout())
            .await?;
        Ok(())
    }

    /// Acknowledge a button press so the client stops its spinner
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let payload = AnswerCallbackPayload { callback_query_id };
        let _: bool = self
            .call("answerCallbackQuery", &payload, default_timeout())
            .await?;
        Ok(())
    }

    async fn download_once(&self, file_id: &str, max_bytes: u64) -> Result<Vec<u8>> {
        let file: File = self
            .call("getFile", &GetFilePayload { file_id }, default_timeout())
            .await?;

        if let Some(size) = file.file_size.filter(|size| *size > max_bytes) {
            return Err(Error::MediaTooLarge {
                size,
                limit: max_bytes,
            });
        }
        let file_path = file
            .file_path
            .ok_or_else(|| Error::Telegram(format!("getFile: no path for {file_id}")))?;

        let response = self
            .client
            .get(self.file_url(&file_path))
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .send()
            .await
            .map_err(redact)?
            .error_for_status()
            .map_err(redact)?;

        if let Some(size) = response.content_length().filter(|size| *size > max_bytes) {
            return Err(Error::MediaTooLarge {
                size,
                limit: max_bytes,
            });
        }

        let bytes = response.bytes().await.map_err(redact)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ContentSource for TelegramClient {
    async fn fetch_content_bytes(&self, file_id: &str, max_bytes: u64) -> Result<Vec<u8>> {
        let mut attempt = 1;
        loop {
            match self.download_once(file_id, max_bytes).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.is_validation() || attempt >= self.download_attempts => return Err(e),
                Err(e) => {
                    tracing::warn!(file_id, attempt, error = %e, "download failed, retrying");
                    tokio::time::sleep(self.retry_delay * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, to: UserId, text: &str) -> Result<()> {
        self.send_message(to, text, None).await
    }

    async fn prompt(&self, to: UserId, text: &str, choices: &[Vec<Choice>]) -> Result<()> {
        self.send_message(to, text, Some(choices)).await
    }
}

const fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

/// Request URLs carry the bot token; keep it out of error messages
fn redact(error: reqwest::Error) -> Error {
    Error::Http(error.without_url())
}

fn truncate_message(text: &str) -> std::borrow::Cow<'_, str> {
    if text.chars().count() <= MESSAGE_LIMIT {
        return std::borrow::Cow::Borrowed(text);
    }
    let mut cut: String = text.chars().take(MESSAGE_LIMIT - 3).collect();
    cut.push_str("...");
    std::borrow::Cow::Owned(cut)
}

/// Turn an update into a relay event; unsupported updates yield `None`
pub fn classify_update(update: &Update) -> Option<InboundEvent> {
    if let Some(query) = &update.callback_query {
        return InboundEvent::from_callback(query.from.id, query.data.as_deref()?);
    }

    let message = update.message.as_ref()?;
    let user = message.chat.id;

    if let Some(photo) = message
        .photo
        .iter()
        .max_by_key(|p| (u64::from(p.width) * u64::from(p.height), p.file_size))
    {
        return Some(InboundEvent::Photo {
            user,
            media: MediaRef {
                file_id: photo.file_id.clone(),
                file_size: photo.file_size,
            },
            caption: message.caption.clone(),
        });
    }

    if let Some(video) = &message.video {
        return Some(InboundEvent::Video {
            user,
            media: MediaRef {
                file_id: video.file_id.clone(),
                file_size: video.file_size,
            },
            caption: message.caption.clone(),
        });
    }

    InboundEvent::from_text(user, message.text.as_deref()?)
}
