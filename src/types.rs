//! Core types for moments-relay

use chrono::{DateTime, Utc};

/// Chat identity of a user (a Telegram chat id)
pub type UserId = i64;

/// What a pending submission carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    /// Plain text, no media
    Text,
    /// A single photo
    Photo,
    /// A single video
    Video,
}

impl SubmissionKind {
    /// Lowercase name, also used as the uploaded file prefix
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
        }
    }

    /// File extension for uploaded media, `None` for text
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Photo => Some("jpg"),
            Self::Video => Some("mp4"),
        }
    }

    /// Whether this kind carries media that must be uploaded
    pub const fn is_media(self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to media held by the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Opaque transport file id
    pub file_id: String,
    /// Size reported by the transport, if known
    pub file_size: Option<u64>,
}

/// Observable stage of a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    /// Captured and waiting for a label pick
    LabelPending,
    /// Labelled media waiting for the auto-publish deadline or a manual trigger
    Ready,
}

/// Captured user input that has not been published yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    /// Immutable once created
    pub kind: SubmissionKind,
    /// Transport file id, empty for text
    pub media_ref: String,
    /// Body text, replaced by later text events
    pub caption: String,
    /// Selected labels, at most one entry (last pick wins)
    pub labels: Vec<String>,
}

impl PendingSubmission {
    /// A text submission whose body is `text`
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: SubmissionKind::Text,
            media_ref: String::new(),
            caption: text.into(),
            labels: Vec::new(),
        }
    }

    /// A photo or video submission
    pub fn media(
        kind: SubmissionKind,
        media_ref: impl Into<String>,
        caption: Option<String>,
    ) -> Self {
        Self {
            kind,
            media_ref: media_ref.into(),
            caption: caption.unwrap_or_default(),
            labels: Vec::new(),
        }
    }

    /// Overwrite the selection with exactly one label
    pub fn select_label(&mut self, label: &str) {
        self.labels = vec![label.to_string()];
    }

    /// Current stage, derived from whether a label was picked
    pub fn stage(&self) -> SubmissionStage {
        if self.labels.is_empty() {
            SubmissionStage::LabelPending
        } else {
            SubmissionStage::Ready
        }
    }
}

/// In-progress modification of a published record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Record being edited
    pub target_record_number: u64,
    /// Body at edit start
    pub original_content: String,
    /// Labels at edit start
    pub original_labels: Vec<String>,
    /// Labels the commit will use, defaults to `original_labels`
    pub selected_labels: Vec<String>,
    /// When the edit started (informational)
    pub started_at: DateTime<Utc>,
}

impl PendingEdit {
    /// Snapshot a record for editing
    pub fn new(
        target_record_number: u64,
        original_content: String,
        original_labels: Vec<String>,
    ) -> Self {
        Self {
            target_record_number,
            original_content,
            selected_labels: original_labels.clone(),
            original_labels,
            started_at: Utc::now(),
        }
    }

    /// Overwrite the selection with exactly one label
    pub fn select_label(&mut self, label: &str) {
        self.selected_labels = vec![label.to_string()];
    }
}

/// A remote record (GitHub issue)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Issue number
    pub number: u64,
    /// Web URL of the issue
    pub html_url: String,
    /// Issue title
    pub title: String,
    /// Issue body
    pub body: String,
    /// Label names
    pub labels: Vec<String>,
    /// Whether the issue is open
    pub open: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Locally cached summary of a published record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRecord {
    /// Issue number
    pub number: u64,
    /// Body as last written or fetched
    pub content: String,
    /// Label names
    pub labels: Vec<String>,
    /// URLs of uploaded media referenced by the body
    pub media_urls: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl PublishedRecord {
    /// Summarize a remote record
    pub fn from_record(record: &Record, media_urls: Vec<String>) -> Self {
        Self {
            number: record.number,
            content: record.body.clone(),
            labels: record.labels.clone(),
            media_urls,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// One button of an outbound choice prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Text shown on the button
    pub caption: String,
    /// Payload delivered back when pressed
    pub payload: String,
}

impl Choice {
    /// Create a choice
    pub fn new(caption: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            payload: payload.into(),
        }
    }
}

/// Where records and uploaded files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository holding the records
    pub repo: String,
    /// Repository holding uploaded media
    pub file_repo: String,
    /// Custom GitHub Enterprise host (None for github.com)
    pub host: Option<String>,
}
