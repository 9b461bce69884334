//! Inbound event classification
//!
//! The transport turns raw updates into [`InboundEvent`]s; text starting
//! with `/` becomes a [`Command`], button payloads become a
//! [`CallbackAction`]. Payload strings are produced and parsed only here.

use crate::types::{MediaRef, UserId};
use regex::Regex;
use std::sync::LazyLock;

static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([A-Za-z_]+)(?:@\S+)?(?:\s+([\s\S]*))?$").expect("valid command regex")
});

const LABEL_PREFIX: &str = "label:";
const SET_DEFAULT_PREFIX: &str = "setdefault:";
const DELETE_CONFIRM_PREFIX: &str = "delete:confirm:";
const DELETE_CANCEL: &str = "delete:cancel";
const LABEL_REFRESH: &str = "refresh";
const LABEL_CANCEL: &str = "cancel";

/// A slash command sent as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// `/tags` - list labels
    Tags,
    /// `/refresh` - force a label refresh
    Refresh,
    /// `/label <name>` - set the default label
    Label(Option<String>),
    /// `/edit [n]`
    Edit(Option<String>),
    /// `/delete [n]`
    Delete(Option<String>),
    /// `/cancel` - leave edit mode
    Cancel,
    /// `/publish [text]` - publish the pending submission now
    Publish(Option<String>),
    /// Anything else starting with `/`
    Unknown(String),
}

impl Command {
    /// Parse a command; `None` when `text` does not start with `/`
    ///
    /// Slash text that is not a well-formed command becomes
    /// [`Command::Unknown`] holding its first word.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let Some(caps) = COMMAND_RE.captures(text) else {
            let word = rest.split_whitespace().next().unwrap_or_default();
            return Some(Self::Unknown(word.to_string()));
        };
        let name = caps.get(1)?.as_str().to_ascii_lowercase();
        let arg = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|a| !a.is_empty());

        Some(match name.as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "tags" => Self::Tags,
            "refresh" => Self::Refresh,
            "label" => Self::Label(arg),
            "edit" => Self::Edit(arg),
            "delete" => Self::Delete(arg),
            "cancel" => Self::Cancel,
            "publish" => Self::Publish(arg),
            _ => Self::Unknown(name),
        })
    }
}

/// A pick from the label prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelChoice {
    /// A concrete label
    Label(String),
    /// Re-fetch labels and re-render the prompt
    Refresh,
    /// Discard the pending submission (or edit)
    Cancel,
}

/// A button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Label prompt pick
    Label(LabelChoice),
    /// Set the user's default label
    SetDefault(String),
    /// Confirm closing a record
    DeleteConfirm(u64),
    /// Dismiss a delete prompt
    DeleteCancel,
}

impl CallbackAction {
    /// Parse a button payload
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(label) = data.strip_prefix(LABEL_PREFIX) {
            let choice = match label {
                "" => return None,
                LABEL_REFRESH => LabelChoice::Refresh,
                LABEL_CANCEL => LabelChoice::Cancel,
                other => LabelChoice::Label(other.to_string()),
            };
            return Some(Self::Label(choice));
        }
        if let Some(label) = data.strip_prefix(SET_DEFAULT_PREFIX) {
            return (!label.is_empty()).then(|| Self::SetDefault(label.to_string()));
        }
        if data == DELETE_CANCEL {
            return Some(Self::DeleteCancel);
        }
        data.strip_prefix(DELETE_CONFIRM_PREFIX)
            .and_then(|n| n.parse().ok())
            .map(Self::DeleteConfirm)
    }

    /// Payload string that [`CallbackAction::parse`] maps back to `self`
    pub fn payload(&self) -> String {
        match self {
            Self::Label(LabelChoice::Label(label)) => format!("{LABEL_PREFIX}{label}"),
            Self::Label(LabelChoice::Refresh) => format!("{LABEL_PREFIX}{LABEL_REFRESH}"),
            Self::Label(LabelChoice::Cancel) => format!("{LABEL_PREFIX}{LABEL_CANCEL}"),
            Self::SetDefault(label) => format!("{SET_DEFAULT_PREFIX}{label}"),
            Self::DeleteConfirm(number) => format!("{DELETE_CONFIRM_PREFIX}{number}"),
            Self::DeleteCancel => DELETE_CANCEL.to_string(),
        }
    }
}

/// An event delivered by the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Photo message
    Photo {
        /// Sender
        user: UserId,
        /// The largest photo size
        media: MediaRef,
        /// Optional caption
        caption: Option<String>,
    },
    /// Video message
    Video {
        /// Sender
        user: UserId,
        /// The video file
        media: MediaRef,
        /// Optional caption
        caption: Option<String>,
    },
    /// Plain text
    Text {
        /// Sender
        user: UserId,
        /// Message text
        text: String,
    },
    /// Slash command
    Command {
        /// Sender
        user: UserId,
        /// Parsed command
        command: Command,
    },
    /// Button press
    Callback {
        /// Sender
        user: UserId,
        /// Parsed payload
        action: CallbackAction,
    },
}

impl InboundEvent {
    /// Classify a text message as a command or plain text
    pub fn from_text(user: UserId, text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Command::parse(text).map_or_else(
            || Self::Text {
                user,
                text: text.to_string(),
            },
            |command| Self::Command { user, command },
        ))
    }

    /// Classify a button payload; unknown payloads yield `None`
    pub fn from_callback(user: UserId, data: &str) -> Option<Self> {
        CallbackAction::parse(data).map(|action| Self::Callback { user, action })
    }

    /// The sender of this event
    pub const fn user(&self) -> UserId {
        match self {
            Self::Photo { user, .. }
            | Self::Video { user, .. }
            | Self::Text { user, .. }
            | Self::Command { user, .. }
            | Self::Callback { user, .. } => *user,
        }
    }
}
