//! Test data factories for moments-relay types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use moments_relay::relay::{CallbackAction, Command, InboundEvent, LabelChoice};
use moments_relay::types::{MediaRef, Record, RepoConfig, UserId};

/// The configured owner in every test relay
pub const OWNER: UserId = 4242;

/// Someone who is not the owner
pub const STRANGER: UserId = 9999;

pub fn make_repo_config() -> RepoConfig {
    RepoConfig {
        owner: "octo".to_string(),
        repo: "moments".to_string(),
        file_repo: "moments-files".to_string(),
        host: None,
    }
}

/// Create an open record with fixed timestamps
pub fn make_record(number: u64, body: &str, labels: &[&str]) -> Record {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Record {
        number,
        html_url: format!("https://github.com/octo/moments/issues/{number}"),
        title: "1714564800".to_string(),
        body: body.to_string(),
        labels: labels.iter().map(ToString::to_string).collect(),
        open: true,
        created_at: created,
        updated_at: created,
    }
}

pub fn photo(user: UserId, file_id: &str, caption: Option<&str>) -> InboundEvent {
    InboundEvent::Photo {
        user,
        media: MediaRef {
            file_id: file_id.to_string(),
            file_size: Some(1024),
        },
        caption: caption.map(ToString::to_string),
    }
}

pub fn video(user: UserId, file_id: &str, file_size: u64) -> InboundEvent {
    InboundEvent::Video {
        user,
        media: MediaRef {
            file_id: file_id.to_string(),
            file_size: Some(file_size),
        },
        caption: None,
    }
}

/// Plain text or a slash command, classified the way the transport does it
pub fn text(user: UserId, content: &str) -> InboundEvent {
    InboundEvent::from_text(user, content).unwrap()
}

pub fn command(user: UserId, command: Command) -> InboundEvent {
    InboundEvent::Command { user, command }
}

pub fn pick_label(user: UserId, label: &str) -> InboundEvent {
    InboundEvent::Callback {
        user,
        action: CallbackAction::Label(LabelChoice::Label(label.to_string())),
    }
}

pub fn label_action(user: UserId, choice: LabelChoice) -> InboundEvent {
    InboundEvent::Callback {
        user,
        action: CallbackAction::Label(choice),
    }
}

/// A button press, parsed from its payload string
pub fn button(user: UserId, payload: &str) -> InboundEvent {
    InboundEvent::from_callback(user, payload).unwrap()
}
