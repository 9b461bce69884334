//! Edit state machine

use super::Relay;
use super::text::{self, label_keyboard};
use crate::error::{Error, Result};
use crate::types::{PendingEdit, PublishedRecord, Record, UserId};
use std::fmt::Write;

const LIST_PREVIEW_CHARS: usize = 50;

impl Relay {
    /// `/edit [n]`: list recent records, or enter edit mode for record `n`
    pub async fn on_edit_start(&self, user: UserId, arg: Option<&str>) -> Result<()> {
        let Some(arg) = arg else {
            return self.show_recent(user, ListPurpose::Edit).await;
        };
        let number = match parse_record_number(arg) {
            Ok(number) => number,
            Err(e) => {
                self.reject(user, &e).await?;
                return self.say(user, "💡 Send /edit to see recent records").await;
            }
        };

        let record = match self.lookup_record(number).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(user, number, error = %e, "could not load record for edit");
                return self
                    .say(user, &format!("❌ Could not load record #{number}: {e}"))
                    .await;
            }
        };

        let mut message = format!(
            "✏️ Editing record #{number}\n\n📝 Current content:\n{}\n\n",
            record.content
        );
        if !record.labels.is_empty() {
            let _ = write!(message, "🏷️ Current labels: {}\n\n", record.labels.join(", "));
        }
        message.push_str("💡 Pick a label, then send the new content\n❌ /cancel stops editing");

        self.sessions
            .put_edit(user, PendingEdit::new(number, record.content, record.labels));
        tracing::debug!(user, number, "edit started");

        let labels = self.labels.current_labels().await;
        self.ask(user, &message, &label_keyboard(&labels)).await
    }

    /// Replacement content for the pending edit
    ///
    /// The edit state is consumed before the remote update; a failure is
    /// reported and the typed content is lost.
    pub(super) async fn commit_edit(&self, user: UserId, content: &str) -> Result<()> {
        if let Err(e) = self.check_length(content) {
            return self.reject(user, &e).await;
        }

        let Some(edit) = self.sessions.take_edit(user) else {
            tracing::debug!(user, "edit consumed before commit");
            return Ok(());
        };
        let number = edit.target_record_number;

        let cached = match self.lookup_record(number).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(user, number, error = %e, "could not load record, edit dropped");
                return self
                    .say(user, &format!("❌ Could not load record #{number}: {e}"))
                    .await;
            }
        };

        let labels = commit_labels(&edit, &self.settings.fallback_label);
        self.progress(user, "⏳ Updating record...").await;

        match self.records.update_record(number, content, &labels).await {
            Ok(updated) => {
                tracing::info!(user, number, ?labels, "record updated");
                self.record_cache
                    .insert(PublishedRecord::from_record(&updated, cached.media_urls));
                self.say(user, &updated_message(&updated, &labels)).await
            }
            Err(e) => {
                tracing::warn!(user, number, error = %e, "record update failed, edit dropped");
                self.say(user, &format!("❌ Update failed: {e}")).await
            }
        }
    }

    /// `/cancel`: leave edit mode without touching the record
    pub async fn on_edit_cancel(&self, user: UserId) -> Result<()> {
        match self.sessions.take_edit(user) {
            Some(edit) => {
                tracing::debug!(user, number = edit.target_record_number, "edit cancelled");
                self.say(user, "❌ Edit cancelled").await
            }
            None => self.say(user, "❌ You are not editing anything").await,
        }
    }

    /// Numbered list of recent open records
    pub(super) async fn show_recent(&self, user: UserId, purpose: ListPurpose) -> Result<()> {
        let records = match self.list_recent().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(user, error = %e, "listing recent records failed");
                return self
                    .say(user, &format!("❌ Failed to list records: {e}"))
                    .await;
            }
        };

        if records.is_empty() {
            return self.say(user, "📝 No records yet").await;
        }

        let (header, command) = match purpose {
            ListPurpose::Edit => ("📋 Recent records:", "edit"),
            ListPurpose::Delete => ("🗑️ Pick a record to delete:", "delete"),
        };
        let mut message = format!("{header}\n\n");
        for (i, record) in records.iter().enumerate() {
            let _ = writeln!(
                message,
                "{}. #{} - {}",
                i + 1,
                record.number,
                text::preview(&record.body, LIST_PREVIEW_CHARS)
            );
        }
        let _ = write!(
            message,
            "\n💡 Send /{command} <number> to {command} a record\nExample: /{command} {}",
            records[0].number
        );

        self.say(user, &message).await
    }
}

/// Which command a record listing serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ListPurpose {
    Edit,
    Delete,
}

pub(super) fn parse_record_number(arg: &str) -> Result<u64> {
    arg.trim()
        .trim_start_matches('#')
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| Error::InvalidRecordNumber(arg.to_string()))
}

/// Selected labels, else the labels at edit start, else the fallback
fn commit_labels(edit: &PendingEdit, fallback: &str) -> Vec<String> {
    if !edit.selected_labels.is_empty() {
        edit.selected_labels.clone()
    } else if !edit.original_labels.is_empty() {
        edit.original_labels.clone()
    } else {
        vec![fallback.to_string()]
    }
}

fn updated_message(record: &Record, labels: &[String]) -> String {
    let mut message = format!(
        "✅ Record #{} updated!\n\n📝 New content:\n{}\n\n",
        record.number, record.body
    );
    if !labels.is_empty() {
        let _ = write!(message, "🏷️ Labels: {}\n\n", labels.join(", "));
    }
    let _ = write!(message, "🔗 {}", record.html_url);
    message
}
