//! Delete confirmation handshake
//!
//! No session state is kept between the request and the answer; the target
//! record number travels inside the confirm button payload.

use super::Relay;
use super::edit::{ListPurpose, parse_record_number};
use super::text::{self, delete_keyboard};
use crate::error::Result;
use crate::types::UserId;
use std::fmt::Write;

const CONFIRM_PREVIEW_CHARS: usize = 100;

impl Relay {
    /// `/delete [n]`: list recent records, or ask to confirm closing record `n`
    pub async fn on_delete_request(&self, user: UserId, arg: Option<&str>) -> Result<()> {
        let Some(arg) = arg else {
            return self.show_recent(user, ListPurpose::Delete).await;
        };
        let number = match parse_record_number(arg) {
            Ok(number) => number,
            Err(e) => {
                self.reject(user, &e).await?;
                return self.say(user, "💡 Send /delete to see recent records").await;
            }
        };

        let record = match self.lookup_record(number).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(user, number, error = %e, "could not load record for delete");
                return self
                    .say(user, &format!("❌ Could not load record #{number}: {e}"))
                    .await;
            }
        };

        let mut message = format!(
            "🗑️ Delete record #{number}?\n\n📝 Content:\n{}\n\n",
            text::preview(&record.content, CONFIRM_PREVIEW_CHARS)
        );
        if !record.labels.is_empty() {
            let _ = write!(message, "🏷️ Labels: {}\n\n", record.labels.join(", "));
        }
        message.push_str("⚠️ The record will be closed. Please confirm.");

        self.ask(user, &message, &delete_keyboard(number)).await
    }

    /// Confirm button pressed: close the record and forget it locally
    pub async fn on_delete_confirm(&self, user: UserId, number: u64) -> Result<()> {
        self.progress(user, &format!("⏳ Deleting record #{number}...")).await;

        if let Err(e) = self.records.close_record(number).await {
            tracing::warn!(user, number, error = %e, "closing record failed");
            return self.say(user, &format!("❌ Delete failed: {e}")).await;
        }

        self.record_cache.remove(number);
        tracing::info!(user, number, "record closed");
        self.say(user, &format!("✅ Record #{number} deleted")).await
    }

    /// Cancel button pressed
    pub async fn on_delete_cancel(&self, user: UserId) -> Result<()> {
        tracing::debug!(user, "delete cancelled");
        self.say(user, "❌ Delete cancelled").await
    }
}
