//! Slash command dispatch

use super::Relay;
use super::event::Command;
use super::text::{USAGE, default_label_keyboard, numbered_labels};
use crate::error::{Error, Result};
use crate::types::UserId;
use std::fmt::Write;

impl Relay {
    /// Dispatch a parsed command
    pub async fn on_command(&self, user: UserId, command: Command) -> Result<()> {
        tracing::debug!(user, ?command, "command received");
        match command {
            Command::Start => self.say(user, &format!("👋 Welcome!\n\n{USAGE}")).await,
            Command::Help => self.say(user, USAGE).await,
            Command::Tags => self.on_tags(user).await,
            Command::Refresh => self.on_refresh(user).await,
            Command::Label(None) => self.on_label_menu(user).await,
            Command::Label(Some(label)) => self.on_set_default_label(user, &label).await,
            Command::Edit(arg) => self.on_edit_start(user, arg.as_deref()).await,
            Command::Delete(arg) => self.on_delete_request(user, arg.as_deref()).await,
            Command::Cancel => self.on_edit_cancel(user).await,
            Command::Publish(content) => self.on_publish_now(user, content.as_deref()).await,
            Command::Unknown(name) => {
                self.say(user, &format!("❓ Unknown command /{name}\n\n{USAGE}"))
                    .await
            }
        }
    }

    /// Store the user's default label; it must be one of the current labels
    pub async fn on_set_default_label(&self, user: UserId, label: &str) -> Result<()> {
        let labels = self.labels.current_labels().await;
        if !labels.iter().any(|l| l == label) {
            return self
                .reject(user, &Error::InvalidLabel(label.to_string()))
                .await;
        }

        self.sessions.set_default_label(user, label);
        tracing::debug!(user, label, "default label set");
        self.say(user, &format!("✅ Default label set to: {label}")).await
    }

    async fn on_tags(&self, user: UserId) -> Result<()> {
        let labels = self.labels.current_labels().await;
        let mut message = format!("🏷️ Available labels:\n\n{}", numbered_labels(&labels));
        if let Some(default) = self.sessions.default_label(user) {
            let _ = write!(message, "\nDefault: {default}");
        }
        self.say(user, &message).await
    }

    async fn on_refresh(&self, user: UserId) -> Result<()> {
        match self.labels.force_refresh().await {
            Ok(labels) => {
                self.say(
                    user,
                    &format!("🔄 Labels refreshed:\n\n{}", numbered_labels(&labels)),
                )
                .await
            }
            Err(e) => {
                tracing::warn!(user, error = %e.source, "forced label refresh failed");
                self.say(
                    user,
                    &format!("❌ {e}\n\nStill using:\n{}", numbered_labels(&e.fallback)),
                )
                .await
            }
        }
    }

    async fn on_label_menu(&self, user: UserId) -> Result<()> {
        let labels = self.labels.current_labels().await;
        let current = self
            .sessions
            .default_label(user)
            .unwrap_or_else(|| self.settings.fallback_label.clone());
        self.ask(
            user,
            &format!("🏷️ Default label: {current}\n\n💡 Pick a new default label"),
            &default_label_keyboard(&labels),
        )
        .await
    }
}
