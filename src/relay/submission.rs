//! Submission state machine: capture, label pick, caption refinement, publish trigger

use super::Relay;
use super::event::LabelChoice;
use super::scheduler::ArmOutcome;
use super::text::{self, label_keyboard};
use crate::error::{Error, Result};
use crate::types::{MediaRef, PendingSubmission, SubmissionKind, SubmissionStage, UserId};
use std::sync::Arc;

const CAPTION_PREVIEW_CHARS: usize = 200;

impl Relay {
    /// A photo arrived
    pub async fn on_photo(
        &self,
        user: UserId,
        media: MediaRef,
        caption: Option<String>,
    ) -> Result<()> {
        self.on_media(user, SubmissionKind::Photo, media, caption).await
    }

    /// A video arrived
    pub async fn on_video(
        &self,
        user: UserId,
        media: MediaRef,
        caption: Option<String>,
    ) -> Result<()> {
        self.on_media(user, SubmissionKind::Video, media, caption).await
    }

    async fn on_media(
        &self,
        user: UserId,
        kind: SubmissionKind,
        media: MediaRef,
        caption: Option<String>,
    ) -> Result<()> {
        let limit = self.settings.max_media_bytes;
        if let Some(size) = media.file_size.filter(|size| *size > limit) {
            return self.reject(user, &Error::MediaTooLarge { size, limit }).await;
        }

        let caption = caption.filter(|c| !c.trim().is_empty());
        if let Some(caption) = caption.as_deref() {
            if let Err(e) = self.check_length(caption) {
                return self.reject(user, &e).await;
            }
        }

        let submission = PendingSubmission::media(kind, media.file_id, caption.clone());
        if self.sessions.insert_submission_if_absent(user, submission) {
            tracing::debug!(user, %kind, "media submission captured");
            let labels = self.labels.current_labels().await;
            let message = received_message(kind, caption.as_deref());
            return self.ask(user, &message, &label_keyboard(&labels)).await;
        }

        // One submission at a time: the new media is dropped, its caption kept
        tracing::debug!(user, %kind, "submission already pending, media ignored");
        if let Some(caption) = caption {
            self.sessions.update_submission(user, |s| s.caption = caption);
        }
        self.say(
            user,
            "⚠️ A submission is already pending, this media was not attached.\n\n\
             💡 Pick a label or /publish the pending one first.",
        )
        .await
    }

    /// Free text arrived
    ///
    /// Edit mode takes priority; otherwise the text either refines the pending
    /// submission's caption or starts a new text submission.
    pub async fn on_text(&self, user: UserId, content: &str) -> Result<()> {
        if self.sessions.is_editing(user) {
            return self.commit_edit(user, content).await;
        }

        if let Err(e) = self.check_length(content) {
            return self.reject(user, &e).await;
        }

        if self
            .sessions
            .insert_submission_if_absent(user, PendingSubmission::text(content))
        {
            tracing::debug!(user, "text submission captured");
            let labels = self.labels.current_labels().await;
            let message = received_message(SubmissionKind::Text, Some(content));
            return self.ask(user, &message, &label_keyboard(&labels)).await;
        }

        let stage = self.sessions.update_submission(user, |s| {
            s.caption = content.to_string();
            s.stage()
        });
        let Some(stage) = stage else {
            tracing::debug!(user, "submission consumed before caption update");
            return Ok(());
        };

        tracing::debug!(user, ?stage, "caption updated");
        let hint = match stage {
            SubmissionStage::LabelPending => "💡 Pick a label to publish.",
            SubmissionStage::Ready => "💡 It will be published automatically, or send /publish now.",
        };
        self.say(
            user,
            &format!(
                "📝 Text updated!\n\nCurrent text: {}\n\n{hint}",
                text::preview(content, CAPTION_PREVIEW_CHARS)
            ),
        )
        .await
    }

    /// A label prompt button was pressed
    pub async fn on_label_chosen(
        self: &Arc<Self>,
        user: UserId,
        choice: LabelChoice,
    ) -> Result<()> {
        match choice {
            LabelChoice::Refresh => self.on_label_refresh(user).await,
            LabelChoice::Cancel => self.on_label_cancel(user).await,
            LabelChoice::Label(label) => self.on_label_selected(user, &label).await,
        }
    }

    async fn on_label_selected(self: &Arc<Self>, user: UserId, label: &str) -> Result<()> {
        if self
            .sessions
            .update_edit(user, |edit| edit.select_label(label))
            .is_some()
        {
            tracing::debug!(user, label, "edit label selected");
            let message =
                format!("📝 Label set to: {label}\n\n💡 Now send the new content for the record.");
            return self.say(user, &message).await;
        }

        let kind = self.sessions.update_submission(user, |s| {
            s.select_label(label);
            s.kind
        });

        match kind {
            None => self.say(user, "❌ Nothing is pending").await,
            Some(SubmissionKind::Text) => {
                tracing::debug!(user, label, "text labelled, publishing");
                self.progress(user, &format!("✅ Label selected: {label}")).await;
                self.publish_and_report(user, None).await.map(drop)
            }
            Some(kind) => {
                let outcome = self.arm_auto_publish(user);
                tracing::debug!(user, label, %kind, ?outcome, "media labelled");
                let minutes = self.settings.auto_publish_delay.as_secs().div_ceil(60);
                self.say(
                    user,
                    &format!(
                        "✅ Label selected: {label}\n\n💡 Keep sending text to update the caption, \
                         or wait {minutes} min for it to publish automatically."
                    ),
                )
                .await
            }
        }
    }

    async fn on_label_refresh(&self, user: UserId) -> Result<()> {
        let (message, labels) = match self.labels.force_refresh().await {
            Ok(labels) => ("🔄 Labels refreshed!".to_string(), labels),
            Err(e) => {
                tracing::warn!(user, error = %e.source, "forced label refresh failed");
                (format!("❌ {e}"), e.fallback)
            }
        };
        self.ask(
            user,
            &format!("{message}\n\n💡 Pick a label."),
            &label_keyboard(&labels),
        )
        .await
    }

    async fn on_label_cancel(&self, user: UserId) -> Result<()> {
        if self.sessions.take_edit(user).is_some() {
            tracing::debug!(user, "edit cancelled from label prompt");
            return self.say(user, "❌ Edit cancelled").await;
        }
        if self.take_pending_submission(user).is_some() {
            tracing::debug!(user, "submission cancelled");
            return self.say(user, "❌ Cancelled, nothing was published").await;
        }
        self.say(user, "❌ Nothing is pending").await
    }

    /// Start the auto-publish countdown; an armed timer is left as is
    fn arm_auto_publish(self: &Arc<Self>, user: UserId) -> ArmOutcome {
        let relay = Arc::downgrade(self);
        self.scheduler
            .arm(user, self.settings.auto_publish_delay, move |generation| async move {
                let Some(relay) = relay.upgrade() else {
                    return;
                };
                relay.scheduler.complete(user, generation);
                relay.on_auto_publish(user).await;
            })
    }

    /// Auto-publish deadline reached
    ///
    /// The submission may have been published or cancelled since the timer was
    /// armed, so existence is decided by the take inside the publish path.
    pub async fn on_auto_publish(&self, user: UserId) {
        tracing::debug!(user, "auto-publish timer fired");
        match self.publish_and_report(user, None).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(user, "auto-publish found nothing pending"),
            Err(e) => tracing::warn!(user, error = %e, "failed to report auto-publish result"),
        }
    }

    /// Manual publish trigger; `content` replaces the stored caption
    pub async fn on_publish_now(&self, user: UserId, content: Option<&str>) -> Result<()> {
        if let Some(content) = content {
            if let Err(e) = self.check_length(content) {
                return self.reject(user, &e).await;
            }
        }
        if self.publish_and_report(user, content).await? {
            Ok(())
        } else {
            self.say(user, "❌ Nothing is pending").await
        }
    }
}

fn received_message(kind: SubmissionKind, caption: Option<&str>) -> String {
    let (headline, hint) = match kind {
        SubmissionKind::Text => ("📝 Text received!", "💡 Pick a label to publish."),
        SubmissionKind::Photo => (
            "📷 Photo received!",
            "💡 Pick a label, then send text to update the caption.",
        ),
        SubmissionKind::Video => (
            "🎥 Video received!",
            "💡 Pick a label, then send text to update the caption.",
        ),
    };

    match caption {
        Some(caption) => format!(
            "{headline}\n\nCurrent text: {}\n\n{hint}",
            text::preview(caption, CAPTION_PREVIEW_CHARS)
        ),
        None => format!("{headline}\n\n{hint}"),
    }
}
