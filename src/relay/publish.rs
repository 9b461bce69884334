//! Publication pipeline
//!
//! Turns a taken submission into a record: resolve the body, fetch and upload
//! media, create the record, cache it.

use super::Relay;
use super::text::{self, compose_body};
use crate::error::{Error, Result};
use crate::types::{PendingSubmission, PublishedRecord, Record, SubmissionKind, UserId};
use chrono::Utc;

impl Relay {
    /// Publish the user's pending submission
    ///
    /// The submission is removed from the store before anything else happens;
    /// `Ok(None)` means nothing was pending. A non-empty `content` replaces the
    /// stored caption.
    pub async fn publish_pending(
        &self,
        user: UserId,
        content: Option<&str>,
    ) -> Result<Option<Record>> {
        let Some(submission) = self.take_pending_submission(user) else {
            return Ok(None);
        };

        let status = if submission.kind.is_media() {
            "⏳ Processing media..."
        } else {
            "⏳ Publishing..."
        };
        self.progress(user, status).await;

        self.publish_submission(user, &submission, content)
            .await
            .map(Some)
    }

    /// [`Relay::publish_pending`] plus the outcome message
    ///
    /// Returns whether a submission was pending.
    pub(super) async fn publish_and_report(
        &self,
        user: UserId,
        content: Option<&str>,
    ) -> Result<bool> {
        match self.publish_pending(user, content).await {
            Ok(Some(record)) => {
                self.say(
                    user,
                    &format!("✅ Published #{}!\n\n🔗 {}", record.number, record.html_url),
                )
                .await?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                tracing::warn!(user, error = %e, "publish failed, submission discarded");
                self.say(user, &format!("❌ Publish failed: {e}")).await?;
                Ok(true)
            }
        }
    }

    async fn publish_submission(
        &self,
        user: UserId,
        submission: &PendingSubmission,
        content: Option<&str>,
    ) -> Result<Record> {
        let body_text = resolve_body(submission, content);
        self.check_length(&body_text)?;
        let labels = self.resolve_labels(user, submission);

        let mut media_urls = Vec::new();
        if let Some(extension) = submission.kind.extension() {
            let url = self
                .upload_media(submission.kind, &submission.media_ref, extension)
                .await?;
            media_urls.push(url);
        }

        let title = Utc::now().timestamp().to_string();
        let body = compose_body(&body_text, &media_urls);
        let record = self.records.create_record(&title, &body, &labels).await?;

        tracing::info!(
            user,
            number = record.number,
            kind = %submission.kind,
            ?labels,
            "record published"
        );
        self.record_cache
            .insert(PublishedRecord::from_record(&record, media_urls));
        Ok(record)
    }

    async fn upload_media(
        &self,
        kind: SubmissionKind,
        file_id: &str,
        extension: &str,
    ) -> Result<String> {
        let limit = self.settings.max_media_bytes;
        let bytes = self.content.fetch_content_bytes(file_id, limit).await?;
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if size > limit {
            return Err(Error::MediaTooLarge { size, limit });
        }

        let timestamp = Utc::now().timestamp();
        let file_name = format!("{kind}_{timestamp}.{extension}");
        let url = self
            .records
            .upload_file(
                &format!("{timestamp}_{file_name}"),
                &bytes,
                &format!("Add media file: {file_name}"),
            )
            .await?;

        tracing::debug!(%file_name, size, "media uploaded");
        Ok(url)
    }

    /// Picked label, else the user's default, else the fallback
    fn resolve_labels(&self, user: UserId, submission: &PendingSubmission) -> Vec<String> {
        if !submission.labels.is_empty() {
            return submission.labels.clone();
        }
        self.sessions
            .default_label(user)
            .map_or_else(|| self.settings.fallback_labels(), |label| vec![label])
    }
}

/// Override, else caption, else a placeholder for media
fn resolve_body(submission: &PendingSubmission, content: Option<&str>) -> String {
    let chosen = content
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(submission.caption.as_str());
    if !chosen.trim().is_empty() {
        return chosen.to_string();
    }
    text::media_placeholder(submission.kind).to_string()
}
