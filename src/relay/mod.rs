//! The relay core
//!
//! [`Relay`] owns the session store, the label resolver, the published record
//! cache and the auto-publish scheduler, and routes every [`InboundEvent`] to
//! the submission or edit/delete state machine. Remote work goes through the
//! [`RecordService`], [`ContentSource`] and [`Notifier`] collaborators.
//!
//! Pending state is always taken out of the store before any remote call is
//! made, and nothing is retried: a failed publish or commit is reported to the
//! user and the captured input is gone.

mod commands;
mod delete;
pub mod dispatch;
mod edit;
pub mod event;
mod publish;
pub mod scheduler;
mod submission;
pub mod text;

pub use dispatch::Dispatcher;
pub use event::{CallbackAction, Command, InboundEvent, LabelChoice};
pub use scheduler::{ArmOutcome, AutoPublishScheduler};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::labels::LabelResolver;
use crate::platform::RecordService;
use crate::session::{RecordCache, SessionStore};
use crate::transport::{ContentSource, Notifier};
use crate::types::{Choice, PendingSubmission, PublishedRecord, Record, UserId};
use std::sync::Arc;

/// Stateful relay between a chat transport and the record service
pub struct Relay {
    settings: Settings,
    sessions: SessionStore,
    record_cache: RecordCache,
    labels: LabelResolver,
    records: Arc<dyn RecordService>,
    content: Arc<dyn ContentSource>,
    notifier: Arc<dyn Notifier>,
    scheduler: AutoPublishScheduler,
}

impl Relay {
    /// Build a relay with empty stores
    pub fn new(
        settings: Settings,
        records: Arc<dyn RecordService>,
        content: Arc<dyn ContentSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let labels = LabelResolver::new(
            Arc::clone(&records),
            settings.label_ttl,
            settings.default_labels.clone(),
        );
        Arc::new(Self {
            record_cache: RecordCache::new(settings.record_cache_capacity),
            sessions: SessionStore::new(),
            labels,
            records,
            content,
            notifier,
            scheduler: AutoPublishScheduler::new(),
            settings,
        })
    }

    /// Settings in effect
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Per-user pending state
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Published record cache
    pub const fn record_cache(&self) -> &RecordCache {
        &self.record_cache
    }

    /// Label resolver
    pub const fn labels(&self) -> &LabelResolver {
        &self.labels
    }

    /// Auto-publish timers
    pub const fn scheduler(&self) -> &AutoPublishScheduler {
        &self.scheduler
    }

    /// Whether `user` may talk to the relay
    pub const fn is_authorized(&self, user: UserId) -> bool {
        user == self.settings.owner_id
    }

    /// Route one inbound event
    ///
    /// Events from anyone but the owner are dropped without a reply. The
    /// returned error is only ever a failure to reach the user; remote and
    /// validation failures are reported in chat and logged.
    pub async fn handle_event(self: &Arc<Self>, event: InboundEvent) -> Result<()> {
        let user = event.user();
        if !self.is_authorized(user) {
            tracing::debug!(user, "dropping event from unauthorized user");
            return Ok(());
        }

        match event {
            InboundEvent::Photo {
                user,
                media,
                caption,
            } => self.on_photo(user, media, caption).await,
            InboundEvent::Video {
                user,
                media,
                caption,
            } => self.on_video(user, media, caption).await,
            InboundEvent::Text { user, text } => self.on_text(user, &text).await,
            InboundEvent::Command { user, command } => self.on_command(user, command).await,
            InboundEvent::Callback { user, action } => match action {
                CallbackAction::Label(choice) => self.on_label_chosen(user, choice).await,
                CallbackAction::SetDefault(label) => self.on_set_default_label(user, &label).await,
                CallbackAction::DeleteConfirm(number) => self.on_delete_confirm(user, number).await,
                CallbackAction::DeleteCancel => self.on_delete_cancel(user).await,
            },
        }
    }

    // === Outbound helpers ===

    /// Send sanitized text
    async fn say(&self, user: UserId, message: &str) -> Result<()> {
        self.notifier
            .notify(user, &text::sanitize_outbound(message))
            .await
    }

    /// Send sanitized text with choice buttons
    async fn ask(&self, user: UserId, message: &str, choices: &[Vec<Choice>]) -> Result<()> {
        self.notifier
            .prompt(user, &text::sanitize_outbound(message), choices)
            .await
    }

    /// Best-effort status line; a failure here must not abort the operation
    async fn progress(&self, user: UserId, message: &str) {
        if let Err(e) = self.say(user, message).await {
            tracing::warn!(user, error = %e, "failed to send progress message");
        }
    }

    /// Report a rejected input
    async fn reject(&self, user: UserId, error: &Error) -> Result<()> {
        tracing::debug!(user, error = %error, "input rejected");
        self.say(user, &format!("❌ {error}")).await
    }

    // === Shared state helpers ===

    fn check_length(&self, content: &str) -> Result<()> {
        let len = text::char_len(content);
        let limit = self.settings.max_content_chars;
        if len > limit {
            return Err(Error::ContentTooLong { len, limit });
        }
        Ok(())
    }

    /// Remove the pending submission and its timer
    fn take_pending_submission(&self, user: UserId) -> Option<PendingSubmission> {
        let submission = self.sessions.take_submission(user)?;
        if self.scheduler.disarm(user) {
            tracing::debug!(user, "auto-publish timer disarmed");
        }
        Some(submission)
    }

    /// Cached record, or fetch it and populate the cache
    async fn lookup_record(&self, number: u64) -> Result<PublishedRecord> {
        if let Some(cached) = self.record_cache.get(number) {
            tracing::debug!(number, "record cache hit");
            return Ok(cached);
        }

        let record = self.records.get_record(number).await?;
        let published = PublishedRecord::from_record(&record, Vec::new());
        self.record_cache.insert(published.clone());
        Ok(published)
    }

    async fn list_recent(&self) -> Result<Vec<Record>> {
        self.records
            .list_recent_open_records(self.settings.recent_limit)
            .await
    }
}
