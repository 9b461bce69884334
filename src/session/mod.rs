//! Per-user pending state and the published record cache
//!
//! Both stores are plain in-memory maps behind a reader/writer lock. They are
//! constructed once by the relay and shared by reference; nothing here does
//! I/O or holds a lock across an `.await`.

mod records;

pub use records::RecordCache;

use crate::types::{PendingEdit, PendingSubmission, UserId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What a user is currently doing, derived from their session record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Nothing pending
    Idle,
    /// A submission is pending
    Submitting,
    /// An edit is pending
    Editing,
    /// Both a submission and an edit are pending; edit input takes priority
    EditingWithSubmission,
}

/// Everything the relay remembers about one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSession {
    /// At most one pending submission
    pub submission: Option<PendingSubmission>,
    /// At most one pending edit
    pub edit: Option<PendingEdit>,
    /// Label used when publishing without a pick
    pub default_label: Option<String>,
}

impl UserSession {
    /// Current mode
    pub const fn mode(&self) -> SessionMode {
        match (&self.submission, &self.edit) {
            (None, None) => SessionMode::Idle,
            (Some(_), None) => SessionMode::Submitting,
            (None, Some(_)) => SessionMode::Editing,
            (Some(_), Some(_)) => SessionMode::EditingWithSubmission,
        }
    }

    const fn is_empty(&self) -> bool {
        self.submission.is_none() && self.edit.is_none() && self.default_label.is_none()
    }
}

/// Session store keyed by user identity
///
/// All operations take the store-wide lock for the duration of a map access
/// only. "Check then act" sequences must use the combined operations
/// ([`SessionStore::insert_submission_if_absent`],
/// [`SessionStore::take_submission`], ...) rather than a `get` followed by a
/// separate write.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, UserSession>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<UserId, UserSession>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, UserSession>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn modify<R>(&self, user: UserId, f: impl FnOnce(&mut UserSession) -> R) -> R {
        let mut sessions = self.write();
        let session = sessions.entry(user).or_default();
        let result = f(session);
        if session.is_empty() {
            sessions.remove(&user);
        }
        result
    }

    /// Current mode of the user
    pub fn mode(&self, user: UserId) -> SessionMode {
        self.read()
            .get(&user)
            .map_or(SessionMode::Idle, UserSession::mode)
    }

    // === Submissions ===

    /// Copy of the pending submission, if any
    pub fn get_submission(&self, user: UserId) -> Option<PendingSubmission> {
        self.read().get(&user).and_then(|s| s.submission.clone())
    }

    /// Whether a submission is pending
    pub fn has_submission(&self, user: UserId) -> bool {
        self.read().get(&user).is_some_and(|s| s.submission.is_some())
    }

    /// Store a submission, replacing any existing one
    pub fn put_submission(&self, user: UserId, submission: PendingSubmission) {
        self.modify(user, |s| s.submission = Some(submission));
    }

    /// Store a submission only if none is pending; returns whether it was stored
    pub fn insert_submission_if_absent(&self, user: UserId, submission: PendingSubmission) -> bool {
        self.modify(user, |s| {
            if s.submission.is_some() {
                false
            } else {
                s.submission = Some(submission);
                true
            }
        })
    }

    /// Mutate the pending submission in place; `None` if there is none
    pub fn update_submission<R>(
        &self,
        user: UserId,
        f: impl FnOnce(&mut PendingSubmission) -> R,
    ) -> Option<R> {
        self.modify(user, |s| s.submission.as_mut().map(f))
    }

    /// Remove and return the pending submission
    pub fn take_submission(&self, user: UserId) -> Option<PendingSubmission> {
        self.modify(user, |s| s.submission.take())
    }

    /// Remove the pending submission; returns whether one existed
    pub fn remove_submission(&self, user: UserId) -> bool {
        self.take_submission(user).is_some()
    }

    // === Edits ===

    /// Copy of the pending edit, if any
    pub fn get_edit(&self, user: UserId) -> Option<PendingEdit> {
        self.read().get(&user).and_then(|s| s.edit.clone())
    }

    /// Whether an edit is pending
    pub fn is_editing(&self, user: UserId) -> bool {
        self.read().get(&user).is_some_and(|s| s.edit.is_some())
    }

    /// Store an edit, replacing any existing one
    pub fn put_edit(&self, user: UserId, edit: PendingEdit) {
        self.modify(user, |s| s.edit = Some(edit));
    }

    /// Mutate the pending edit in place; `None` if there is none
    pub fn update_edit<R>(&self, user: UserId, f: impl FnOnce(&mut PendingEdit) -> R) -> Option<R> {
        self.modify(user, |s| s.edit.as_mut().map(f))
    }

    /// Remove and return the pending edit
    pub fn take_edit(&self, user: UserId) -> Option<PendingEdit> {
        self.modify(user, |s| s.edit.take())
    }

    /// Remove the pending edit; returns whether one existed
    pub fn remove_edit(&self, user: UserId) -> bool {
        self.take_edit(user).is_some()
    }

    // === Default labels ===

    /// The user's default label
    pub fn default_label(&self, user: UserId) -> Option<String> {
        self.read().get(&user).and_then(|s| s.default_label.clone())
    }

    /// Set the user's default label
    pub fn set_default_label(&self, user: UserId, label: impl Into<String>) {
        let label = label.into();
        self.modify(user, |s| s.default_label = Some(label));
    }

    /// Number of users with any state
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no user has any state
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
