//! Per-user ordered event delivery
//!
//! Every authorized user gets an inbox drained by a single task, so one user's
//! events are handled strictly in arrival order. Different users, and the
//! auto-publish timers, still run concurrently.

use super::Relay;
use super::event::InboundEvent;
use crate::types::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct Inbox {
    tx: mpsc::UnboundedSender<InboundEvent>,
    worker: JoinHandle<()>,
}

/// Routes inbound events into per-user inboxes
pub struct Dispatcher {
    relay: Arc<Relay>,
    inboxes: Mutex<HashMap<UserId, Inbox>>,
}

impl Dispatcher {
    /// Create a dispatcher feeding `relay`
    pub fn new(relay: Arc<Relay>) -> Self {
        Self {
            relay,
            inboxes: Mutex::new(HashMap::new()),
        }
    }

    /// Queue an event behind the sender's earlier events
    ///
    /// Events from anyone but the owner are dropped here, before an inbox
    /// exists for them.
    pub fn dispatch(&self, event: InboundEvent) {
        let user = event.user();
        if !self.relay.is_authorized(user) {
            tracing::debug!(user, "dropping event from unauthorized user");
            return;
        }

        let mut inboxes = self.inboxes.lock().unwrap_or_else(PoisonError::into_inner);
        let inbox = inboxes.entry(user).or_insert_with(|| self.open_inbox(user));
        if let Err(mpsc::error::SendError(event)) = inbox.tx.send(event) {
            tracing::warn!(user, "inbox worker stopped, restarting it");
            let fresh = self.open_inbox(user);
            let _ = fresh.tx.send(event);
            *inbox = fresh;
        }
    }

    /// Stop accepting events and wait until every queued event was handled
    pub async fn shutdown(&self) {
        let inboxes: Vec<Inbox> = self
            .inboxes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, inbox)| inbox)
            .collect();

        for Inbox { tx, worker } in inboxes {
            drop(tx);
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "inbox worker failed");
            }
        }
    }

    fn open_inbox(&self, user: UserId) -> Inbox {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let relay = Arc::clone(&self.relay);
        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = relay.handle_event(event).await {
                    tracing::warn!(user, error = %e, "event handling failed");
                }
            }
        });
        tracing::debug!(user, "inbox opened");
        Inbox { tx, worker }
    }
}
