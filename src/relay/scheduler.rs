//! One-shot auto-publish timers keyed by user
//!
//! At most one timer is armed per user. Arming while one is armed keeps the
//! existing deadline. A fired timer removes its own entry before running the
//! callback, so the callback can freely [`AutoPublishScheduler::disarm`]
//! without aborting itself.

use crate::types::UserId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Longest delay a timer accepts; longer requests are clamped
pub const MAX_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

struct ArmedTimer {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Result of [`AutoPublishScheduler::arm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// A new timer was started
    Armed {
        /// When it fires
        deadline: Instant,
    },
    /// A timer was already running and was left untouched
    AlreadyArmed {
        /// When the existing timer fires
        deadline: Instant,
    },
}

/// Timer registry for auto-publish
#[derive(Default)]
pub struct AutoPublishScheduler {
    timers: Mutex<HashMap<UserId, ArmedTimer>>,
    next_generation: AtomicU64,
}

impl AutoPublishScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a timer for `user` unless one is already running
    ///
    /// `on_fire` receives the timer's generation, which it must hand to
    /// [`AutoPublishScheduler::complete`] before doing any work.
    pub fn arm<F, Fut>(&self, user: UserId, delay: Duration, on_fire: F) -> ArmOutcome
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = timers.get(&user) {
            if !existing.handle.is_finished() {
                return ArmOutcome::AlreadyArmed {
                    deadline: existing.deadline,
                };
            }
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + delay.min(MAX_DELAY);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire(generation).await;
        });

        timers.insert(
            user,
            ArmedTimer {
                generation,
                deadline,
                handle,
            },
        );
        ArmOutcome::Armed { deadline }
    }

    /// Forget a fired timer; only the entry with the same generation is removed
    pub fn complete(&self, user: UserId, generation: u64) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        if timers.get(&user).is_some_and(|t| t.generation == generation) {
            timers.remove(&user);
        }
    }

    /// Cancel the user's timer; returns whether one was pending
    pub fn disarm(&self, user: UserId) -> bool {
        let removed = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user);

        removed.is_some_and(|timer| {
            let pending = !timer.handle.is_finished();
            timer.handle.abort();
            pending
        })
    }

    /// Whether a timer is pending for `user`
    pub fn is_armed(&self, user: UserId) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Deadline of the user's pending timer
    pub fn deadline(&self, user: UserId) -> Option<Instant> {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .filter(|t| !t.handle.is_finished())
            .map(|t| t.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn counting_timer(
        scheduler: &Arc<AutoPublishScheduler>,
        fired: &Arc<AtomicUsize>,
        user: UserId,
        delay: Duration,
    ) -> ArmOutcome {
        let scheduler_ref = Arc::clone(scheduler);
        let fired = Arc::clone(fired);
        scheduler.arm(user, delay, move |generation| async move {
            scheduler_ref.complete(user, generation);
            fired.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_delay() {
        let scheduler = Arc::new(AutoPublishScheduler::new());
        let fired = Arc::new(AtomicUsize::new(0));

        counting_timer(&scheduler, &fired, 1, Duration::from_secs(300));
        assert!(scheduler.is_armed(1));

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_armed(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_delay_is_clamped() {
        let scheduler = Arc::new(AutoPublishScheduler::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let armed_at = Instant::now();

        counting_timer(&scheduler, &fired, 1, Duration::MAX);

        assert!(scheduler.is_armed(1));
        assert_eq!(scheduler.deadline(1), Some(armed_at + MAX_DELAY));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_keeps_deadline() {
        let scheduler = Arc::new(AutoPublishScheduler::new());
        let fired = Arc::new(AtomicUsize::new(0));

        let ArmOutcome::Armed { deadline: first } =
            counting_timer(&scheduler, &fired, 1, Duration::from_secs(300))
        else {
            panic!("expected a fresh timer");
        };
        tokio::time::sleep(Duration::from_secs(100)).await;
        let ArmOutcome::AlreadyArmed { deadline: second } =
            counting_timer(&scheduler, &fired, 1, Duration::from_secs(300))
        else {
            panic!("expected the running timer");
        };
        assert_eq!(first, second);

        tokio::time::sleep(Duration::from_secs(201)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_prevents_fire() {
        let scheduler = Arc::new(AutoPublishScheduler::new());
        let fired = Arc::new(AtomicUsize::new(0));

        counting_timer(&scheduler, &fired, 1, Duration::from_secs(10));
        assert!(scheduler.disarm(1));
        assert!(!scheduler.disarm(1));

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_users_have_independent_timers() {
        let scheduler = Arc::new(AutoPublishScheduler::new());
        let fired = Arc::new(AtomicUsize::new(0));

        counting_timer(&scheduler, &fired, 1, Duration::from_secs(10));
        counting_timer(&scheduler, &fired, 2, Duration::from_secs(10));
        scheduler.disarm(1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(scheduler.deadline(2).is_none());
    }
}
