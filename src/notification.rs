//! Transfer notifications
//!
//! The transfer engine reports every debit and credit to a [`Notifier`].
//! Notification is fire-and-forget: the trait returns nothing, so a sink can
//! never fail a transfer.
//!
//! Notifiers are called while the engine holds both account locks. They
//! receive the account ID rather than the record and must not block.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use crossbeam_queue::ArrayQueue;
use serde::Serialize;
use tracing::info;

use crate::core_types::AccountId;

/// Sink for per-account transfer messages
pub trait Notifier: Send + Sync {
    /// Deliver `message` to the owner of `account_id`.
    fn notify_about_transfer(&self, account_id: &str, message: &str);
}

/// A delivered notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub account_id: AccountId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Writes every notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_about_transfer(&self, account_id: &str, message: &str) {
        info!(account_id = %account_id, "Sending notification: {}", message);
    }
}

/// Bounded in-memory notification queue.
///
/// `push` never blocks: once the queue is full, new notifications are dropped
/// and counted.
pub struct QueueNotifier {
    queue: ArrayQueue<Notification>,
    dropped: AtomicU64,
}

impl QueueNotifier {
    /// Create a queue holding at most `capacity` notifications.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
        }
    }

    /// Remove and return all queued notifications in arrival order.
    pub fn drain(&self) -> Vec<Notification> {
        let mut out = Vec::with_capacity(self.queue.len());
        while let Some(n) = self.queue.pop() {
            out.push(n);
        }
        out
    }

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Notifications dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Notifier for QueueNotifier {
    fn notify_about_transfer(&self, account_id: &str, message: &str) {
        let notification = Notification {
            account_id: account_id.to_string(),
            message: message.to_string(),
            created_at: Utc::now(),
        };
        if self.queue.push(notification).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Forwards each notification to every wrapped notifier.
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(sinks: Vec<Arc<dyn Notifier>>) -> Self {
        Self { sinks }
    }
}

impl Notifier for FanoutNotifier {
    fn notify_about_transfer(&self, account_id: &str, message: &str) {
        for sink in &self.sinks {
            sink.notify_about_transfer(account_id, message);
        }
    }
}
