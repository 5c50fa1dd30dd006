//! Port interfaces for the reminder pipeline
//!
//! These traits define the boundaries between the reminder logic and the
//! infrastructure that stores tasks, delivers mail and remembers what was
//! already sent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duebell_domain::{DeliveryReceipt, DueWindow, Notification, ReminderRecord, Result, Task};

/// Read access to tasks and their owners
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// In-progress tasks whose due date lies within `window` (inclusive),
    /// with `owner` populated when the user exists.
    async fn find_due_tasks(&self, window: &DueWindow) -> Result<Vec<Task>>;

    /// Verify the store is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Outbound mail channel
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Short identifier used in logs and receipts
    fn name(&self) -> &str;

    /// Deliver one notification
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt>;
}

/// Persistent record of reminders already sent
#[async_trait]
pub trait ReminderLedger: Send + Sync {
    /// Whether a reminder for this task and due date was already sent
    async fn has_reminded(&self, task_id: &str, due_at: DateTime<Utc>) -> Result<bool>;

    /// Record a successful dispatch
    async fn record(&self, record: &ReminderRecord) -> Result<()>;

    /// Delete records whose due date is older than `cutoff`, returning the
    /// number removed
    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
