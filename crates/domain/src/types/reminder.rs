//! Reminder pipeline types: due window, notification payload, delivery
//! receipt and ledger record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Closed time interval `[start, end]` a due date must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DueWindow {
    /// Window starting at `now` and extending `lookahead` into the future.
    pub fn starting_at(now: DateTime<Utc>, lookahead: Duration) -> Self {
        Self { start: now, end: now + lookahead }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    pub fn lookahead(&self) -> Duration {
        self.end - self.start
    }
}

/// Rendered email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    /// Plain-text alternative of `html`
    pub text: String,
}

/// Acknowledgement returned by a transport after a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub transport: String,
    pub message_id: Option<String>,
    pub accepted_at: DateTime<Utc>,
}

/// A reminder that has been sent, keyed by `(task_id, due_at)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub task_id: String,
    pub due_at: DateTime<Utc>,
    pub recipient: String,
    pub sent_at: DateTime<Utc>,
    pub message_id: Option<String>,
}
