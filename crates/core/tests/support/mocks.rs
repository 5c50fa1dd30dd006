//! In-memory implementations of the reminder ports.
//!
//! The task store returns every seeded task without filtering so tests
//! exercise the service's own eligibility checks.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duebell_core::{Clock, NotificationTransport, ReminderLedger, TaskStore};
use duebell_domain::{
    DeliveryReceipt, DueWindow, DuebellError, Notification, ReminderRecord, Result, Task,
};

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
    fail: AtomicBool,
    delay: Mutex<Option<Duration>>,
    queries: AtomicUsize,
    last_window: Mutex<Option<DueWindow>>,
}

impl InMemoryTaskStore {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks: Mutex::new(tasks), ..Self::default() }
    }

    pub fn set_tasks(&self, tasks: Vec<Task>) {
        *self.tasks.lock().unwrap() = tasks;
    }

    pub fn fail_queries(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn delay_queries(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn last_window(&self) -> Option<DueWindow> {
        *self.last_window.lock().unwrap()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_due_tasks(&self, window: &DueWindow) -> Result<Vec<Task>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        *self.last_window.lock().unwrap() = Some(*window);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(DuebellError::Database("connection refused".into()));
        }
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn health_check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DuebellError::Database("connection refused".into()));
        }
        Ok(())
    }
}

/// Transport that keeps every accepted notification
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Notification>>,
    failing_recipients: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    attempts: AtomicUsize,
}

impl RecordingTransport {
    pub fn fail_for(&self, recipient: &str) {
        self.failing_recipients.lock().unwrap().insert(recipient.to_string());
    }

    pub fn delay_sends(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_recipients.lock().unwrap().contains(&notification.to) {
            return Err(DuebellError::Transport(format!("mailbox {} rejected", notification.to)));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(notification.clone());
        Ok(DeliveryReceipt {
            transport: "recording".into(),
            message_id: Some(format!("msg-{}", sent.len())),
            accepted_at: Utc::now(),
        })
    }
}

#[derive(Default)]
pub struct InMemoryLedger {
    records: Mutex<HashMap<(String, DateTime<Utc>), ReminderRecord>>,
    fail_lookups: AtomicBool,
    fail_writes: AtomicBool,
    prune_cutoffs: Mutex<Vec<DateTime<Utc>>>,
}

impl InMemoryLedger {
    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn insert(&self, record: ReminderRecord) {
        self.records.lock().unwrap().insert((record.task_id.clone(), record.due_at), record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn prune_cutoffs(&self) -> Vec<DateTime<Utc>> {
        self.prune_cutoffs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderLedger for InMemoryLedger {
    async fn has_reminded(&self, task_id: &str, due_at: DateTime<Utc>) -> Result<bool> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(DuebellError::Database("ledger locked".into()));
        }
        Ok(self.records.lock().unwrap().contains_key(&(task_id.to_string(), due_at)))
    }

    async fn record(&self, record: &ReminderRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DuebellError::Database("disk full".into()));
        }
        self.insert(record.clone());
        Ok(())
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        self.prune_cutoffs.lock().unwrap().push(cutoff);
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|(_, due_at), _| *due_at >= cutoff);
        Ok(before - records.len())
    }
}

/// Clock pinned to a settable instant
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
