//! Reminder service - one tick of the due-date scan

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use duebell_domain::{DueWindow, ReminderConfig, ReminderRecord};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::eligibility::{evaluate, Candidate};
use super::error::{SkipReason, TickError};
use super::ports::{Clock, NotificationTransport, ReminderLedger, SystemClock, TaskStore};
use super::render::ReminderRenderer;
use super::report::{DispatchedReminder, FailedDispatch, SkippedTask, TickReport};
use super::throttle::DispatchThrottle;

/// Tuning for [`ReminderService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderServiceConfig {
    pub lookahead: chrono::Duration,
    pub max_concurrent_dispatches: usize,
    pub max_dispatches_per_minute: u32,
    pub store_timeout: Duration,
    pub dispatch_timeout: Duration,
    pub ledger_timeout: Duration,
    pub ledger_retention: chrono::Duration,
}

impl Default for ReminderServiceConfig {
    fn default() -> Self {
        Self::from(&ReminderConfig::default())
    }
}

impl From<&ReminderConfig> for ReminderServiceConfig {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            lookahead: config.lookahead(),
            max_concurrent_dispatches: config.max_concurrent_dispatches.max(1),
            max_dispatches_per_minute: config.max_dispatches_per_minute.max(1),
            store_timeout: config.store_timeout(),
            dispatch_timeout: config.dispatch_timeout(),
            ledger_timeout: config.ledger_timeout(),
            ledger_retention: config.ledger_retention(),
        }
    }
}

enum DispatchOutcome {
    Sent(DispatchedReminder),
    Skipped(SkippedTask),
    Failed(FailedDispatch),
}

/// Scans for tasks coming due and emails their owners.
///
/// Only one tick runs at a time; a concurrent call returns
/// [`TickError::TickInProgress`] instead of queueing.
pub struct ReminderService {
    config: ReminderServiceConfig,
    renderer: ReminderRenderer,
    store: Arc<dyn TaskStore>,
    transport: Arc<dyn NotificationTransport>,
    ledger: Arc<dyn ReminderLedger>,
    clock: Arc<dyn Clock>,
    throttle: DispatchThrottle,
    tick_guard: Mutex<()>,
}

impl ReminderService {
    pub fn new(
        config: ReminderServiceConfig,
        renderer: ReminderRenderer,
        store: Arc<dyn TaskStore>,
        transport: Arc<dyn NotificationTransport>,
        ledger: Arc<dyn ReminderLedger>,
    ) -> Self {
        let throttle = DispatchThrottle::per_minute(config.max_dispatches_per_minute);
        Self {
            config,
            renderer,
            store,
            transport,
            ledger,
            clock: Arc::new(SystemClock),
            throttle,
            tick_guard: Mutex::new(()),
        }
    }

    /// Replace the wall clock (tests, replays)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ReminderServiceConfig {
        &self.config
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// - [`TickError::TickInProgress`] if another tick is running
    /// - [`TickError::StoreUnavailable`] if the task query fails or times out
    ///
    /// Per-task problems are reported in the returned [`TickReport`].
    pub async fn run_tick(&self) -> Result<TickReport, TickError> {
        let _guard = self.tick_guard.try_lock().map_err(|_| TickError::TickInProgress)?;

        let started = Instant::now();
        let now = self.clock.now();
        let window = DueWindow::starting_at(now, self.config.lookahead);
        let mut report = TickReport::new(window);

        debug!(start = %window.start, end = %window.end, "Reminder tick started");

        let tasks = match timeout(self.config.store_timeout, self.store.find_due_tasks(&window))
            .await
        {
            Ok(Ok(tasks)) => tasks,
            Ok(Err(err)) => {
                error!(error = %err, "Task store query failed; tick aborted");
                return Err(TickError::StoreUnavailable(err.to_string()));
            }
            Err(_) => {
                error!(
                    timeout_secs = self.config.store_timeout.as_secs(),
                    "Task store query timed out; tick aborted"
                );
                return Err(TickError::StoreUnavailable(format!(
                    "query timed out after {:?}",
                    self.config.store_timeout
                )));
            }
        };
        report.matched = tasks.len();

        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(tasks.len());
        for task in tasks {
            let task_id = task.id.clone();
            match evaluate(task, &window) {
                Ok(candidate) => {
                    if seen.insert((candidate.task.id.clone(), candidate.due_at)) {
                        candidates.push(candidate);
                    } else {
                        debug!(task_id = %task_id, "Duplicate task row ignored");
                    }
                }
                Err(reason) => {
                    warn!(task_id = %task_id, reason = %reason, "Skipping task");
                    report.skipped.push(SkippedTask { task_id, reason });
                }
            }
        }

        let outcomes: Vec<DispatchOutcome> = stream::iter(candidates)
            .map(|candidate| self.dispatch(candidate))
            .buffer_unordered(self.config.max_concurrent_dispatches.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                DispatchOutcome::Sent(sent) => report.dispatched.push(sent),
                DispatchOutcome::Skipped(skipped) => report.skipped.push(skipped),
                DispatchOutcome::Failed(failed) => report.failed.push(failed),
            }
        }

        report.pruned = self.prune_ledger(now).await;
        report.duration = started.elapsed();

        info!(
            matched = report.matched,
            dispatched = report.dispatched_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            pruned = report.pruned,
            duration_ms = report.duration.as_millis() as u64,
            "Reminder tick completed"
        );

        Ok(report)
    }

    async fn dispatch(&self, candidate: Candidate) -> DispatchOutcome {
        let task_id = candidate.task.id.clone();

        match timeout(
            self.config.ledger_timeout,
            self.ledger.has_reminded(&task_id, candidate.due_at),
        )
        .await
        {
            Ok(Ok(false)) => {}
            Ok(Ok(true)) => {
                debug!(task_id = %task_id, "Reminder already sent for this due date");
                return DispatchOutcome::Skipped(SkippedTask {
                    task_id,
                    reason: SkipReason::AlreadyReminded,
                });
            }
            Ok(Err(err)) => {
                error!(task_id = %task_id, error = %err, "Reminder ledger lookup failed");
                return DispatchOutcome::Failed(FailedDispatch {
                    task_id,
                    error: format!("ledger unavailable: {err}"),
                });
            }
            Err(_) => {
                error!(task_id = %task_id, "Reminder ledger lookup timed out");
                return DispatchOutcome::Failed(FailedDispatch {
                    task_id,
                    error: "ledger unavailable: lookup timed out".to_string(),
                });
            }
        }

        self.throttle.acquire().await;

        let notification = self.renderer.render(&candidate);
        let receipt =
            match timeout(self.config.dispatch_timeout, self.transport.send(&notification)).await {
                Ok(Ok(receipt)) => receipt,
                Ok(Err(err)) => {
                    error!(
                        task_id = %task_id,
                        transport = self.transport.name(),
                        error = %err,
                        "Reminder dispatch failed"
                    );
                    return DispatchOutcome::Failed(FailedDispatch {
                        task_id,
                        error: err.to_string(),
                    });
                }
                Err(_) => {
                    error!(
                        task_id = %task_id,
                        transport = self.transport.name(),
                        timeout_secs = self.config.dispatch_timeout.as_secs(),
                        "Reminder dispatch timed out"
                    );
                    return DispatchOutcome::Failed(FailedDispatch {
                        task_id,
                        error: format!("dispatch timed out after {:?}", self.config.dispatch_timeout),
                    });
                }
            };

        info!(
            task_id = %task_id,
            recipient = %candidate.recipient,
            transport = %receipt.transport,
            "Reminder sent"
        );

        let record = ReminderRecord {
            task_id: task_id.clone(),
            due_at: candidate.due_at,
            recipient: candidate.recipient.clone(),
            sent_at: receipt.accepted_at,
            message_id: receipt.message_id.clone(),
        };
        match timeout(self.config.ledger_timeout, self.ledger.record(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(task_id = %task_id, error = %err, "Failed to record sent reminder");
            }
            Err(_) => warn!(task_id = %task_id, "Recording sent reminder timed out"),
        }

        DispatchOutcome::Sent(DispatchedReminder {
            task_id,
            recipient: candidate.recipient,
            message_id: receipt.message_id,
        })
    }

    async fn prune_ledger(&self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = now.checked_sub_signed(self.config.ledger_retention) else {
            return 0;
        };

        match timeout(self.config.ledger_timeout, self.ledger.prune_before(cutoff)).await {
            Ok(Ok(pruned)) => {
                if pruned > 0 {
                    debug!(pruned, cutoff = %cutoff, "Pruned reminder ledger");
                }
                pruned
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Reminder ledger prune failed");
                0
            }
            Err(_) => {
                warn!("Reminder ledger prune timed out");
                0
            }
        }
    }
}
