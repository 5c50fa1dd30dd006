//! Reminder scheduler metrics
//!
//! ## Design
//! - **SeqCst** for the tick time total and count used by the average
//! - **Relaxed** for independent counters
//! - Durations are stored in microseconds and reported in milliseconds

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use duebell_core::TickReport;
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

/// Counters for scheduled reminder ticks
#[derive(Debug, Default)]
pub struct ReminderMetrics {
    ticks_started: AtomicUsize,
    ticks_completed: AtomicUsize,
    ticks_failed: AtomicUsize,
    ticks_overlapped: AtomicUsize,
    ticks_timed_out: AtomicUsize,
    reminders_dispatched: AtomicUsize,
    reminders_skipped: AtomicUsize,
    dispatch_failures: AtomicUsize,
    total_tick_time_micros: AtomicU64,
    last_tick_time_micros: AtomicU64,
}

/// Point-in-time copy of [`ReminderMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderMetricsSnapshot {
    pub ticks_started: usize,
    pub ticks_completed: usize,
    pub ticks_failed: usize,
    pub ticks_overlapped: usize,
    pub ticks_timed_out: usize,
    pub reminders_dispatched: usize,
    pub reminders_skipped: usize,
    pub dispatch_failures: usize,
    pub last_tick_ms: u64,
}

impl ReminderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick_started(&self) -> MetricsResult<()> {
        self.ticks_started.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Record a finished tick and the per-task outcomes in its report.
    pub fn record_tick_completed(&self, report: &TickReport) -> MetricsResult<()> {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
        self.reminders_dispatched.fetch_add(report.dispatched_count(), Ordering::Relaxed);
        self.reminders_skipped.fetch_add(report.skipped_count(), Ordering::Relaxed);
        self.dispatch_failures.fetch_add(report.failed_count(), Ordering::Relaxed);
        self.record_tick_time(report.duration)
    }

    pub fn record_tick_failed(&self) -> MetricsResult<()> {
        self.ticks_failed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_tick_overlapped(&self) -> MetricsResult<()> {
        self.ticks_overlapped.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_tick_timeout(&self) -> MetricsResult<()> {
        self.ticks_timed_out.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn record_tick_time(&self, duration: Duration) -> MetricsResult<()> {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.total_tick_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.last_tick_time_micros.store(micros, Ordering::Relaxed);
        Ok(())
    }

    /// Average duration of completed ticks in milliseconds.
    pub fn avg_tick_time_ms(&self) -> MetricsResult<f64> {
        let total = self.total_tick_time_micros.load(Ordering::SeqCst);
        let count = self.ticks_completed.load(Ordering::SeqCst);
        if count == 0 {
            return Err(MetricsError::EmptyData { metric: "average tick time" });
        }
        Ok((total as f64 / count as f64) / 1_000.0)
    }

    pub fn snapshot(&self) -> ReminderMetricsSnapshot {
        ReminderMetricsSnapshot {
            ticks_started: self.ticks_started.load(Ordering::Relaxed),
            ticks_completed: self.ticks_completed.load(Ordering::Relaxed),
            ticks_failed: self.ticks_failed.load(Ordering::Relaxed),
            ticks_overlapped: self.ticks_overlapped.load(Ordering::Relaxed),
            ticks_timed_out: self.ticks_timed_out.load(Ordering::Relaxed),
            reminders_dispatched: self.reminders_dispatched.load(Ordering::Relaxed),
            reminders_skipped: self.reminders_skipped.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            last_tick_ms: self.last_tick_time_micros.load(Ordering::Relaxed) / 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use duebell_core::reminder::{DispatchedReminder, FailedDispatch};
    use duebell_domain::DueWindow;

    use super::*;

    fn report(duration_ms: u64) -> TickReport {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        let mut report = TickReport::new(DueWindow::starting_at(now, ChronoDuration::hours(1)));
        report.dispatched.push(DispatchedReminder {
            task_id: "t1".into(),
            recipient: "a@x.com".into(),
            message_id: None,
        });
        report.failed.push(FailedDispatch { task_id: "t2".into(), error: "boom".into() });
        report.duration = Duration::from_millis(duration_ms);
        report
    }

    #[test]
    fn average_requires_a_completed_tick() {
        let metrics = ReminderMetrics::new();
        assert!(matches!(metrics.avg_tick_time_ms(), Err(MetricsError::EmptyData { .. })));
    }

    #[test]
    fn completed_ticks_accumulate_report_counts() {
        let metrics = ReminderMetrics::new();
        metrics.record_tick_completed(&report(100)).unwrap();
        metrics.record_tick_completed(&report(300)).unwrap();
        metrics.record_tick_overlapped().unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks_completed, 2);
        assert_eq!(snapshot.reminders_dispatched, 2);
        assert_eq!(snapshot.dispatch_failures, 2);
        assert_eq!(snapshot.ticks_overlapped, 1);
        assert_eq!(snapshot.last_tick_ms, 300);
        assert_eq!(metrics.avg_tick_time_ms().unwrap(), 200.0);
    }
}
