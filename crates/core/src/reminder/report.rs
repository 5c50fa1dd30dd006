//! Tick report

use std::time::Duration;

use duebell_domain::DueWindow;
use serde::{Deserialize, Serialize};

use super::error::SkipReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedReminder {
    pub task_id: String,
    pub recipient: String,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTask {
    pub task_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDispatch {
    pub task_id: String,
    pub error: String,
}

/// Outcome of one reminder tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub window: DueWindow,
    /// Tasks returned by the store
    pub matched: usize,
    pub dispatched: Vec<DispatchedReminder>,
    pub skipped: Vec<SkippedTask>,
    pub failed: Vec<FailedDispatch>,
    /// Ledger rows removed by retention
    pub pruned: usize,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl TickReport {
    pub fn new(window: DueWindow) -> Self {
        Self {
            window,
            matched: 0,
            dispatched: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            pruned: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn dispatched_count(&self) -> usize {
        self.dispatched.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn was_dispatched(&self, task_id: &str) -> bool {
        self.dispatched.iter().any(|d| d.task_id == task_id)
    }

    pub fn skip_reason(&self, task_id: &str) -> Option<SkipReason> {
        self.skipped.iter().find(|s| s.task_id == task_id).map(|s| s.reason)
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    use super::*;

    #[test]
    fn serializes_duration_as_millis() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        let mut report = TickReport::new(DueWindow::starting_at(now, ChronoDuration::hours(1)));
        report.duration = Duration::from_millis(1_250);
        report.skipped.push(SkippedTask { task_id: "t2".into(), reason: SkipReason::MissingEmail });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["duration"], 1_250);
        assert_eq!(json["skipped"][0]["reason"], "missing_email");
        assert_eq!(report.skip_reason("t2"), Some(SkipReason::MissingEmail));
    }
}
