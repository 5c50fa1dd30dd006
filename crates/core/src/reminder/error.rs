//! Tick errors and per-task skip reasons

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a whole tick. Per-task problems never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    /// The task store query failed or timed out
    #[error("Task store unavailable: {0}")]
    StoreUnavailable(String),

    /// Another tick holds the single-flight guard
    #[error("A reminder tick is already in progress")]
    TickInProgress,
}

/// Why an individual task was not reminded in this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotInProgress,
    MissingDueDate,
    InvalidDueDate,
    OutsideWindow,
    MissingOwner,
    MissingEmail,
    AlreadyReminded,
}

impl SkipReason {
    /// Incomplete task data, as opposed to an expected filter outcome
    pub fn is_incomplete_data(self) -> bool {
        matches!(
            self,
            Self::MissingDueDate | Self::InvalidDueDate | Self::MissingOwner | Self::MissingEmail
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotInProgress => "not_in_progress",
            Self::MissingDueDate => "missing_due_date",
            Self::InvalidDueDate => "invalid_due_date",
            Self::OutsideWindow => "outside_window",
            Self::MissingOwner => "missing_owner",
            Self::MissingEmail => "missing_email",
            Self::AlreadyReminded => "already_reminded",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
