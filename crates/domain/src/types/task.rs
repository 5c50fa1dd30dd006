//! Task records as read from the task store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;
use crate::types::user::User;
use crate::utils::due_date::parse_due_date;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl_domain_status_conversions!(Priority {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
}

impl_domain_status_conversions!(TaskStatus {
    InProgress => "In Progress",
    Completed => "Completed",
    Failed => "Failed",
});

/// A to-do item with its owner resolved.
///
/// `due_date` is kept exactly as stored; use [`Task::due_at`] for the parsed
/// instant. A missing or unparseable value makes the task ineligible for
/// reminders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub status: TaskStatus,
    pub owner_id: String,
    pub owner: Option<User>,
}

impl Task {
    /// Parsed due date, `None` when absent or unparseable.
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(parse_due_date)
    }

    /// Description with surrounding whitespace removed, `None` when blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().map(str::trim).filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn status_uses_stored_spelling() {
        assert_eq!(TaskStatus::InProgress.to_string(), "In Progress");
        assert_eq!("in progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("InProgress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
    }

    #[test]
    fn due_at_parses_or_yields_none() {
        let mut task = Task {
            id: "t1".into(),
            title: "Pay rent".into(),
            description: Some("   ".into()),
            priority: Priority::High,
            due_date: Some("2025-03-01T09:30:00Z".into()),
            status: TaskStatus::InProgress,
            owner_id: "u1".into(),
            owner: None,
        };

        assert_eq!(task.due_at(), Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()));
        assert_eq!(task.description_text(), None);

        task.due_date = Some("next tuesday".into());
        assert_eq!(task.due_at(), None);

        task.due_date = None;
        assert_eq!(task.due_at(), None);
    }
}
