//! Eligibility rules applied to every task the store returns.
//!
//! The store is expected to filter already, but it is an external
//! collaborator; these checks are the authoritative ones.

use chrono::{DateTime, Utc};
use duebell_domain::{DueWindow, Task, TaskStatus, User};

use super::error::SkipReason;

/// A task that passed every check and can be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub task: Task,
    pub owner: User,
    pub due_at: DateTime<Utc>,
    pub recipient: String,
}

/// Check a task against the window. Checks run in a fixed order so the
/// reported reason is deterministic: status, due date, window, owner, email.
pub fn evaluate(task: Task, window: &DueWindow) -> Result<Candidate, SkipReason> {
    if task.status != TaskStatus::InProgress {
        return Err(SkipReason::NotInProgress);
    }

    let due_at = match task.due_date.as_deref() {
        None => return Err(SkipReason::MissingDueDate),
        Some(raw) if raw.trim().is_empty() => return Err(SkipReason::MissingDueDate),
        Some(_) => task.due_at().ok_or(SkipReason::InvalidDueDate)?,
    };

    if !window.contains(due_at) {
        return Err(SkipReason::OutsideWindow);
    }

    let owner = task.owner.clone().ok_or(SkipReason::MissingOwner)?;
    let recipient = owner.reachable_email().ok_or(SkipReason::MissingEmail)?.to_string();

    Ok(Candidate { task, owner, due_at, recipient })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use duebell_domain::Priority;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
    }

    fn window() -> DueWindow {
        DueWindow::starting_at(now(), Duration::hours(1))
    }

    fn task(due: Option<String>) -> Task {
        Task {
            id: "t1".into(),
            title: "Pay rent".into(),
            description: None,
            priority: Priority::Medium,
            due_date: due,
            status: TaskStatus::InProgress,
            owner_id: "u1".into(),
            owner: Some(User {
                id: "u1".into(),
                email: Some("a@x.com".into()),
                first_name: Some("Ada".into()),
                last_name: None,
            }),
        }
    }

    fn at(offset: Duration) -> Option<String> {
        Some((now() + offset).to_rfc3339())
    }

    #[test]
    fn accepts_both_window_boundaries() {
        let start = evaluate(task(at(Duration::zero())), &window()).unwrap();
        assert_eq!(start.due_at, now());
        let end = evaluate(task(at(Duration::hours(1))), &window()).unwrap();
        assert_eq!(end.recipient, "a@x.com");
    }

    #[test]
    fn rejects_just_outside_window() {
        let late = task(at(Duration::hours(1) + Duration::seconds(1)));
        assert_eq!(evaluate(late, &window()), Err(SkipReason::OutsideWindow));
        let past = task(at(-Duration::seconds(1)));
        assert_eq!(evaluate(past, &window()), Err(SkipReason::OutsideWindow));
    }

    #[test]
    fn status_is_checked_before_anything_else() {
        let mut done = task(None);
        done.status = TaskStatus::Completed;
        done.owner = None;
        assert_eq!(evaluate(done, &window()), Err(SkipReason::NotInProgress));
    }

    #[test]
    fn distinguishes_missing_and_invalid_due_dates() {
        assert_eq!(evaluate(task(None), &window()), Err(SkipReason::MissingDueDate));
        assert_eq!(evaluate(task(Some(" ".into())), &window()), Err(SkipReason::MissingDueDate));
        assert_eq!(
            evaluate(task(Some("Invalid Date".into())), &window()),
            Err(SkipReason::InvalidDueDate)
        );
    }

    #[test]
    fn requires_owner_with_email() {
        let mut orphan = task(at(Duration::minutes(5)));
        orphan.owner = None;
        assert_eq!(evaluate(orphan, &window()), Err(SkipReason::MissingOwner));

        let mut silent = task(at(Duration::minutes(5)));
        if let Some(owner) = silent.owner.as_mut() {
            owner.email = Some("  ".into());
        }
        assert_eq!(evaluate(silent, &window()), Err(SkipReason::MissingEmail));
    }
}
