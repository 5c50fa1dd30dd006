//! Task and user fixtures

use chrono::{DateTime, Duration, TimeZone, Utc};
use duebell_domain::{Priority, Task, TaskStatus, User};

/// Fixed tick time used across tests
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
}

pub fn user(id: &str, email: Option<&str>) -> User {
    User {
        id: id.to_string(),
        email: email.map(str::to_string),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
    }
}

/// In-progress task owned by `owner`, due `offset` after [`now`]
pub fn task_due_in(id: &str, title: &str, offset: Duration, owner: User) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: Some("Transfer to landlord".to_string()),
        priority: Priority::High,
        due_date: Some((now() + offset).to_rfc3339()),
        status: TaskStatus::InProgress,
        owner_id: owner.id.clone(),
        owner: Some(owner),
    }
}

pub fn task_with_raw_due(id: &str, raw: Option<&str>, owner: User) -> Task {
    Task { due_date: raw.map(str::to_string), ..task_due_in(id, id, Duration::zero(), owner) }
}
