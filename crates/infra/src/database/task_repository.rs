//! SQLite-backed task store.
//!
//! Reads `todos` joined with `users`. The SQL window is widened by one second
//! on each side to absorb `julianday` rounding; the reminder service applies
//! the exact inclusive bounds.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use duebell_core::TaskStore;
use duebell_domain::{format_timestamp, DueWindow, Priority, Result as DomainResult, Task, User};
use rusqlite::{params, Row};
use tokio::task;
use tracing::{debug, warn};

use super::manager::{map_join_error, map_sql_error, DbManager, SqliteConnection};

pub struct SqliteTaskStore {
    db: Arc<DbManager>,
}

impl SqliteTaskStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn query_due(conn: &SqliteConnection, window: &DueWindow) -> DomainResult<Vec<Task>> {
        let slack = Duration::seconds(1);
        let start = format_timestamp(window.start - slack);
        let end = format_timestamp(window.end + slack);

        let mut stmt = conn.prepare(DUE_TASKS_SQL).map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params![start, end], map_task_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        Ok(rows.into_iter().flatten().collect())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn find_due_tasks(&self, window: &DueWindow) -> DomainResult<Vec<Task>> {
        let db = Arc::clone(&self.db);
        let window = *window;

        let tasks = task::spawn_blocking(move || -> DomainResult<Vec<Task>> {
            let conn = db.get_connection()?;
            Self::query_due(&conn, &window)
        })
        .await
        .map_err(map_join_error)??;

        debug!(count = tasks.len(), "Loaded due tasks");
        Ok(tasks)
    }

    async fn health_check(&self) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || db.health_check()).await.map_err(map_join_error)?
    }
}

const DUE_TASKS_SQL: &str = "SELECT
        t.id, t.title, t.description, t.priority, t.due_date, t.status, t.user_id,
        u.id, u.email, u.first_name, u.last_name
    FROM todos t
    LEFT JOIN users u ON u.id = t.user_id
    WHERE lower(trim(t.status)) = 'in progress'
      AND t.due_date IS NOT NULL
      AND julianday(t.due_date) BETWEEN julianday(?1) AND julianday(?2)
    ORDER BY julianday(t.due_date) ASC";

/// `None` for rows whose status does not parse.
fn map_task_row(row: &Row<'_>) -> rusqlite::Result<Option<Task>> {
    let id: String = row.get(0)?;
    let priority_raw: Option<String> = row.get(3)?;
    let status_raw: String = row.get(5)?;

    let Ok(status) = status_raw.parse() else {
        warn!(task_id = %id, raw_status = %status_raw, "Ignoring task with unknown status");
        return Ok(None);
    };

    let owner = match row.get::<_, Option<String>>(7)? {
        Some(user_id) => Some(User {
            id: user_id,
            email: row.get(8)?,
            first_name: row.get(9)?,
            last_name: row.get(10)?,
        }),
        None => None,
    };

    Ok(Some(Task {
        priority: parse_priority(&id, priority_raw.as_deref()),
        id,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: row.get(4)?,
        status,
        owner_id: row.get(6)?,
        owner,
    }))
}

fn parse_priority(id: &str, raw: Option<&str>) -> Priority {
    match raw.map(str::parse::<Priority>) {
        Some(Ok(priority)) => priority,
        Some(Err(err)) => {
            warn!(task_id = %id, error = %err, "Invalid task priority, using default");
            Priority::default()
        }
        None => Priority::default(),
    }
}
