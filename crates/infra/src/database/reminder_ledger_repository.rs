//! SQLite-backed reminder ledger (`reminder_log` table).
//!
//! `due_at` is stored in the fixed `format_timestamp` layout so equality and
//! ordering work on the text column.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duebell_core::ReminderLedger;
use duebell_domain::{format_timestamp, ReminderRecord, Result as DomainResult};
use rusqlite::{params, OptionalExtension};
use tokio::task;

use super::manager::{map_join_error, map_sql_error, DbManager};

pub struct SqliteReminderLedger {
    db: Arc<DbManager>,
}

impl SqliteReminderLedger {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderLedger for SqliteReminderLedger {
    async fn has_reminded(&self, task_id: &str, due_at: DateTime<Utc>) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let task_id = task_id.to_string();
        let due_at = format_timestamp(due_at);

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let found = conn
                .query_row(
                    "SELECT 1 FROM reminder_log WHERE task_id = ?1 AND due_at = ?2",
                    params![task_id, due_at],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
                .map_err(map_sql_error)?;
            Ok(found.is_some())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record(&self, record: &ReminderRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT OR REPLACE INTO reminder_log (task_id, due_at, recipient, sent_at, message_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.task_id,
                    format_timestamp(record.due_at),
                    record.recipient,
                    format_timestamp(record.sent_at),
                    record.message_id,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn prune_before(&self, cutoff: DateTime<Utc>) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let cutoff = format_timestamp(cutoff);

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            conn.execute("DELETE FROM reminder_log WHERE due_at < ?1", params![cutoff])
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}
