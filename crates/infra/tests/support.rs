#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{DateTime, TimeZone, Utc};
use duebell_infra::database::DbManager;
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (visible with
/// `--nocapture`).
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a migrated temporary database.
    pub fn new() -> Self {
        init_test_tracing();
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager =
            DbManager::new(temp_dir.path().join("test.db"), 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    pub fn insert_user(&self, id: &str, email: Option<&str>, first_name: &str) {
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO users (id, email, first_name) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, email, first_name],
        )
        .expect("user inserted");
    }

    pub fn insert_todo(&self, id: &str, user_id: &str, title: &str, due_date: Option<&str>, status: &str) {
        let conn = self.manager.get_connection().expect("connection");
        conn.execute(
            "INSERT INTO todos (id, user_id, title, description, priority, due_date, status)
             VALUES (?1, ?2, ?3, 'from test', 'High', ?4, ?5)",
            rusqlite::params![id, user_id, title, due_date, status],
        )
        .expect("todo inserted");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed tick time shared by the integration tests
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
}
