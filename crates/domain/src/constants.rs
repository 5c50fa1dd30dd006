//! Service constants
//!
//! Centralized location for the defaults used by configuration and the
//! reminder pipeline.

// Reminder scheduling defaults
pub const DEFAULT_TICK_CRON: &str = "0 */5 * * * *"; // every 5 minutes
pub const DEFAULT_LOOKAHEAD_MINUTES: u64 = 60;
pub const DEFAULT_MAX_CONCURRENT_DISPATCHES: usize = 4;
pub const DEFAULT_MAX_DISPATCHES_PER_MINUTE: u32 = 60;
pub const DEFAULT_LEDGER_RETENTION_DAYS: u64 = 7;

// Timeouts (seconds)
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LEDGER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 300;

// Database defaults
pub const DEFAULT_DB_PATH: &str = "duebell.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// Rendering defaults
pub const DEFAULT_DISPLAY_TIMEZONE: &str = "UTC";
pub const DEFAULT_APP_URL: &str = "http://localhost/todos";
pub const APP_DISPLAY_NAME: &str = "Your Todo App";
/// Sender used by the dry-run transport when no `mail.from` or `mail.user` is set
pub const DEFAULT_MAIL_FROM: &str = "noreply@localhost";
