//! Configuration structures
//!
//! Every section carries serde defaults so a config file only needs to
//! mention what it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_APP_URL, DEFAULT_DB_PATH, DEFAULT_DB_POOL_SIZE, DEFAULT_DISPATCH_TIMEOUT_SECS,
    DEFAULT_DISPLAY_TIMEZONE, DEFAULT_JOB_TIMEOUT_SECS, DEFAULT_LEDGER_RETENTION_DAYS,
    DEFAULT_LEDGER_TIMEOUT_SECS, DEFAULT_LOOKAHEAD_MINUTES, DEFAULT_MAX_CONCURRENT_DISPATCHES,
    DEFAULT_MAX_DISPATCHES_PER_MINUTE, DEFAULT_STORE_TIMEOUT_SECS, DEFAULT_TICK_CRON,
};
use crate::impl_domain_status_conversions;

// Ten years; keeps chrono durations far from their bounds.
const MAX_WINDOW_MINUTES: i64 = 10 * 365 * 1_440;

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub reminder: ReminderConfig,
    pub mail: MailConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Reminder scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Six-field cron expression (seconds first)
    pub tick_cron: String,
    pub lookahead_minutes: u64,
    pub max_concurrent_dispatches: usize,
    pub max_dispatches_per_minute: u32,
    pub store_timeout_seconds: u64,
    pub dispatch_timeout_seconds: u64,
    pub ledger_timeout_seconds: u64,
    pub job_timeout_seconds: u64,
    pub ledger_retention_days: u64,
    /// IANA zone name used when printing due dates
    pub display_timezone: String,
    /// Link placed in the reminder body
    pub app_url: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_cron: DEFAULT_TICK_CRON.to_string(),
            lookahead_minutes: DEFAULT_LOOKAHEAD_MINUTES,
            max_concurrent_dispatches: DEFAULT_MAX_CONCURRENT_DISPATCHES,
            max_dispatches_per_minute: DEFAULT_MAX_DISPATCHES_PER_MINUTE,
            store_timeout_seconds: DEFAULT_STORE_TIMEOUT_SECS,
            dispatch_timeout_seconds: DEFAULT_DISPATCH_TIMEOUT_SECS,
            ledger_timeout_seconds: DEFAULT_LEDGER_TIMEOUT_SECS,
            job_timeout_seconds: DEFAULT_JOB_TIMEOUT_SECS,
            ledger_retention_days: DEFAULT_LEDGER_RETENTION_DAYS,
            display_timezone: DEFAULT_DISPLAY_TIMEZONE.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }
}

impl ReminderConfig {
    pub fn lookahead(&self) -> chrono::Duration {
        let minutes = i64::try_from(self.lookahead_minutes).unwrap_or(i64::MAX);
        chrono::Duration::minutes(minutes.min(MAX_WINDOW_MINUTES))
    }

    pub fn ledger_retention(&self) -> chrono::Duration {
        let days = i64::try_from(self.ledger_retention_days).unwrap_or(i64::MAX);
        chrono::Duration::days(days.min(MAX_WINDOW_MINUTES / 1_440))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_seconds)
    }

    pub fn ledger_timeout(&self) -> Duration {
        Duration::from_secs(self.ledger_timeout_seconds)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_seconds)
    }
}

/// Mail provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailService {
    /// JSON mail API reached over HTTPS
    Http,
    /// Dry run: notifications are written to the log only
    #[default]
    Log,
}

impl_domain_status_conversions!(MailService {
    Http => "http",
    Log => "log",
});

/// Mail transport configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub service: MailService,
    pub endpoint: Option<String>,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub from: Option<String>,
}

impl MailConfig {
    /// Sender address: explicit `from`, else the account user.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.user.as_deref()).map(str::trim).filter(|s| !s.is_empty())
    }
}
