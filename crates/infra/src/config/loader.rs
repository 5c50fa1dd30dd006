//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when `DUEBELL_DB_PATH` is set
//! 2. Otherwise a config file (explicit path, or the first probed location)
//! 3. The result is validated before it is returned
//!
//! ## Environment Variables
//! - `DUEBELL_DB_PATH` (required), `DUEBELL_DB_POOL_SIZE`
//! - `DUEBELL_REMINDER_ENABLED`, `DUEBELL_TICK_CRON`, `DUEBELL_LOOKAHEAD_MINUTES`
//! - `DUEBELL_MAX_CONCURRENT_DISPATCHES`, `DUEBELL_MAX_DISPATCHES_PER_MINUTE`
//! - `DUEBELL_STORE_TIMEOUT`, `DUEBELL_DISPATCH_TIMEOUT`, `DUEBELL_JOB_TIMEOUT`
//!   (seconds)
//! - `DUEBELL_LEDGER_RETENTION_DAYS`, `DUEBELL_DISPLAY_TIMEZONE`, `DUEBELL_APP_URL`
//! - `DUEBELL_MAIL_SERVICE` (`http` | `log`), `DUEBELL_MAIL_ENDPOINT`,
//!   `DUEBELL_MAIL_USER`, `DUEBELL_MAIL_PASSWORD`, `DUEBELL_MAIL_FROM`
//!
//! ## File Locations
//! `duebell.toml`, `duebell.json`, `config.toml`, `config.json` in the
//! working directory, then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono_tz::Tz;
use duebell_domain::{
    Config, DatabaseConfig, DuebellError, MailConfig, MailService, ReminderConfig, Result,
};

const CONFIG_FILE_NAMES: [&str; 4] = ["duebell.toml", "duebell.json", "config.toml", "config.json"];

/// Load and validate configuration from the environment, falling back to a
/// file.
///
/// # Errors
/// `DuebellError::Config` if no source is usable or validation fails.
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    if path.is_none() && std::env::var_os("DUEBELL_DB_PATH").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    load_from_file(path)
}

/// Load configuration from `DUEBELL_*` environment variables.
///
/// # Errors
/// `DuebellError::Config` if `DUEBELL_DB_PATH` is missing or a value does
/// not parse.
pub fn load_from_env() -> Result<Config> {
    let reminder_defaults = ReminderConfig::default();
    let database = DatabaseConfig {
        path: env_var("DUEBELL_DB_PATH")?,
        pool_size: env_parse("DUEBELL_DB_POOL_SIZE", DatabaseConfig::default().pool_size)?,
    };

    let reminder = ReminderConfig {
        enabled: env_bool("DUEBELL_REMINDER_ENABLED", reminder_defaults.enabled),
        tick_cron: env_string("DUEBELL_TICK_CRON", &reminder_defaults.tick_cron),
        lookahead_minutes: env_parse(
            "DUEBELL_LOOKAHEAD_MINUTES",
            reminder_defaults.lookahead_minutes,
        )?,
        max_concurrent_dispatches: env_parse(
            "DUEBELL_MAX_CONCURRENT_DISPATCHES",
            reminder_defaults.max_concurrent_dispatches,
        )?,
        max_dispatches_per_minute: env_parse(
            "DUEBELL_MAX_DISPATCHES_PER_MINUTE",
            reminder_defaults.max_dispatches_per_minute,
        )?,
        store_timeout_seconds: env_parse(
            "DUEBELL_STORE_TIMEOUT",
            reminder_defaults.store_timeout_seconds,
        )?,
        dispatch_timeout_seconds: env_parse(
            "DUEBELL_DISPATCH_TIMEOUT",
            reminder_defaults.dispatch_timeout_seconds,
        )?,
        ledger_timeout_seconds: reminder_defaults.ledger_timeout_seconds,
        job_timeout_seconds: env_parse("DUEBELL_JOB_TIMEOUT", reminder_defaults.job_timeout_seconds)?,
        ledger_retention_days: env_parse(
            "DUEBELL_LEDGER_RETENTION_DAYS",
            reminder_defaults.ledger_retention_days,
        )?,
        display_timezone: env_string(
            "DUEBELL_DISPLAY_TIMEZONE",
            &reminder_defaults.display_timezone,
        ),
        app_url: env_string("DUEBELL_APP_URL", &reminder_defaults.app_url),
    };

    let mail = MailConfig {
        service: env_parse("DUEBELL_MAIL_SERVICE", MailService::default())?,
        endpoint: env_opt("DUEBELL_MAIL_ENDPOINT"),
        user: env_opt("DUEBELL_MAIL_USER"),
        password: env_opt("DUEBELL_MAIL_PASSWORD"),
        from: env_opt("DUEBELL_MAIL_FROM"),
    };

    let config = Config { database, reminder, mail };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file, probing standard locations when `path`
/// is `None`. JSON and TOML are detected by extension.
///
/// # Errors
/// `DuebellError::Config` if the file is missing or malformed, or the
/// result fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DuebellError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DuebellError::Config(
                "No configuration: set DUEBELL_DB_PATH or provide duebell.toml".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DuebellError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DuebellError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DuebellError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(DuebellError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the working directory or next to the
/// executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Check cross-field constraints.
///
/// # Errors
/// `DuebellError::Config` naming the first offending key.
pub fn validate(config: &Config) -> Result<()> {
    let reminder = &config.reminder;

    if config.database.path.trim().is_empty() {
        return Err(invalid("database.path must not be empty"));
    }
    if config.database.pool_size == 0 {
        return Err(invalid("database.pool_size must be at least 1"));
    }
    if reminder.lookahead_minutes == 0 {
        return Err(invalid("reminder.lookahead_minutes must be greater than 0"));
    }
    if reminder.max_concurrent_dispatches == 0 {
        return Err(invalid("reminder.max_concurrent_dispatches must be at least 1"));
    }
    if reminder.max_dispatches_per_minute == 0 {
        return Err(invalid("reminder.max_dispatches_per_minute must be at least 1"));
    }
    for (key, value) in [
        ("reminder.store_timeout_seconds", reminder.store_timeout_seconds),
        ("reminder.dispatch_timeout_seconds", reminder.dispatch_timeout_seconds),
        ("reminder.ledger_timeout_seconds", reminder.ledger_timeout_seconds),
        ("reminder.job_timeout_seconds", reminder.job_timeout_seconds),
    ] {
        if value == 0 {
            return Err(invalid(&format!("{key} must be greater than 0")));
        }
    }

    let cron_fields = reminder.tick_cron.split_whitespace().count();
    if !(6..=7).contains(&cron_fields) {
        return Err(invalid(&format!(
            "reminder.tick_cron must have 6 or 7 fields (seconds first), got '{}'",
            reminder.tick_cron
        )));
    }

    if Tz::from_str(reminder.display_timezone.trim()).is_err() {
        return Err(invalid(&format!(
            "reminder.display_timezone is not a known IANA zone: {}",
            reminder.display_timezone
        )));
    }

    if config.mail.service == MailService::Http {
        if config.mail.endpoint.as_deref().map_or(true, |e| e.trim().is_empty()) {
            return Err(invalid("mail.endpoint is required when mail.service = \"http\""));
        }
        if config.mail.user.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(invalid("mail.user is required when mail.service = \"http\""));
        }
    }

    Ok(())
}

fn invalid(message: &str) -> DuebellError {
    DuebellError::Config(message.to_string())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        DuebellError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_string(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| DuebellError::Config(format!("Invalid value for {key}: {e}"))),
        None => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`
/// (case-insensitive); anything else is `false`.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
