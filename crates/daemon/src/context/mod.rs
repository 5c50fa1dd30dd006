//! Application context - dependency injection container

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use duebell_core::{
    ReminderLedger, ReminderRenderer, ReminderService, ReminderServiceConfig, TaskStore,
};
use duebell_domain::constants::DEFAULT_MAIL_FROM;
use duebell_domain::{Config, DuebellError, Result};
use duebell_infra::config::validate;
use duebell_infra::scheduling::ReminderJob;
use duebell_infra::{
    build_transport, DbManager, InstanceLock, ReminderMetrics, ReminderScheduler,
    ReminderSchedulerConfig, SqliteReminderLedger, SqliteTaskStore,
};

/// Upper bound for the startup health check
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Application context - holds the wired services
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub store: Arc<dyn TaskStore>,
    pub service: Arc<ReminderService>,
    pub metrics: Arc<ReminderMetrics>,
}

impl AppContext {
    /// Validate `config`, open and migrate the database, and build the
    /// reminder service on top of the configured transport.
    ///
    /// # Errors
    /// `Config` for invalid settings, `Database` if the store cannot be
    /// opened or migrated.
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;

        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let store: Arc<dyn TaskStore> = Arc::new(SqliteTaskStore::new(Arc::clone(&db)));
        let ledger: Arc<dyn ReminderLedger> = Arc::new(SqliteReminderLedger::new(Arc::clone(&db)));
        let transport = build_transport(&config.mail, config.reminder.dispatch_timeout())?;

        let sender = config.mail.sender().unwrap_or(DEFAULT_MAIL_FROM);
        let renderer = ReminderRenderer::new(
            sender,
            &config.reminder.display_timezone,
            config.reminder.app_url.clone(),
        )?;

        let service = Arc::new(ReminderService::new(
            ReminderServiceConfig::from(&config.reminder),
            renderer,
            Arc::clone(&store),
            transport,
            ledger,
        ));

        tracing::info!(
            db_path = %db.path().display(),
            transport = service.transport_name(),
            sender,
            lookahead_minutes = config.reminder.lookahead_minutes,
            "Application context initialised"
        );

        Ok(Self { config, db, store, service, metrics: Arc::new(ReminderMetrics::new()) })
    }

    /// Fail fast when the task store cannot answer a trivial query.
    pub async fn health_check(&self) -> Result<()> {
        tokio::time::timeout(HEALTH_CHECK_TIMEOUT, self.store.health_check())
            .await
            .map_err(|_| {
                tracing::error!(timeout_secs = HEALTH_CHECK_TIMEOUT.as_secs(), "Health check timed out");
                DuebellError::Database(format!(
                    "health check timed out after {}s",
                    HEALTH_CHECK_TIMEOUT.as_secs()
                ))
            })?
    }

    /// Build the cron scheduler around the reminder service. The scheduler
    /// is returned stopped.
    pub async fn create_reminder_scheduler(&self) -> Result<ReminderScheduler> {
        let job: Arc<dyn ReminderJob> = self.service.clone();
        let config = ReminderSchedulerConfig::from(&self.config.reminder);

        ReminderScheduler::new(config, job, Arc::clone(&self.metrics)).await.map_err(|err| {
            tracing::error!(error = %err, "failed to construct ReminderScheduler");
            DuebellError::from(err)
        })
    }
}

/// Take the single-instance lock for the database named in `config`.
/// Held by every command that sends reminders (`run` and `tick`).
pub fn acquire_instance_lock(config: &Config) -> Result<InstanceLock> {
    let lock_dir = lock_dir_for(Path::new(&config.database.path));
    InstanceLock::acquire(&lock_dir).map_err(|err| {
        tracing::error!(lock_dir = %lock_dir.display(), error = %err, "Instance lock unavailable");
        err
    })
}

/// Directory for the PID file: the one holding the database file, or `.`
/// for a bare file name.
pub fn lock_dir_for(db_path: &Path) -> PathBuf {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
