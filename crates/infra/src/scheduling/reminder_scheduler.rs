//! Cron-driven reminder scheduler.
//!
//! Wraps a `tokio-cron-scheduler` job that runs one reminder tick per firing.
//! Join handles are tracked, cancellation is explicit, and every lifecycle
//! step and job run is bounded by a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use duebell_core::ReminderService;
//! use duebell_infra::observability::metrics::ReminderMetrics;
//! use duebell_infra::scheduling::{ReminderScheduler, ReminderSchedulerConfig, SchedulerResult};
//!
//! # async fn example(service: Arc<ReminderService>) -> SchedulerResult<()> {
//! let metrics = Arc::new(ReminderMetrics::new());
//! let mut scheduler =
//!     ReminderScheduler::new(ReminderSchedulerConfig::default(), service, metrics).await?;
//!
//! scheduler.start().await?;
//! // ... service runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use duebell_core::{ReminderService, TickError, TickReport};
use duebell_domain::ReminderConfig;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::observability::log_metric;
use crate::observability::metrics::ReminderMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Work executed on each cron firing.
#[async_trait]
pub trait ReminderJob: Send + Sync {
    async fn run(&self) -> Result<TickReport, TickError>;
}

#[async_trait]
impl ReminderJob for ReminderService {
    async fn run(&self) -> Result<TickReport, TickError> {
        self.run_tick().await
    }
}

#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// Six-field cron expression (seconds first)
    pub cron_expression: String,
    /// Upper bound for one tick
    pub job_timeout: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle
    pub join_timeout: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self::from(&ReminderConfig::default())
    }
}

impl From<&ReminderConfig> for ReminderSchedulerConfig {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            cron_expression: config.tick_cron.clone(),
            job_timeout: config.job_timeout(),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Reminder scheduler with explicit lifecycle management.
///
/// The underlying `JobScheduler` is rebuilt after each stop so the scheduler
/// can be restarted.
pub struct ReminderScheduler {
    scheduler: Option<JobScheduler>,
    config: ReminderSchedulerConfig,
    job_id: Uuid,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    metrics: Arc<ReminderMetrics>,
    job: Arc<dyn ReminderJob>,
}

impl ReminderScheduler {
    /// Create a scheduler and register the tick job.
    ///
    /// # Errors
    /// `JobRegistrationFailed` if the cron expression is invalid.
    pub async fn new(
        config: ReminderSchedulerConfig,
        job: Arc<dyn ReminderJob>,
        metrics: Arc<ReminderMetrics>,
    ) -> SchedulerResult<Self> {
        let mut scheduler = Self {
            scheduler: None,
            config,
            job_id: Uuid::nil(),
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            metrics,
            job,
        };

        scheduler.ensure_scheduler().await?;
        Ok(scheduler)
    }

    /// Start firing ticks.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.ensure_scheduler().await?;
        let scheduler =
            self.scheduler.as_ref().ok_or_else(|| SchedulerError::StartFailed("scheduler missing".into()))?;

        let start_timeout = self.config.start_timeout;
        tokio::time::timeout(start_timeout, scheduler.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?
            .map_err(|err| SchedulerError::StartFailed(err.to_string()))?;

        let cancel = self.cancellation.clone();
        self.monitor_handle = Some(tokio::spawn(Self::monitor_task(cancel)));

        info!(cron = %self.config.cron_expression, job_id = %self.job_id, "Reminder scheduler started");
        Ok(())
    }

    /// Stop firing ticks and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        if let Some(mut scheduler) = self.scheduler.take() {
            let stop_timeout = self.config.stop_timeout;
            tokio::time::timeout(stop_timeout, scheduler.shutdown())
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
                .map_err(|err| SchedulerError::StopFailed(err.to_string()))?;
        }
        self.job_id = Uuid::nil();

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;
        }

        info!("Reminder scheduler stopped");
        Ok(())
    }

    /// Returns true when the monitor task is active.
    pub fn is_running(&self) -> bool {
        self.monitor_handle.as_ref().map_or(false, |handle| !handle.is_finished())
    }

    pub fn metrics(&self) -> &Arc<ReminderMetrics> {
        &self.metrics
    }

    async fn ensure_scheduler(&mut self) -> SchedulerResult<()> {
        if self.scheduler.is_some() {
            return Ok(());
        }

        let scheduler =
            JobScheduler::new().await.map_err(|err| SchedulerError::CreationFailed(err.to_string()))?;

        // Each JobScheduler generation gets its own token; firings after
        // cancellation are ignored even if the cron loop is still alive.
        let cancellation = CancellationToken::new();
        let job = self.job.clone();
        let metrics = self.metrics.clone();
        let job_timeout = self.config.job_timeout;
        let job_cancel = cancellation.clone();

        let definition = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let job = job.clone();
            let metrics = metrics.clone();
            let cancel = job_cancel.clone();
            Box::pin(async move {
                if cancel.is_cancelled() {
                    debug!("Reminder scheduler cancelled; ignoring cron firing");
                    return;
                }
                run_job(job, metrics, job_timeout).await;
            })
        })
        .map_err(|err| {
            SchedulerError::JobRegistrationFailed(format!(
                "{} ({err})",
                self.config.cron_expression
            ))
        })?;

        let job_id = scheduler
            .add(definition)
            .await
            .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered reminder job");
        self.job_id = job_id;
        self.cancellation = cancellation;
        self.scheduler = Some(scheduler);
        Ok(())
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Reminder scheduler monitor cancelled");
    }
}

async fn run_job(job: Arc<dyn ReminderJob>, metrics: Arc<ReminderMetrics>, job_timeout: Duration) {
    log_metric(metrics.record_tick_started(), "scheduler.reminder.tick.started");

    match tokio::time::timeout(job_timeout, job.run()).await {
        Ok(Ok(report)) => {
            log_metric(metrics.record_tick_completed(&report), "scheduler.reminder.tick.completed");
            debug!(
                dispatched = report.dispatched_count(),
                failed = report.failed_count(),
                "Scheduled reminder tick finished"
            );
        }
        Ok(Err(TickError::TickInProgress)) => {
            log_metric(metrics.record_tick_overlapped(), "scheduler.reminder.tick.overlap");
            warn!("Previous reminder tick still running; skipping this firing");
        }
        Ok(Err(err)) => {
            log_metric(metrics.record_tick_failed(), "scheduler.reminder.tick.error");
            error!(error = %err, "Scheduled reminder tick failed");
        }
        Err(_) => {
            log_metric(metrics.record_tick_timeout(), "scheduler.reminder.tick.timeout");
            warn!(timeout_secs = job_timeout.as_secs(), "Scheduled reminder tick timed out");
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if !self.is_running() {
            return;
        }
        warn!("ReminderScheduler dropped while running; cancelling tasks");
        self.cancellation.cancel();

        if let Some(mut scheduler) = self.scheduler.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(err) = scheduler.shutdown().await {
                            warn!(error = %err, "Failed to shut down dropped reminder scheduler");
                        }
                    });
                }
                Err(_) => debug!("No runtime available; dropped scheduler relies on cancellation"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration as ChronoDuration, Utc};
    use duebell_domain::DueWindow;

    use super::*;

    enum Behaviour {
        Succeed,
        Overlap,
        Hang,
        StoreDown,
    }

    struct ScriptedJob {
        runs: AtomicUsize,
        behaviour: Behaviour,
    }

    impl ScriptedJob {
        fn new(behaviour: Behaviour) -> Self {
            Self { runs: AtomicUsize::new(0), behaviour }
        }

        fn run_count(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReminderJob for ScriptedJob {
        async fn run(&self) -> Result<TickReport, TickError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => {
                    Ok(TickReport::new(DueWindow::starting_at(Utc::now(), ChronoDuration::hours(1))))
                }
                Behaviour::Overlap => Err(TickError::TickInProgress),
                Behaviour::StoreDown => Err(TickError::StoreUnavailable("connection refused".into())),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(TickError::StoreUnavailable("unreachable".into()))
                }
            }
        }
    }

    fn fast_config() -> ReminderSchedulerConfig {
        ReminderSchedulerConfig {
            cron_expression: "*/1 * * * * *".into(), // every second
            job_timeout: Duration::from_millis(200),
            start_timeout: Duration::from_secs(2),
            stop_timeout: Duration::from_secs(2),
            join_timeout: Duration::from_secs(2),
        }
    }

    async fn scheduler_with(behaviour: Behaviour) -> (ReminderScheduler, Arc<ScriptedJob>) {
        let job = Arc::new(ScriptedJob::new(behaviour));
        let scheduler =
            ReminderScheduler::new(fast_config(), job.clone(), Arc::new(ReminderMetrics::new()))
                .await
                .expect("scheduler created");
        (scheduler, job)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lifecycle_runs_ticks() {
        let (mut scheduler, job) = scheduler_with(Behaviour::Succeed).await;

        scheduler.start().await.expect("start succeeds");
        assert!(scheduler.is_running());
        tokio::time::sleep(Duration::from_millis(2_200)).await;
        scheduler.stop().await.expect("stop succeeds");

        assert!(job.run_count() >= 1);
        assert!(!scheduler.is_running());
        assert!(scheduler.metrics().snapshot().ticks_completed >= 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn double_start_is_rejected() {
        let (mut scheduler, _job) = scheduler_with(Behaviour::Succeed).await;

        scheduler.start().await.expect("first start");
        let err = scheduler.start().await.expect_err("second start fails");
        assert!(matches!(err, SchedulerError::AlreadyRunning));
        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_when_idle_is_rejected() {
        let (mut scheduler, _job) = scheduler_with(Behaviour::Succeed).await;

        let err = scheduler.stop().await.expect_err("stop fails");
        assert!(matches!(err, SchedulerError::NotRunning));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restart_after_stop_succeeds() {
        let (mut scheduler, _job) = scheduler_with(Behaviour::Succeed).await;

        scheduler.start().await.expect("start succeeds");
        scheduler.stop().await.expect("stop succeeds");
        assert!(!scheduler.is_running());

        scheduler.start().await.expect("start again");
        assert!(scheduler.is_running());
        scheduler.stop().await.expect("stop again");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_cron_fails_registration() {
        let config =
            ReminderSchedulerConfig { cron_expression: "every five minutes".into(), ..fast_config() };
        let result = ReminderScheduler::new(
            config,
            Arc::new(ScriptedJob::new(Behaviour::Succeed)),
            Arc::new(ReminderMetrics::new()),
        )
        .await;

        assert!(matches!(result, Err(SchedulerError::JobRegistrationFailed(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overlapping_and_hung_ticks_are_counted() {
        let (mut overlapping, _job) = scheduler_with(Behaviour::Overlap).await;
        let (mut hanging, _job) = scheduler_with(Behaviour::Hang).await;

        overlapping.start().await.unwrap();
        hanging.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_200)).await;
        overlapping.stop().await.unwrap();
        hanging.stop().await.unwrap();

        assert!(overlapping.metrics().snapshot().ticks_overlapped >= 1);
        assert!(hanging.metrics().snapshot().ticks_timed_out >= 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn store_outage_fails_tick_but_keeps_firing() {
        let (mut scheduler, job) = scheduler_with(Behaviour::StoreDown).await;

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(3_200)).await;
        assert!(scheduler.is_running());
        scheduler.stop().await.expect("stop succeeds");

        let snapshot = scheduler.metrics().snapshot();
        assert!(job.run_count() >= 2, "scheduler kept firing after a failed tick");
        assert!(snapshot.ticks_failed >= 2);
        assert_eq!(snapshot.ticks_completed, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dropping_running_scheduler_stops_ticks() {
        let (mut scheduler, job) = scheduler_with(Behaviour::Succeed).await;

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        drop(scheduler);
        tokio::time::sleep(Duration::from_millis(200)).await;

        let at_drop = job.run_count();
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(job.run_count(), at_drop);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stopped_scheduler_ignores_late_firings() {
        let (mut scheduler, job) = scheduler_with(Behaviour::Succeed).await;

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        scheduler.stop().await.expect("stop succeeds");

        let at_stop = job.run_count();
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(job.run_count(), at_stop);
    }
}
