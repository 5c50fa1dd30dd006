//! Scheduler error types

use duebell_domain::DuebellError;
use thiserror::Error;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler already running")]
    AlreadyRunning,

    #[error("Scheduler not running")]
    NotRunning,

    #[error("Failed to create scheduler: {0}")]
    CreationFailed(String),

    #[error("Failed to start scheduler: {0}")]
    StartFailed(String),

    #[error("Failed to stop scheduler: {0}")]
    StopFailed(String),

    /// Invalid cron expression or rejected job
    #[error("Failed to register job: {0}")]
    JobRegistrationFailed(String),

    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<tokio::task::JoinError> for SchedulerError {
    fn from(err: tokio::task::JoinError) -> Self {
        SchedulerError::TaskJoinFailed(err.to_string())
    }
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let domain = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                DuebellError::InvalidInput(err.to_string())
            }
            SchedulerError::JobRegistrationFailed(_) => DuebellError::Config(err.to_string()),
            _ => DuebellError::Internal(err.to_string()),
        };
        InfraError(domain)
    }
}

impl From<SchedulerError> for DuebellError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_map_to_invalid_input() {
        let err: DuebellError = SchedulerError::AlreadyRunning.into();
        assert!(matches!(err, DuebellError::InvalidInput(_)));

        let err: DuebellError = SchedulerError::JobRegistrationFailed("bad cron".into()).into();
        assert!(matches!(err, DuebellError::Config(msg) if msg.contains("bad cron")));
    }
}
