//! Scheduling infrastructure for the reminder tick
//!
//! The scheduler follows these runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod error;
pub mod reminder_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use reminder_scheduler::{ReminderJob, ReminderScheduler, ReminderSchedulerConfig};
