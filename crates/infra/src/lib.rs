//! # Duebell Infrastructure
//!
//! Infrastructure implementations of the reminder ports.
//!
//! This crate contains:
//! - SQLite task store and reminder ledger (r2d2 pool)
//! - Mail transports (HTTP JSON API, dry-run log)
//! - Configuration loading and validation
//! - The cron scheduler that drives reminder ticks
//!
//! ## Architecture
//! - Implements traits defined in `duebell-core`
//! - Contains all "impure" code (I/O, network, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod instance_lock;
pub mod mail;
pub mod observability;
pub mod scheduling;

// Re-export commonly used items
pub use database::{DbManager, SqliteReminderLedger, SqliteTaskStore};
pub use errors::InfraError;
pub use http::HttpClient;
pub use instance_lock::InstanceLock;
pub use mail::{build_transport, HttpMailTransport, LogMailTransport};
pub use observability::metrics::ReminderMetrics;
pub use scheduling::{ReminderScheduler, ReminderSchedulerConfig, SchedulerError};
