//! # Duebell Core
//!
//! Pure reminder logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (task store, transport, ledger, clock)
//! - Eligibility rules and the notification renderer
//! - The `ReminderService` tick and its report
//!
//! ## Architecture Principles
//! - Only depends on `duebell-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod reminder;

// Re-export specific items to avoid ambiguity
pub use reminder::ports::{
    Clock, NotificationTransport, ReminderLedger, SystemClock, TaskStore,
};
pub use reminder::{
    DispatchThrottle, ReminderRenderer, ReminderService, ReminderServiceConfig, SkipReason,
    TickError, TickReport,
};
