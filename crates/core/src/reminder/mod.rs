//! Due-date reminders
//!
//! A tick captures `now`, asks the [`TaskStore`](ports::TaskStore) for
//! in-progress tasks due within `[now, now + lookahead]`, re-checks each one
//! against the [eligibility](eligibility) rules and dispatches a rendered
//! email per eligible task through the
//! [`NotificationTransport`](ports::NotificationTransport). Sent reminders
//! are written to the [`ReminderLedger`](ports::ReminderLedger) so later
//! ticks do not repeat them.

pub mod eligibility;
pub mod error;
pub mod ports;
pub mod render;
pub mod report;
pub mod service;
pub mod throttle;

pub use eligibility::{evaluate, Candidate};
pub use error::{SkipReason, TickError};
pub use render::ReminderRenderer;
pub use report::{DispatchedReminder, FailedDispatch, SkippedTask, TickReport};
pub use service::{ReminderService, ReminderServiceConfig};
pub use throttle::DispatchThrottle;
