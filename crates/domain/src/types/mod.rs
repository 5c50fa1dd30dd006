//! Domain types and models

pub mod reminder;
pub mod task;
pub mod user;

pub use reminder::{DeliveryReceipt, DueWindow, Notification, ReminderRecord};
pub use task::{Priority, Task, TaskStatus};
pub use user::User;
