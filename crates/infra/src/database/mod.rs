//! Database implementations

pub mod manager;
pub mod reminder_ledger_repository;
pub mod task_repository;

pub use manager::*;
pub use reminder_ledger_repository::*;
pub use task_repository::*;
