//! # Duebell Domain
//!
//! Business domain types for the due-date reminder service.
//!
//! This crate contains:
//! - Task and user records as read from the task store
//! - Notification payloads and reminder ledger records
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Duebell crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::due_date::{format_timestamp, parse_due_date};
