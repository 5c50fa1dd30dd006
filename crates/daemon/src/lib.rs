//! # Duebell Daemon
//!
//! Process entry layer for the reminder service.
//!
//! This crate contains:
//! - Command-line parsing (`run`, `tick`, `check`)
//! - Application context (dependency injection)
//! - Logging initialisation
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the adapters into the reminder service and scheduler

pub mod cli;
pub mod context;
pub mod logging;

pub use cli::{Cli, Command};
pub use context::AppContext;
