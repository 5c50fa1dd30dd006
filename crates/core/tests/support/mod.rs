//! Shared test helpers for `duebell-core` integration tests.
//!
//! In-memory port implementations plus task fixtures, so tick tests can
//! focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;
