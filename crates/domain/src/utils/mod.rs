//! Domain utilities

pub mod due_date;
