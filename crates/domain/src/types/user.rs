//! User types
//!
//! Users are owned by the web application; the reminder service only reads
//! the fields it needs to address and greet the recipient.

use serde::{Deserialize, Serialize};

/// Owner of a task, as resolved by the task store join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Trimmed email address, or `None` when missing or blank.
    pub fn reachable_email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|email| !email.is_empty())
    }

    /// Name used in greetings. Empty when the user has no first name.
    pub fn greeting_name(&self) -> &str {
        self.first_name.as_deref().map(str::trim).unwrap_or_default()
    }
}
