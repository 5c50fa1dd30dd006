//! Macro for implementing Display and FromStr for stored enum values
//!
//! Task records carry their enums as the exact strings the web application
//! writes (`"In Progress"`, `"High"`, ...). This macro maps each variant to
//! that string for `Display` and parses it back case-insensitively, ignoring
//! surrounding whitespace.
//!
//! # Example
//!
//! ```rust
//! use duebell_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Stage {
//!     Draft,
//!     InReview,
//! }
//!
//! impl_domain_status_conversions!(Stage {
//!     Draft => "Draft",
//!     InReview => "In Review",
//! });
//!
//! assert_eq!(Stage::InReview.to_string(), "In Review");
//! assert_eq!("in review".parse::<Stage>().unwrap(), Stage::InReview);
//! ```

/// Implements Display and FromStr traits for stored enum values
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their stored string
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
