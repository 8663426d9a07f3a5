//! Macro for implementing Display and FromStr for closed enums
//!
//! Availability states, HTTP methods and operation classes all travel as
//! strings (logs, configuration, the offline store). This macro keeps the
//! string form in one place per enum.
//!
//! # Example
//!
//! ```rust
//! use backoffice_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum LinkState {
//!     Up,
//!     Down,
//! }
//!
//! impl_domain_status_conversions!(LinkState {
//!     Up => "up",
//!     Down => "down",
//! });
//!
//! assert_eq!("UP".parse::<LinkState>(), Ok(LinkState::Up));
//! assert_eq!(LinkState::Down.to_string(), "down");
//! ```

/// Implements Display and FromStr traits for closed enums
///
/// This macro generates:
/// - Display trait: writes the declared string verbatim
/// - FromStr trait: case-insensitive, whitespace-trimmed parse
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
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

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let candidate = s.trim();
                $(
                    if candidate.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
