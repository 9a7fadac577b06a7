//! Error types for interception.

use thiserror::Error;

/// Errors returned when installing an interceptor.
///
/// Failures raised by handlers or by the original function are not wrapped
/// in this type; they reach the caller of the intercepted slot unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptError {
    /// The target has no slot with the requested name.
    #[error("could not find a function '{name}' to intercept")]
    MissingFunction { name: String },

    /// The slot exists but does not hold a function.
    #[error("slot '{name}' holds {found}, not a function")]
    NotAFunction { name: String, found: &'static str },
}
