//! Parameter validation for clients and polling sessions.

use crate::error::{ClientError, Result};
use std::time::Duration;

/// Shortest accepted poll interval (inclusive).
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Longest accepted poll interval (inclusive).
pub const MAX_INTERVAL: Duration = Duration::from_secs(60);

/// Trait for values that must be checked before they are used.
///
/// Implemented by the client identity and by session parameters; both are
/// validated once, synchronously, before any network I/O or task spawn.
///
/// # Examples
///
/// ```rust
/// use configd_client::core::{SessionParams, Validate};
/// use configd_client::error::ClientError;
/// use std::time::Duration;
///
/// let params = SessionParams::new("schema", "", Duration::from_secs(5));
/// assert_eq!(params.validate(), Err(ClientError::EmptyConfigId));
/// ```
pub trait Validate {
    /// Validate the value.
    ///
    /// # Errors
    ///
    /// Returns the validation error describing the first rejected field.
    fn validate(&self) -> Result<()>;
}

/// Fail with `error` when `value` is empty.
pub(crate) fn require_non_empty(value: &str, error: ClientError) -> Result<()> {
    if value.is_empty() {
        return Err(error);
    }
    Ok(())
}

/// Check that a poll interval lies within `[MIN_INTERVAL, MAX_INTERVAL]`.
///
/// # Errors
///
/// Returns [`ClientError::InvalidInterval`] when the interval is out of bounds.
pub fn validate_interval(interval: Duration) -> Result<()> {
    if interval < MIN_INTERVAL || interval > MAX_INTERVAL {
        return Err(ClientError::InvalidInterval { interval });
    }
    Ok(())
}
