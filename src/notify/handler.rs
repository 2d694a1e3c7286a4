//! Change handlers invoked by the poll loop.

use crate::core::ConfigSnapshot;
use std::fmt;

/// Caller logic that receives genuinely changed configuration snapshots.
///
/// The poll loop calls the handler sequentially: never concurrently with
/// itself and never while the next fetch is in flight. Returning an error
/// stops the session and delivers the failure through its completion signal.
///
/// Closures of the form `FnMut(&ConfigSnapshot) -> Result<(), E>` implement
/// this trait for any displayable `E`.
///
/// # Examples
///
/// ```rust
/// use configd_client::core::ConfigSnapshot;
/// use configd_client::notify::ChangeHandler;
///
/// struct VersionRecorder {
///     seen: Vec<i64>,
/// }
///
/// impl ChangeHandler for VersionRecorder {
///     type Error = String;
///
///     fn on_change(&mut self, snapshot: &ConfigSnapshot) -> Result<(), String> {
///         if !snapshot.valid {
///             return Err(format!("config {} is invalid", snapshot.id));
///         }
///         self.seen.push(snapshot.version);
///         Ok(())
///     }
/// }
/// ```
pub trait ChangeHandler: Send + 'static {
    /// Error reported when the handler rejects a snapshot.
    type Error: fmt::Display;

    /// Process a changed snapshot.
    ///
    /// # Errors
    ///
    /// Any error ends the polling session.
    fn on_change(&mut self, snapshot: &ConfigSnapshot) -> Result<(), Self::Error>;
}

impl<F, E> ChangeHandler for F
where
    F: FnMut(&ConfigSnapshot) -> Result<(), E> + Send + 'static,
    E: fmt::Display,
{
    type Error = E;

    fn on_change(&mut self, snapshot: &ConfigSnapshot) -> Result<(), E> {
        self(snapshot)
    }
}
