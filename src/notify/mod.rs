//! Change and completion notification.
//!
//! Provides the handler trait through which changed snapshots are delivered
//! and the latched signal that reports why a polling session stopped.

pub mod completion;
pub mod handler;

pub use completion::{Completion, Outcome};
pub use handler::ChangeHandler;

pub(crate) use completion::CompletionGuard;
