//! Core client types: construction, snapshots, change detection and sessions.

mod builder;
mod client;
mod fingerprint;
mod session;
mod settings;
mod snapshot;
mod validation;

pub use builder::ConfigdClientBuilder;
pub use client::{ClientIdentity, ConfigdClient};
pub use fingerprint::{Fingerprint, PollState};
pub use session::{PollHandle, SessionParams};
pub use settings::{ClientSettings, DEFAULT_TIMEOUT_SECS, SettingsLoader};
pub use snapshot::{AccessRecord, ConfigSnapshot};
pub use validation::{MAX_INTERVAL, MIN_INTERVAL, Validate, validate_interval};
