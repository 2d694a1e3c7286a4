//! # configd-client
//!
//! Polling client for [configd](https://github.com/aboglioli/configd) with
//! change detection and a reliable "polling stopped" signal.
//!
//! ## Overview
//!
//! `configd-client` periodically fetches one configuration from configd and
//! calls your handler only when its content actually changed:
//! - Change detection by `(checksum, version)` fingerprint
//! - One tokio task per polling session, handler calls strictly sequential
//! - A latched completion signal that reports exactly one terminal outcome
//! - Explicit cancellation through the session handle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use configd_client::prelude::*;
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     env: String,
//!     rate_limit: f64,
//! }
//!
//! # async fn example() -> configd_client::error::Result<()> {
//! let client = ConfigdClient::builder()
//!     .with_url("http://localhost:8080")
//!     .with_source("billing")
//!     .with_instance("billing-1")
//!     .build()?;
//!
//! let handle = client.poll(
//!     "custom-schema",
//!     "dev",
//!     Duration::from_secs(2),
//!     |snapshot: &ConfigSnapshot| -> std::result::Result<(), ClientError> {
//!         let config: AppConfig = snapshot.decode()?;
//!         println!("version {}: {:?}", snapshot.version, config);
//!         Ok(())
//!     },
//! )?;
//!
//! // Resolves once polling stops: Ok(()) after cancel, Err on failure.
//! handle.wait().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Semantics
//!
//! Nothing is retried. A failed fetch or a failed handler ends the session
//! and is reported through [`PollHandle::wait`](core::PollHandle::wait);
//! start a new session to resume.
//!
//! ## Feature Flags
//!
//! - `remote` (default): HTTP fetcher built on `reqwest`
//! - `metrics`: OpenTelemetry poll metrics

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;
pub mod sources;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        ClientSettings, ConfigSnapshot, ConfigdClient, ConfigdClientBuilder, PollHandle,
        SettingsLoader,
    };
    pub use crate::error::{ClientError, ErrorKind, Result};
    pub use crate::notify::{ChangeHandler, Completion};
    pub use crate::sources::ConfigFetcher;
}
