//! Built-in metrics for polling sessions.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Fetch attempts/failures
//! - Fetch duration
//! - Changes delivered and unchanged ticks
//! - Handler failures
//!
//! # Examples
//!
//! ```rust,no_run
//! use configd_client::prelude::*;
//! use opentelemetry::global;
//!
//! # fn example() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let client = ConfigdClient::builder()
//!     .with_url("http://localhost:8080")
//!     .with_source("billing")
//!     .with_instance("billing-1")
//!     .with_metrics(meter)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod poll_metrics;

pub use poll_metrics::PollMetrics;
