//! Polling metrics tracking using OpenTelemetry.

use opentelemetry::metrics::{Counter, Histogram, Meter};
use std::time::Instant;

/// Metrics collector for polling sessions.
///
/// Shared by every session a client starts; each instrument is a cheap
/// handle so cloning is inexpensive.
///
/// # Examples
///
/// ```rust,no_run
/// use configd_client::metrics::PollMetrics;
/// use opentelemetry::global;
///
/// let metrics = PollMetrics::new(global::meter("configd-client"));
///
/// let timer = metrics.start_fetch();
/// // ... perform fetch ...
/// metrics.record_fetch(timer, true);
/// ```
#[derive(Clone)]
pub struct PollMetrics {
    fetch_attempts: Counter<u64>,
    fetch_failures: Counter<u64>,
    fetch_duration: Histogram<f64>,
    changes: Counter<u64>,
    unchanged: Counter<u64>,
    handler_failures: Counter<u64>,
}

impl PollMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let fetch_attempts = meter
            .u64_counter("configd_client.fetch.attempts")
            .with_description("Total number of configuration fetches")
            .build();

        let fetch_failures = meter
            .u64_counter("configd_client.fetch.failures")
            .with_description("Number of failed fetches")
            .build();

        let fetch_duration = meter
            .f64_histogram("configd_client.fetch.duration")
            .with_description("Duration of fetches in seconds")
            .with_unit("s")
            .build();

        let changes = meter
            .u64_counter("configd_client.changes")
            .with_description("Number of changed snapshots delivered to handlers")
            .build();

        let unchanged = meter
            .u64_counter("configd_client.unchanged")
            .with_description("Number of fetches whose fingerprint did not change")
            .build();

        let handler_failures = meter
            .u64_counter("configd_client.handler.failures")
            .with_description("Number of change handler failures")
            .build();

        Self {
            fetch_attempts,
            fetch_failures,
            fetch_duration,
            changes,
            unchanged,
            handler_failures,
        }
    }

    /// Start a fetch timer.
    ///
    /// Pass the returned `Instant` to [`record_fetch`](PollMetrics::record_fetch).
    pub fn start_fetch(&self) -> Instant {
        self.fetch_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record the end of a fetch started with [`start_fetch`](PollMetrics::start_fetch).
    pub fn record_fetch(&self, start: Instant, success: bool) {
        self.fetch_duration.record(start.elapsed().as_secs_f64(), &[]);
        if !success {
            self.fetch_failures.add(1, &[]);
        }
    }

    /// Record a snapshot delivered to the handler.
    pub fn record_change(&self) {
        self.changes.add(1, &[]);
    }

    /// Record a fetch whose fingerprint matched the previous one.
    pub fn record_unchanged(&self) {
        self.unchanged.add(1, &[]);
    }

    /// Record a handler failure.
    pub fn record_handler_failure(&self) {
        self.handler_failures.add(1, &[]);
    }
}
