//! Configuration fetcher trait.

use crate::core::ConfigSnapshot;
use crate::error::Result;
use async_trait::async_trait;

/// Performs one request/response cycle against configd.
///
/// Implement this trait to plug in another transport or an in-memory fake.
/// The poll loop awaits each fetch to completion and never issues two
/// fetches concurrently for the same session. Timeouts and connection
/// management are the fetcher's own concern.
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    /// Fetch the current snapshot of `config_id` within `schema_id`.
    ///
    /// # Errors
    ///
    /// Returns a transport-kind error if the request fails or the response
    /// cannot be decoded.
    async fn fetch(&self, schema_id: &str, config_id: &str) -> Result<ConfigSnapshot>;

    /// Get a human-readable name for this fetcher (for logging/debugging).
    fn name(&self) -> String;
}
