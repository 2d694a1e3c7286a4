//! Builder for constructing ConfigdClient instances.

use crate::core::{ClientIdentity, ClientSettings, ConfigdClient, DEFAULT_TIMEOUT_SECS};
use crate::error::{ClientError, Result};
use crate::sources::ConfigFetcher;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use crate::metrics::PollMetrics;

/// Builder for constructing a [`ConfigdClient`].
///
/// Provides a fluent interface for the client identity and transport
/// settings. Validation happens in [`build`](ConfigdClientBuilder::build).
///
/// # Examples
///
/// ```rust,no_run
/// use configd_client::prelude::*;
/// use std::time::Duration;
///
/// # fn example() -> Result<()> {
/// let client = ConfigdClient::builder()
///     .with_url("http://localhost:8080")
///     .with_source("billing")
///     .with_instance("billing-1")
///     .with_timeout(Duration::from_secs(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ConfigdClientBuilder {
    url: String,
    source: String,
    instance: String,
    password: Option<String>,
    timeout: Duration,
    fetcher: Option<Arc<dyn ConfigFetcher>>,
    #[cfg(feature = "metrics")]
    metrics: Option<PollMetrics>,
}

impl ConfigdClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: String::new(),
            source: String::new(),
            instance: String::new(),
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fetcher: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Set the base URL of the configd service.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the source identity sent with every request.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the instance identity sent with every request.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// Set the configuration password.
    ///
    /// An empty password means no password header is sent.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the per-request timeout of the HTTP fetcher.
    ///
    /// Default is 10 seconds. This is not the poll interval.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Take identity and timeout from loaded settings.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use configd_client::prelude::*;
    ///
    /// # fn example() -> Result<()> {
    /// let settings = SettingsLoader::new()
    ///     .with_file("configd.toml")
    ///     .with_env_overrides("CONFIGD", "__")
    ///     .load()?;
    ///
    /// let client = ConfigdClient::builder().with_settings(settings).build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.timeout = settings.request_timeout();
        self.url = settings.url;
        self.source = settings.source;
        self.instance = settings.instance;
        self.password = settings.password;
        self
    }

    /// Use a custom fetcher instead of the HTTP fetcher.
    ///
    /// The identity is still validated; the timeout is ignored.
    pub fn with_fetcher<F: ConfigFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Use a shared custom fetcher instead of the HTTP fetcher.
    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn ConfigFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Record poll metrics for every session started by the client.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(PollMetrics::new(meter));
        self
    }

    /// Build the client.
    ///
    /// Performs no network I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL, source or instance is empty
    /// - The request timeout is zero
    /// - The URL cannot be parsed or an identity value is not a valid header value
    /// - No fetcher was given and the `remote` feature is disabled
    pub fn build(self) -> Result<ConfigdClient> {
        let identity = ClientIdentity::new(
            self.url,
            self.source,
            self.instance,
            self.password.as_deref(),
        )?;

        if self.timeout.is_zero() {
            return Err(ClientError::InvalidTimeout);
        }

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => default_fetcher(&identity, self.timeout)?,
        };

        #[allow(unused_mut)]
        let mut client = ConfigdClient::from_parts(identity, fetcher);

        #[cfg(feature = "metrics")]
        if let Some(metrics) = self.metrics {
            client.set_metrics(metrics);
        }

        Ok(client)
    }
}

impl Default for ConfigdClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "remote")]
fn default_fetcher(identity: &ClientIdentity, timeout: Duration) -> Result<Arc<dyn ConfigFetcher>> {
    let fetcher = crate::sources::HttpFetcher::new(identity, timeout)?;
    Ok(Arc::new(fetcher))
}

#[cfg(not(feature = "remote"))]
fn default_fetcher(
    _identity: &ClientIdentity,
    _timeout: Duration,
) -> Result<Arc<dyn ConfigFetcher>> {
    Err(ClientError::FeatureNotEnabled("remote"))
}
