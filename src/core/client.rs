//! The configd client and its identity.

use crate::core::session::{self, PollHandle, SessionContext, SessionParams};
use crate::core::validation::require_non_empty;
use crate::core::{ClientSettings, ConfigSnapshot, ConfigdClientBuilder, Validate};
use crate::error::{ClientError, Result};
use crate::notify::ChangeHandler;
use crate::sources::ConfigFetcher;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "metrics")]
use crate::metrics::PollMetrics;

/// Who the client is, as presented to configd on every request.
///
/// Validated once at construction and immutable afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    url: String,
    source: String,
    instance: String,
    password: Option<String>,
}

impl ClientIdentity {
    /// Create a validated identity.
    ///
    /// An empty password is treated as no password.
    ///
    /// # Errors
    ///
    /// Returns `EmptyUrl`, `EmptySource` or `EmptyInstance` (checked in that
    /// order) when a required field is empty.
    pub fn new(
        url: impl Into<String>,
        source: impl Into<String>,
        instance: impl Into<String>,
        password: Option<&str>,
    ) -> Result<Self> {
        let identity = Self {
            url: url.into(),
            source: source.into(),
            instance: instance.into(),
            password: password.filter(|p| !p.is_empty()).map(str::to_string),
        };
        identity.validate()?;
        Ok(identity)
    }

    /// Base URL of the configd service.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Source identity.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Instance identity.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Configuration password, if one was configured.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl Validate for ClientIdentity {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.url, ClientError::EmptyUrl)?;
        require_non_empty(&self.source, ClientError::EmptySource)?;
        require_non_empty(&self.instance, ClientError::EmptyInstance)?;
        Ok(())
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("url", &self.url)
            .field("source", &self.source)
            .field("instance", &self.instance)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Client for polling configurations from configd.
///
/// Construction validates the identity and performs no network I/O. Each
/// call to [`poll`](ConfigdClient::poll) starts an independent session with
/// its own change state and completion signal.
///
/// # Examples
///
/// ```rust,no_run
/// use configd_client::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let client = ConfigdClient::builder()
///     .with_url("http://localhost:8080")
///     .with_source("billing")
///     .with_instance("billing-1")
///     .with_password("passwd123")
///     .build()?;
///
/// let handle = client.poll(
///     "custom-schema",
///     "dev",
///     Duration::from_secs(2),
///     |snapshot: &ConfigSnapshot| -> std::result::Result<(), String> {
///         println!("{} is now at version {}", snapshot.id, snapshot.version);
///         Ok(())
///     },
/// )?;
///
/// handle.wait().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConfigdClient {
    identity: Arc<ClientIdentity>,
    fetcher: Arc<dyn ConfigFetcher>,
    #[cfg(feature = "metrics")]
    metrics: Option<PollMetrics>,
}

impl ConfigdClient {
    /// Create a client from loaded settings using the HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required identity field is empty.
    pub fn new(settings: ClientSettings) -> Result<Self> {
        Self::builder().with_settings(settings).build()
    }

    /// Create a new builder for constructing a client.
    pub fn builder() -> ConfigdClientBuilder {
        ConfigdClientBuilder::new()
    }

    pub(crate) fn from_parts(identity: ClientIdentity, fetcher: Arc<dyn ConfigFetcher>) -> Self {
        Self {
            identity: Arc::new(identity),
            fetcher,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Record session metrics with `metrics`.
    #[cfg(feature = "metrics")]
    pub(crate) fn set_metrics(&mut self, metrics: PollMetrics) {
        self.metrics = Some(metrics);
    }

    /// The identity presented to configd.
    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Fetch a configuration once, without starting a session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty identifiers, otherwise whatever
    /// the fetcher reports.
    pub async fn fetch(&self, schema_id: &str, config_id: &str) -> Result<ConfigSnapshot> {
        require_non_empty(schema_id, ClientError::EmptySchemaId)?;
        require_non_empty(config_id, ClientError::EmptyConfigId)?;
        self.fetcher.fetch(schema_id, config_id).await
    }

    /// Start polling a configuration.
    ///
    /// Returns immediately with a [`PollHandle`]. The first fetch happens one
    /// `interval` after the call. `handler` is invoked for the first snapshot
    /// and then only when the checksum or version changes.
    ///
    /// # Errors
    ///
    /// Fails synchronously, without starting a task, if:
    /// - `schema_id` or `config_id` is empty
    /// - `interval` is outside 1s..=60s
    /// - no tokio runtime is running
    pub fn poll<H>(
        &self,
        schema_id: impl Into<String>,
        config_id: impl Into<String>,
        interval: Duration,
        handler: H,
    ) -> Result<PollHandle>
    where
        H: ChangeHandler,
    {
        self.poll_with_cancellation(
            schema_id,
            config_id,
            interval,
            handler,
            CancellationToken::new(),
        )
    }

    /// Start polling, additionally stopping when `cancellation` is cancelled.
    ///
    /// The session listens on a child of `cancellation`, so
    /// [`PollHandle::cancel`] never cancels the caller's token.
    ///
    /// # Errors
    ///
    /// Same as [`poll`](ConfigdClient::poll).
    pub fn poll_with_cancellation<H>(
        &self,
        schema_id: impl Into<String>,
        config_id: impl Into<String>,
        interval: Duration,
        handler: H,
        cancellation: CancellationToken,
    ) -> Result<PollHandle>
    where
        H: ChangeHandler,
    {
        let params = SessionParams::new(schema_id, config_id, interval);
        let context = SessionContext {
            fetcher: Arc::clone(&self.fetcher),
            #[cfg(feature = "metrics")]
            metrics: self.metrics.clone(),
        };
        session::spawn(context, params, handler, cancellation.child_token())
    }
}

impl fmt::Debug for ConfigdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigdClient")
            .field("identity", &self.identity)
            .field("fetcher", &self.fetcher.name())
            .finish()
    }
}
