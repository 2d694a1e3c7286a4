//! Polling sessions: the fetch / compare / notify loop and its handle.

use crate::core::validation::{require_non_empty, validate_interval};
use crate::core::{ConfigSnapshot, PollState, Validate};
use crate::error::{ClientError, Result};
use crate::notify::{ChangeHandler, Completion, CompletionGuard, Outcome};
use crate::sources::ConfigFetcher;
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

#[cfg(feature = "metrics")]
use crate::metrics::PollMetrics;

/// Parameters of one polling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    schema_id: String,
    config_id: String,
    interval: Duration,
}

impl SessionParams {
    /// Create session parameters. Call [`Validate::validate`] before use.
    pub fn new(
        schema_id: impl Into<String>,
        config_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            config_id: config_id.into(),
            interval,
        }
    }

    /// Schema identifier.
    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Configuration identifier.
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Time between fetches.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Validate for SessionParams {
    fn validate(&self) -> Result<()> {
        require_non_empty(&self.schema_id, ClientError::EmptySchemaId)?;
        require_non_empty(&self.config_id, ClientError::EmptyConfigId)?;
        validate_interval(self.interval)
    }
}

/// Collaborators shared by every session of a client.
pub(crate) struct SessionContext {
    pub(crate) fetcher: Arc<dyn ConfigFetcher>,
    #[cfg(feature = "metrics")]
    pub(crate) metrics: Option<PollMetrics>,
}

/// Handle to a running polling session.
///
/// Exposes the session's completion signal, explicit cancellation, and the
/// most recently delivered snapshot. Dropping the handle does not stop the
/// session; call [`cancel`](PollHandle::cancel) for that.
///
/// # Examples
///
/// ```rust,no_run
/// # use configd_client::prelude::*;
/// # async fn example(handle: PollHandle) -> Result<()> {
/// if let Some(snapshot) = handle.latest() {
///     println!("current version: {}", snapshot.version);
/// }
///
/// handle.cancel();
/// handle.wait().await?; // Ok(()) after cancellation
/// # Ok(())
/// # }
/// ```
pub struct PollHandle {
    params: SessionParams,
    cancellation: CancellationToken,
    completion: Completion,
    latest: Arc<ArcSwapOption<ConfigSnapshot>>,
}

impl PollHandle {
    /// Parameters this session was started with.
    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// Request the session to stop.
    ///
    /// A fetch already in flight completes first; the session then reports
    /// a no-error outcome.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// A clone of the token this session listens on.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The session's completion signal, for waiting from elsewhere.
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// Returns `true` once the session has stopped.
    pub fn is_finished(&self) -> bool {
        self.completion.is_complete()
    }

    /// The last snapshot delivered to the handler, if any.
    pub fn latest(&self) -> Option<Arc<ConfigSnapshot>> {
        self.latest.load_full()
    }

    /// Wait for the session to stop.
    ///
    /// Returns `Ok(())` after cancellation, or the fetch or handler error
    /// that ended the session. Repeated calls return the same outcome.
    pub async fn wait(&self) -> Outcome {
        self.completion.wait().await
    }

    /// Block the current thread until the session stops.
    ///
    /// Must not be called from an async task.
    pub fn wait_blocking(&self) -> Outcome {
        self.completion.wait_blocking()
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("params", &self.params)
            .field("cancelled", &self.is_cancelled())
            .field("completion", &self.completion)
            .finish()
    }
}

/// Validate `params` and spawn the polling task on the current runtime.
pub(crate) fn spawn<H>(
    context: SessionContext,
    params: SessionParams,
    handler: H,
    cancellation: CancellationToken,
) -> Result<PollHandle>
where
    H: ChangeHandler,
{
    params.validate()?;
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| ClientError::NoRuntime)?;

    let completion = Completion::new();
    let latest = Arc::new(ArcSwapOption::empty());

    let span = tracing::info_span!(
        "poll_session",
        schema_id = %params.schema_id,
        config_id = %params.config_id,
        fetcher = %context.fetcher.name(),
    );

    let guard = CompletionGuard::new(completion.clone());
    let session = run(
        context,
        params.clone(),
        handler,
        cancellation.clone(),
        Arc::clone(&latest),
    );

    runtime.spawn(
        async move {
            let outcome = session.await;
            guard.complete(outcome);
        }
        .instrument(span),
    );

    Ok(PollHandle {
        params,
        cancellation,
        completion,
        latest,
    })
}

/// The poll loop. Returns `Ok(())` on cancellation, otherwise the error that
/// stopped it.
async fn run<H>(
    context: SessionContext,
    params: SessionParams,
    mut handler: H,
    cancellation: CancellationToken,
    latest: Arc<ArcSwapOption<ConfigSnapshot>>,
) -> Outcome
where
    H: ChangeHandler,
{
    let mut state = PollState::new();
    let mut ticker = time::interval_at(Instant::now() + params.interval, params.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(interval = ?params.interval, "polling started");

    loop {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {}
            _ = ticker.tick() => {}
        }

        if cancellation.is_cancelled() {
            tracing::info!("polling cancelled");
            return Ok(());
        }

        #[cfg(feature = "metrics")]
        let timer = context.metrics.as_ref().map(PollMetrics::start_fetch);

        let fetched = context
            .fetcher
            .fetch(&params.schema_id, &params.config_id)
            .await;

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&context.metrics, timer) {
            metrics.record_fetch(timer, fetched.is_ok());
        }

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed, polling stopped");
                return Err(e);
            }
        };

        if !state.observe(&snapshot) {
            tracing::debug!(version = snapshot.version, "configuration unchanged");
            #[cfg(feature = "metrics")]
            if let Some(metrics) = &context.metrics {
                metrics.record_unchanged();
            }
            continue;
        }

        tracing::info!(
            version = snapshot.version,
            checksum = %snapshot.checksum,
            valid = snapshot.valid,
            "configuration changed"
        );

        let snapshot = Arc::new(snapshot);
        latest.store(Some(Arc::clone(&snapshot)));

        #[cfg(feature = "metrics")]
        if let Some(metrics) = &context.metrics {
            metrics.record_change();
        }

        if let Err(message) = handler.on_change(&snapshot).map_err(|e| e.to_string()) {
            let err = ClientError::Handler {
                version: snapshot.version,
                message,
            };

            #[cfg(feature = "metrics")]
            if let Some(metrics) = &context.metrics {
                metrics.record_handler_failure();
            }

            tracing::warn!(error = %err, "change handler failed, polling stopped");
            return Err(err);
        }
    }
}
