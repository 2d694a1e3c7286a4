//! Latched completion signal for polling sessions.

use crate::error::{ClientError, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Terminal outcome of a polling session.
///
/// `Ok(())` means the session was cancelled; `Err` carries the fetch or
/// handler failure that stopped it.
pub type Outcome = Result<()>;

struct CompletionInner {
    outcome: Mutex<Option<Outcome>>,
    ready: Condvar,
    notify: Notify,
}

/// A single-assignment cell holding a session's terminal outcome.
///
/// The polling task writes the outcome exactly once and never blocks doing
/// so. Any number of clones can wait for it, either from async code with
/// [`wait`](Completion::wait) or from a plain thread with
/// [`wait_blocking`](Completion::wait_blocking). Waiters that arrive after
/// completion get the same outcome immediately.
///
/// # Examples
///
/// ```rust,no_run
/// # use configd_client::prelude::*;
/// # async fn example(handle: PollHandle) {
/// let completion = handle.completion();
///
/// std::thread::spawn(move || {
///     match completion.wait_blocking() {
///         Ok(()) => println!("polling cancelled"),
///         Err(e) => eprintln!("polling stopped: {}", e),
///     }
/// });
/// # }
/// ```
#[derive(Clone)]
pub struct Completion {
    inner: Arc<CompletionInner>,
}

impl Completion {
    /// Create an empty completion signal.
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(CompletionInner {
                outcome: Mutex::new(None),
                ready: Condvar::new(),
                notify: Notify::new(),
            }),
        }
    }

    /// Store the outcome and wake every waiter.
    ///
    /// Only the first call has an effect; returns `false` if an outcome was
    /// already stored.
    pub(crate) fn complete(&self, outcome: Outcome) -> bool {
        {
            let mut slot = self.inner.outcome.lock();
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
        }

        self.inner.ready.notify_all();
        self.inner.notify.notify_waiters();
        true
    }

    /// Returns `true` once an outcome has been stored.
    pub fn is_complete(&self) -> bool {
        self.inner.outcome.lock().is_some()
    }

    /// The stored outcome, without waiting.
    pub fn try_outcome(&self) -> Option<Outcome> {
        self.inner.outcome.lock().clone()
    }

    /// Wait asynchronously for the outcome.
    pub async fn wait(&self) -> Outcome {
        loop {
            // Register before checking so a concurrent `complete` cannot be missed.
            let notified = self.inner.notify.notified();

            if let Some(outcome) = self.try_outcome() {
                return outcome;
            }

            notified.await;
        }
    }

    /// Block the current thread until the outcome is available.
    ///
    /// Must not be called from an async task; use [`wait`](Completion::wait)
    /// there instead.
    pub fn wait_blocking(&self) -> Outcome {
        let mut slot = self.inner.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.inner.ready.wait(&mut slot);
        }
    }

    /// Block for at most `timeout`, returning `None` if no outcome arrived.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome> {
        let mut slot = self.inner.outcome.lock();
        if slot.is_none() {
            self.inner.ready.wait_while_for(&mut slot, |slot| slot.is_none(), timeout);
        }
        slot.clone()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("outcome", &self.try_outcome())
            .finish()
    }
}

/// Completes the signal with [`ClientError::SessionAborted`] if dropped
/// before an outcome was stored, e.g. when the polling task panics or the
/// runtime shuts down.
pub(crate) struct CompletionGuard {
    completion: Completion,
}

impl CompletionGuard {
    pub(crate) fn new(completion: Completion) -> Self {
        Self { completion }
    }

    pub(crate) fn complete(self, outcome: Outcome) {
        self.completion.complete(outcome);
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if self.completion.complete(Err(ClientError::SessionAborted)) {
            tracing::warn!("polling task ended without an outcome");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_first_outcome_wins() {
        let completion = Completion::new();
        assert!(!completion.is_complete());
        assert!(completion.try_outcome().is_none());

        assert!(completion.complete(Ok(())));
        assert!(!completion.complete(Err(ClientError::SessionAborted)));

        assert!(completion.is_complete());
        assert_eq!(completion.try_outcome(), Some(Ok(())));
    }

    #[test]
    fn test_blocking_wait_across_threads() {
        let completion = Completion::new();
        let producer = completion.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.complete(Err(ClientError::EmptyUrl));
        });

        assert_eq!(completion.wait_blocking(), Err(ClientError::EmptyUrl));
        // A second wait returns the same outcome instead of blocking.
        assert_eq!(completion.wait_blocking(), Err(ClientError::EmptyUrl));
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_timeout() {
        let completion = Completion::new();
        assert!(completion.wait_timeout(Duration::from_millis(20)).is_none());

        completion.complete(Ok(()));
        assert_eq!(completion.wait_timeout(Duration::from_millis(20)), Some(Ok(())));
    }

    #[tokio::test]
    async fn test_async_waiters_all_see_outcome() {
        let completion = Completion::new();

        let mut waiters = Vec::new();
        for _ in 0..3 {
            let completion = completion.clone();
            waiters.push(tokio::spawn(async move { completion.wait().await }));
        }

        tokio::task::yield_now().await;
        completion.complete(Err(ClientError::SessionAborted));

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), Err(ClientError::SessionAborted));
        }

        // Late waiter.
        assert_eq!(completion.wait().await, Err(ClientError::SessionAborted));
    }

    #[test]
    fn test_guard_reports_abort_on_drop() {
        let completion = Completion::new();
        drop(CompletionGuard::new(completion.clone()));
        assert_eq!(completion.try_outcome(), Some(Err(ClientError::SessionAborted)));
    }

    #[test]
    fn test_guard_keeps_delivered_outcome() {
        let completion = Completion::new();
        CompletionGuard::new(completion.clone()).complete(Ok(()));
        assert_eq!(completion.try_outcome(), Some(Ok(())));
    }
}
