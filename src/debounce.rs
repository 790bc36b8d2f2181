//! Trailing-edge debouncing of repeated calls.
//!
//! The core never debounces; callers that fire on every keystroke or file event wrap
//! their call in a [`Debouncer`] and only the last call within the quiet period runs.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay applied to search input before the query runs.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs only the most recent of a burst of calls, `delay` after the burst ends.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `f` to run after the delay, cancelling any call still waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone())
        {
            previous.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::trace!("Debounced call superseded");
                }
                () = tokio::time::sleep(delay) => f().await,
            }
        });
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        if let Some(token) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
