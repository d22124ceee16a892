//! Caller-controlled cancellation and deadlines.
//!
//! Operations apply no timeouts of their own. A [`CallContext`] wraps an
//! operation future and drops it (aborting the in-flight request) as soon as
//! the caller cancels or the deadline passes.
//!
//! ```rust,ignore
//! let (ctx, cancel) = CallContext::background()
//!     .with_timeout(Duration::from_secs(5))
//!     .cancellable();
//!
//! // elsewhere: cancel.cancel();
//! let result = ctx.run(client.check(param)).await;
//! ```

use std::future::{pending, Future};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::{Result, WlcError};

/// Cancellation signal and optional deadline for one or more calls.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every call running under the paired [`CallContext`].
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        // Receivers may already be gone; nothing to cancel then.
        let _ = self.0.send(true);
    }
}

impl CallContext {
    /// A context that never cancels and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Fail calls that have not completed by `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Fail calls that have not completed within `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that can additionally be cancelled through the
    /// returned handle.
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(rx);
        (self, CancelHandle(tx))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Drive `operation` until it completes, the context is cancelled, or
    /// the deadline passes.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    // A dropped handle can never cancel.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        pending::<()>().await;
                    }
                }
                None => pending::<()>().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => {
                tracing::debug!("call cancelled by caller");
                Err(WlcError::Cancelled)
            }
            _ = expired => {
                tracing::debug!("call deadline exceeded");
                Err(WlcError::DeadlineExceeded)
            }
            result = operation => result,
        }
    }
}
