//! Per-call cancellation and deadlines
//!
//! A [`CallContext`] travels with every protocol call. It can carry a
//! deadline and any number of cancellation signals; clones observe the same
//! signals. The network exchange of a call races against
//! [`CallContext::done`], so a fired context returns promptly without a
//! response being parsed.

use std::future::pending;
use std::time::Duration;

use futures::future::select_all;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// Why a context stopped a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// A [`CancelHandle`] fired
    Cancelled,
    /// The deadline passed
    DeadlineExceeded,
}

/// Cancellation and deadline scope for protocol calls
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    signals: Vec<watch::Receiver<bool>>,
}

/// Cancels every clone of the context it was created with
///
/// Dropping the handle without calling [`CancelHandle::cancel`] leaves the
/// context running.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl CallContext {
    /// Context that never cancels and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_in(timeout)
    }

    /// Add a deadline `timeout` from now; the earlier deadline wins
    pub fn deadline_in(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Add an absolute deadline; the earlier deadline wins
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Derive a context that can additionally be cancelled by the returned handle
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.signals.push(rx);
        (self, CancelHandle { tx })
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check; cancellation takes precedence over expiry
    pub fn check(&self) -> Option<Interrupt> {
        if self.signals.iter().any(|rx| *rx.borrow()) {
            return Some(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupt::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context is cancelled or expires
    ///
    /// Never resolves for [`CallContext::background`].
    pub async fn done(&self) -> Interrupt {
        let cancelled = async {
            if self.signals.is_empty() {
                pending::<()>().await;
            }
            let waits = self
                .signals
                .iter()
                .cloned()
                .map(|rx| Box::pin(wait_cancelled(rx)));
            select_all(waits).await;
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Interrupt::Cancelled,
            _ = expired => Interrupt::DeadlineExceeded,
        }
    }
}

async fn wait_cancelled(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Handle dropped without cancelling
            pending::<()>().await;
        }
    }
}
