//! Process-wide cancellation signal

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Single shared "stop processing now" flag.
///
/// Cloning yields another handle to the same signal. Triggering is idempotent and
/// the signal can never be re-armed.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug, Default)]
struct SignalInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the signal. Returns `true` only for the call that flipped it.
    pub fn cancel(&self) -> bool {
        let first = !self.inner.cancelled.swap(true, Ordering::SeqCst);
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once the signal has been triggered.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // register interest before re-checking the flag so a concurrent cancel is not missed
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
