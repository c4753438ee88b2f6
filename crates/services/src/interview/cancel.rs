use std::sync::Arc;

use tokio::sync::watch;

/// One-shot cancellation signal shared between clones.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `cancel` has been called on any clone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // the sender lives as long as `self`, so this only returns on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle that tears a session down from outside the controller.
///
/// Closing stops the countdown ticker and cancels any in-flight feedback
/// request at once, even while the controller itself is awaiting.
#[derive(Clone, Debug, Default)]
pub struct CloseHandle {
    closed: CancelToken,
    timer: CancelToken,
}

impl CloseHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&self) {
        self.timer.cancel();
        self.closed.cancel();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Token cancelled when the session is closed.
    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.closed
    }

    pub(crate) fn timer_token(&self) -> CancelToken {
        self.timer.clone()
    }

    pub(crate) fn stop_timer(&self) {
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_wakes_every_clone() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });
        assert!(!token.is_cancelled());
        token.cancel();
        task.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn close_stops_timer_and_cancels() {
        let handle = CloseHandle::new();
        let timer = handle.timer_token();
        handle.close();
        assert!(handle.is_closed());
        assert!(timer.is_cancelled());
        handle.token().cancelled().await;
    }

    #[test]
    fn stopping_timer_does_not_close() {
        let handle = CloseHandle::new();
        handle.stop_timer();
        assert!(!handle.is_closed());
        assert!(handle.timer_token().is_cancelled());
    }
}
