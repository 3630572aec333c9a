//! Lifetime-scoped cancellation
//!
//! A [`Lifetime`] owns a `watch` channel; every [`CancelSignal`] handed out
//! observes it. Cancelling (or dropping) the lifetime resolves all pending
//! [`CancelSignal::run`] calls with [`Cancelled`].

use std::future::Future;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

/// Owner side of the cancellation channel. Dropping it cancels.
#[derive(Debug)]
pub struct Lifetime {
    tx: watch::Sender<bool>,
}

impl Lifetime {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

/// Observer side of a [`Lifetime`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the owning lifetime is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Sender gone without cancelling: only `never()` gets here.
                if *rx.borrow() {
                    return;
                }
                std::future::pending::<()>().await;
            }
        }
    }

    /// Drive `future` to completion unless the lifetime ends first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        }
    }
}
