//! How gateway calls are run: timeout on every call, retry for reads,
//! and cancellation when the owning session ends.

use resilience::{with_retry_if, with_timeout_result, CancelSignal, ServiceConfig};
use std::future::Future;
use tracing::debug;

use crate::error::{FeedError, Result};

#[derive(Debug, Clone)]
pub struct CallPolicy {
    read: ServiceConfig,
    write: ServiceConfig,
    cancel: CancelSignal,
}

impl CallPolicy {
    pub fn new(read: ServiceConfig, write: ServiceConfig, cancel: CancelSignal) -> Self {
        Self {
            read,
            write,
            cancel,
        }
    }

    /// Idempotent call: timeout per attempt, retry on retryable errors
    pub async fn read<F, Fut, T>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        debug!(operation, "gateway read");
        self.run(&self.read, call).await
    }

    /// Non-idempotent call: timeout, never retried
    pub async fn write<F, Fut, T>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        debug!(operation, "gateway write");
        self.run(&self.write, call).await
    }

    async fn run<F, Fut, T>(&self, config: &ServiceConfig, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let duration = config.timeout.duration;
        let attempts = with_retry_if(
            config.retry_or_none(),
            || with_timeout_result(duration, call()),
            FeedError::is_retryable,
        );

        self.cancel.run(attempts).await?
    }
}
