/// Timeout wrapper for async operations
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub duration: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
        }
    }
}

/// The deadline passed before the wrapped future resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Operation timed out after {0:?}")]
pub struct Elapsed(pub Duration);

/// Execute a fallible future with timeout, folding the deadline into the
/// caller's error type so the original error survives untouched.
pub async fn with_timeout_result<F, T, E>(duration: Duration, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<Elapsed>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(E::from(Elapsed(duration))),
    }
}
