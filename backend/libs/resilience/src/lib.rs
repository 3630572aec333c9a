/// Resilience patterns for outbound gateway calls
///
/// This library provides the call policies used by the feed client:
/// - **Timeout**: Enforces time limits on every gateway call
/// - **Retry**: Exponential backoff with jitter for transient read failures
/// - **Cancellation**: Aborts in-flight calls when their owning session ends
/// - **Preset Configurations**: Pre-tuned settings for HTTP reads and writes
///
/// # Example: Read with timeout and retry
///
/// ```rust,no_run
/// use resilience::{presets, retry::with_retry, timeout::with_timeout_result, Elapsed};
///
/// #[derive(Debug)]
/// struct MyError;
///
/// impl std::fmt::Display for MyError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("my error")
///     }
/// }
///
/// impl From<Elapsed> for MyError {
///     fn from(_: Elapsed) -> Self {
///         MyError
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let config = presets::http_read_config();
///     let retry = config.retry.clone().unwrap_or_default();
///
///     let result = with_retry(retry, || {
///         with_timeout_result(config.timeout.duration, async {
///             // Your HTTP call here
///             Ok::<_, MyError>(())
///         })
///     })
///     .await;
/// }
/// ```
///
/// # Example: Cancellable call
///
/// ```rust,no_run
/// use resilience::Lifetime;
///
/// #[tokio::main]
/// async fn main() {
///     let lifetime = Lifetime::new();
///     let signal = lifetime.signal();
///
///     let result = signal.run(async { 42 }).await;
///     assert_eq!(result.ok(), Some(42));
/// }
/// ```

pub mod cancel;
pub mod presets;
pub mod retry;
pub mod timeout;

// Re-export main types for convenience
pub use cancel::{CancelSignal, Cancelled, Lifetime};
pub use presets::{http_read_config, http_write_config, ServiceConfig};
pub use retry::{with_retry, with_retry_if, RetryConfig};
pub use timeout::{with_timeout_result, Elapsed, TimeoutConfig};
