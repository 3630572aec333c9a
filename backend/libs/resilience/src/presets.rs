/// Preset configurations for gateway calls
use crate::retry::RetryConfig;
use crate::timeout::TimeoutConfig;
use std::time::Duration;

/// Configuration bundle for a call type
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub timeout: TimeoutConfig,
    pub retry: Option<RetryConfig>,
}

impl ServiceConfig {
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = TimeoutConfig { duration };
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry = match (self.retry.take(), max_retries) {
            (_, 0) => None,
            (Some(retry), n) => Some(RetryConfig {
                max_retries: n,
                ..retry
            }),
            (None, n) => Some(RetryConfig {
                max_retries: n,
                ..Default::default()
            }),
        };
        self
    }

    /// Retry settings to hand to `with_retry`; a single attempt when unset.
    pub fn retry_or_none(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_else(RetryConfig::none)
    }
}

/// Idempotent HTTP reads (listings, comment threads)
///
/// - Timeout: 10s
/// - Retry: once, 200ms backoff with jitter
pub fn http_read_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(10),
        },
        retry: Some(RetryConfig {
            max_retries: 1,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: true,
        }),
    }
}

/// HTTP writes (uploads, new comments)
///
/// - Timeout: 10s
/// - No retry (avoid duplicate writes)
pub fn http_write_config() -> ServiceConfig {
    ServiceConfig {
        timeout: TimeoutConfig {
            duration: Duration::from_secs(10),
        },
        retry: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_read_config() {
        let config = http_read_config();
        assert_eq!(config.timeout.duration, Duration::from_secs(10));
        assert_eq!(config.retry.map(|r| r.max_retries), Some(1));
    }

    #[test]
    fn test_http_write_config() {
        let config = http_write_config();
        assert!(config.retry.is_none()); // No retry for writes
        assert_eq!(config.retry_or_none().max_retries, 0);
    }

    #[test]
    fn test_overrides() {
        let config = http_read_config()
            .with_timeout(Duration::from_secs(3))
            .with_max_retries(0);
        assert_eq!(config.timeout.duration, Duration::from_secs(3));
        assert!(config.retry.is_none());

        let config = http_write_config().with_max_retries(2);
        assert_eq!(config.retry.map(|r| r.max_retries), Some(2));
    }
}
