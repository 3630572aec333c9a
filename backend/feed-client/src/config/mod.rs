use anyhow::{Context, Result};
use resilience::{http_read_config, http_write_config, ServiceConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::attribution::AssignmentMode;
use crate::models::{roster, UserRef};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub author_assignment: AssignmentMode,
    #[serde(default = "roster::session_user")]
    pub session_user: UserRef,
    /// Start with the demo posts instead of an empty feed
    #[serde(default)]
    pub seed_demo_posts: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            author_assignment: AssignmentMode::default(),
            session_user: roster::session_user(),
            seed_demo_posts: false,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            request_timeout: default_request_timeout(),
            read_retries: default_read_retries(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                env: "development".to_string(),
                log_level: "info".to_string(),
            },
            gateway: GatewayConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset keys take their defaults.
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_user = roster::session_user();
        let session_user = match var("SESSION_USER_NAME") {
            Some(name) if !name.trim().is_empty() => {
                let user = UserRef::new(name.trim());
                match var("SESSION_USER_AVATAR") {
                    Some(avatar) if !avatar.trim().is_empty() => user.with_avatar(avatar.trim()),
                    _ => user,
                }
            }
            _ => default_user,
        };

        Ok(Config {
            app: AppConfig {
                env: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
                log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
            gateway: GatewayConfig {
                base_url: var("GATEWAY_URL").unwrap_or_else(default_gateway_url),
                request_timeout: Duration::from_secs(
                    var("GATEWAY_TIMEOUT_SECS")
                        .unwrap_or_else(|| "10".to_string())
                        .parse()
                        .context("GATEWAY_TIMEOUT_SECS must be a whole number of seconds")?,
                ),
                read_retries: var("GATEWAY_READ_RETRIES")
                    .unwrap_or_else(|| "1".to_string())
                    .parse()
                    .context("GATEWAY_READ_RETRIES must be a non-negative integer")?,
            },
            feed: FeedConfig {
                author_assignment: var("AUTHOR_ASSIGNMENT")
                    .unwrap_or_else(|| "seeded".to_string())
                    .parse()
                    .context("AUTHOR_ASSIGNMENT must be `seeded` or `random`")?,
                session_user,
                seed_demo_posts: var("SEED_DEMO_POSTS")
                    .unwrap_or_else(|| "false".to_string())
                    .parse()
                    .context("SEED_DEMO_POSTS must be `true` or `false`")?,
            },
        })
    }

    /// Policy for idempotent gateway calls
    pub fn read_policy(&self) -> ServiceConfig {
        http_read_config()
            .with_timeout(self.gateway.request_timeout)
            .with_max_retries(self.gateway.read_retries)
    }

    /// Policy for uploads and comment posts; never retried
    pub fn write_policy(&self) -> ServiceConfig {
        http_write_config().with_timeout(self.gateway.request_timeout)
    }
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_read_retries() -> u32 {
    1
}
