/// Error types for feed-client
use resilience::{Cancelled, Elapsed};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Gateway returned {status}: {body}")]
    Gateway { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Gateway call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// Check if a read that failed this way is worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Gateway { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<Elapsed> for FeedError {
    fn from(e: Elapsed) -> Self {
        FeedError::Timeout(e.0)
    }
}

impl From<Cancelled> for FeedError {
    fn from(_: Cancelled) -> Self {
        FeedError::Cancelled
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FeedError::Decode(e.to_string())
        } else {
            FeedError::Transport(e.to_string())
        }
    }
}

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
