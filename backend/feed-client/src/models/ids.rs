use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::FeedError;

const PROVISIONAL_PREFIX: &str = "local-";

/// Identity of a post in the local feed.
///
/// Synced posts carry the gateway's image identifier. Posts created locally
/// and not yet confirmed carry a millisecond timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PostId {
    Server(String),
    Provisional(i64),
}

impl PostId {
    pub fn server(id: impl Into<String>) -> Self {
        PostId::Server(id.into())
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, PostId::Provisional(_))
    }

    /// Gateway image identifier, if the gateway knows this post
    pub fn as_server(&self) -> Option<&str> {
        match self {
            PostId::Server(id) => Some(id),
            PostId::Provisional(_) => None,
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Server(id) => f.write_str(id),
            PostId::Provisional(ms) => write!(f, "{}{}", PROVISIONAL_PREFIX, ms),
        }
    }
}

impl FromStr for PostId {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FeedError::Validation("post id is empty".to_string()));
        }

        if let Some(ms) = s
            .strip_prefix(PROVISIONAL_PREFIX)
            .and_then(|rest| rest.parse::<i64>().ok())
        {
            return Ok(PostId::Provisional(ms));
        }

        Ok(PostId::Server(s.to_string()))
    }
}

/// Positional comment identity: `(post, index)`.
///
/// The gateway returns no comment identifiers, so this is only stable for
/// as long as the comment list of the post is not rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId {
    pub post: PostId,
    pub index: usize,
}

impl CommentId {
    pub fn new(post: PostId, index: usize) -> Self {
        Self { post, index }
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.post, self.index)
    }
}

/// Timestamp-based generator for provisional post ids.
///
/// Strictly increasing, so two posts created within the same millisecond
/// still get distinct ids.
#[derive(Debug, Default)]
pub struct ProvisionalIds {
    last: AtomicI64,
}

impl ProvisionalIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> PostId {
        let now = Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return PostId::Provisional(candidate),
                Err(actual) => current = actual,
            }
        }
    }
}
