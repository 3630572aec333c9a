//! Display identities for content the gateway stores without an author.
//!
//! Two independent seams:
//! - [`AuthorAssignment`] picks an identity for a post or comment slot that
//!   has no known author.
//! - [`IdentityMerge`] carries a locally known author over to a freshly
//!   fetched comment. The gateway has no comment ids, so the shipped
//!   [`TextMatchMerge`] matches on exact text; two comments with the same
//!   text on one post can swap authors.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::FeedError;
use crate::gateway::CommentRecord;
use crate::models::{roster, Comment, CommentId, PostId, UserRef};

/// Position that needs an author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Post,
    Comment(usize),
}

pub trait AuthorAssignment: Send + Sync {
    fn assign(&self, post_id: &PostId, slot: Slot) -> UserRef;
}

/// Deterministic pick from the roster keyed on `(post id, slot)`.
/// The same post renders with the same authors on every load.
#[derive(Debug, Clone)]
pub struct SeededAssignment {
    roster: Vec<UserRef>,
}

impl SeededAssignment {
    pub fn new(roster: Vec<UserRef>) -> Self {
        Self {
            roster: non_empty(roster),
        }
    }
}

impl AuthorAssignment for SeededAssignment {
    fn assign(&self, post_id: &PostId, slot: Slot) -> UserRef {
        let mut hasher = Sha256::new();
        hasher.update(post_id.to_string().as_bytes());
        match slot {
            Slot::Post => hasher.update(b":post"),
            Slot::Comment(index) => hasher.update(format!(":comment:{index}").as_bytes()),
        }
        let digest = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let index = (u64::from_be_bytes(prefix) % self.roster.len() as u64) as usize;
        self.roster[index].clone()
    }
}

/// Fresh random pick on every call
#[derive(Debug, Clone)]
pub struct RandomAssignment {
    roster: Vec<UserRef>,
}

impl RandomAssignment {
    pub fn new(roster: Vec<UserRef>) -> Self {
        Self {
            roster: non_empty(roster),
        }
    }
}

impl AuthorAssignment for RandomAssignment {
    fn assign(&self, _post_id: &PostId, _slot: Slot) -> UserRef {
        let index = rand::thread_rng().gen_range(0..self.roster.len());
        self.roster[index].clone()
    }
}

fn non_empty(roster: Vec<UserRef>) -> Vec<UserRef> {
    if roster.is_empty() {
        vec![roster::session_user()]
    } else {
        roster
    }
}

/// Which [`AuthorAssignment`] to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    #[default]
    Seeded,
    Random,
}

impl AssignmentMode {
    pub fn build(self, roster: Vec<UserRef>) -> Arc<dyn AuthorAssignment> {
        match self {
            AssignmentMode::Seeded => Arc::new(SeededAssignment::new(roster)),
            AssignmentMode::Random => Arc::new(RandomAssignment::new(roster)),
        }
    }
}

impl FromStr for AssignmentMode {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seeded" => Ok(AssignmentMode::Seeded),
            "random" => Ok(AssignmentMode::Random),
            other => Err(FeedError::Validation(format!(
                "unknown author assignment '{other}', expected 'seeded' or 'random'"
            ))),
        }
    }
}

pub trait IdentityMerge: Send + Sync {
    /// Author to keep for a server comment, given the comments known locally
    fn carry_over(&self, local: &[Comment], server_text: &str) -> Option<UserRef>;
}

/// First local comment with exactly the same text wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMatchMerge;

impl IdentityMerge for TextMatchMerge {
    fn carry_over(&self, local: &[Comment], server_text: &str) -> Option<UserRef> {
        local
            .iter()
            .find(|c| c.text == server_text)
            .map(|c| c.author.clone())
    }
}

/// Rebuild a post's comment list from gateway records.
///
/// Ids are positional. Authors come from `merge` when the text is known
/// locally, otherwise from `fallback(index)`.
pub fn attribute_comments<F>(
    post_id: &PostId,
    records: &[CommentRecord],
    local: &[Comment],
    merge: &dyn IdentityMerge,
    fallback: F,
) -> Vec<Comment>
where
    F: Fn(usize) -> UserRef,
{
    records
        .iter()
        .enumerate()
        .map(|(index, record)| Comment {
            id: CommentId::new(post_id.clone(), index),
            author: merge
                .carry_over(local, &record.comment_text)
                .unwrap_or_else(|| fallback(index)),
            text: record.comment_text.clone(),
        })
        .collect()
}
