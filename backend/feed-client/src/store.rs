//! In-memory feed model shared by the synchronizer, the mutation engine and
//! whatever renders the feed.
//!
//! All writes go through [`FeedStore::update`], which runs the closure
//! against the latest state under the channel lock. Handlers must never
//! compute the next state from a snapshot they captured earlier.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::models::{Post, PostId};

/// One published version of the feed
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub posts: Vec<Arc<Post>>,
    pub version: u64,
}

impl FeedState {
    pub fn find(&self, id: &PostId) -> Option<&Arc<Post>> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }
}

#[derive(Clone)]
pub struct FeedStore {
    tx: Arc<watch::Sender<Arc<FeedState>>>,
}

impl FeedStore {
    pub fn new(initial: Vec<Post>) -> Self {
        let state = FeedState {
            posts: initial.into_iter().map(Arc::new).collect(),
            version: 0,
        };
        let (tx, _rx) = watch::channel(Arc::new(state));
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Arc<FeedState> {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every published version
    pub fn subscribe(&self) -> watch::Receiver<Arc<FeedState>> {
        self.tx.subscribe()
    }

    pub fn find(&self, id: &PostId) -> Option<Arc<Post>> {
        self.tx.borrow().find(id).cloned()
    }

    /// Apply `f` to the latest post list. `f` returns whether it changed
    /// anything; only changes bump the version and wake subscribers.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Vec<Arc<Post>>) -> bool,
    {
        self.tx.send_if_modified(|state| {
            let next = Arc::make_mut(state);
            let changed = f(&mut next.posts);
            if changed {
                next.version += 1;
            }
            changed
        })
    }

    /// Put a post at the front. Refused if the id is already listed.
    pub fn prepend(&self, post: Post) -> bool {
        let id = post.id.clone();
        let added = self.update(|posts| {
            if posts.iter().any(|p| p.id == post.id) {
                return false;
            }
            posts.insert(0, Arc::new(post));
            true
        });
        if !added {
            debug!(post_id = %id, "Refusing duplicate post id");
        }
        added
    }

    pub fn remove(&self, id: &PostId) -> Option<Arc<Post>> {
        let mut removed = None;
        self.update(|posts| match posts.iter().position(|p| &p.id == id) {
            Some(index) => {
                removed = Some(posts.remove(index));
                true
            }
            None => false,
        });
        removed
    }

    /// Swap one post for `f(old)`, in place. Every other post keeps its `Arc`.
    pub fn replace_post<F>(&self, id: &PostId, f: F) -> bool
    where
        F: FnOnce(&Post) -> Post,
    {
        self.update(|posts| match posts.iter().position(|p| &p.id == id) {
            Some(index) => {
                let next = f(&posts[index]);
                posts[index] = Arc::new(next);
                true
            }
            None => false,
        })
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
