//! Feed synchronizer: pulls the authoritative image list and every image's
//! comment thread, then merges the result into the store.
//!
//! Comment threads are fetched concurrently, so a load takes as long as the
//! slowest single thread. A thread that fails or times out leaves its post
//! with no comments; a failing image list leaves the feed as it was.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::attribution::{attribute_comments, AuthorAssignment, IdentityMerge, Slot};
use crate::error::{FeedError, Result};
use crate::gateway::{CommentRecord, FeedGateway};
use crate::models::{Comment, CommentId, ImageRef, Post, PostId, SyncStatus};
use crate::policy::CallPolicy;
use crate::store::{FeedState, FeedStore};

pub struct FeedSynchronizer {
    gateway: Arc<dyn FeedGateway>,
    store: FeedStore,
    authors: Arc<dyn AuthorAssignment>,
    merge: Arc<dyn IdentityMerge>,
    policy: CallPolicy,
}

/// Comments fetched for one image; `None` when the fetch failed
struct FetchedImage {
    image_id: String,
    comments: Option<Vec<CommentRecord>>,
}

impl FeedSynchronizer {
    pub fn new(
        gateway: Arc<dyn FeedGateway>,
        store: FeedStore,
        authors: Arc<dyn AuthorAssignment>,
        merge: Arc<dyn IdentityMerge>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            gateway,
            store,
            authors,
            merge,
            policy,
        }
    }

    /// Load the feed and merge it into the store.
    ///
    /// Only cancellation is reported as an error; every gateway failure
    /// degrades to the last-known or partial feed.
    pub async fn load_feed(&self) -> Result<Arc<FeedState>> {
        // Anything that differs from this at merge time changed mid-flight.
        let baseline = self.store.snapshot();

        let image_ids = match self
            .policy
            .read("list_images", || self.gateway.list_images())
            .await
        {
            Ok(ids) => ids,
            Err(FeedError::Cancelled) => return Err(FeedError::Cancelled),
            Err(e) => {
                warn!(error = %e, "Image list unavailable, keeping last-known feed");
                return Ok(self.store.snapshot());
            }
        };

        let fetches = image_ids.into_iter().map(|image_id| async move {
            let result = self
                .policy
                .read("list_comments", || self.gateway.list_comments(&image_id))
                .await;
            (image_id, result)
        });

        let mut fetched = Vec::new();
        let mut failed = 0usize;
        for (image_id, result) in join_all(fetches).await {
            let comments = match result {
                Ok(records) => Some(records),
                Err(FeedError::Cancelled) => return Err(FeedError::Cancelled),
                Err(e) => {
                    failed += 1;
                    warn!(image_id = %image_id, error = %e, "Comment fetch failed, showing no comments");
                    None
                }
            };
            fetched.push(FetchedImage { image_id, comments });
        }

        self.store.update(|posts| {
            *posts = self.merge_into(&*posts, &baseline, fetched);
            true
        });

        let snapshot = self.store.snapshot();
        info!(
            posts = snapshot.len(),
            failed_threads = failed,
            version = snapshot.version,
            "Feed synchronized"
        );
        Ok(snapshot)
    }

    /// Build the next post list from the latest local list and a fetch.
    ///
    /// Local posts the gateway did not list stay on top while they are still
    /// uploading or were created or confirmed after `baseline` was taken;
    /// the listing may simply predate them. Everything else comes from the
    /// gateway, in gateway order, keeping local captions and authors for ids
    /// that were already known. Comments added locally after `baseline` and
    /// missing from the fetched thread are kept at its end.
    fn merge_into(
        &self,
        current: &[Arc<Post>],
        baseline: &FeedState,
        fetched: Vec<FetchedImage>,
    ) -> Vec<Arc<Post>> {
        let known: HashMap<&PostId, &Arc<Post>> = current.iter().map(|p| (&p.id, p)).collect();
        let listed: HashSet<PostId> = fetched
            .iter()
            .map(|f| PostId::server(f.image_id.as_str()))
            .collect();

        let mut next: Vec<Arc<Post>> = current
            .iter()
            .filter(|p| !listed.contains(&p.id))
            .filter(|p| p.status == SyncStatus::Pending || changed_since(p, baseline))
            .cloned()
            .collect();
        let mut seen: HashSet<PostId> = next.iter().map(|p| p.id.clone()).collect();

        for FetchedImage { image_id, comments } in fetched {
            let id = PostId::server(image_id.as_str());
            if !seen.insert(id.clone()) {
                debug!(image_id = %image_id, "Duplicate image id in listing, skipped");
                continue;
            }

            let local = known.get(&id);
            let local_comments = local.map(|p| p.comments.as_slice()).unwrap_or(&[]);
            let mut comments = match &comments {
                Some(records) => {
                    attribute_comments(&id, records, local_comments, self.merge.as_ref(), |i| {
                        self.authors.assign(&id, Slot::Comment(i))
                    })
                }
                None => Vec::new(),
            };
            if let Some(local) = local {
                let server = comments.len();
                for comment in late_comments(local, baseline, comments.as_slice()) {
                    let index = comments.len();
                    comments.push(Comment {
                        id: CommentId::new(id.clone(), index),
                        ..comment
                    });
                }
                if comments.len() > server {
                    debug!(image_id = %image_id, kept = comments.len() - server, "Kept comments newer than the fetch");
                }
            }

            next.push(Arc::new(Post {
                author: local
                    .map(|p| p.author.clone())
                    .unwrap_or_else(|| self.authors.assign(&id, Slot::Post)),
                image: ImageRef::Url(self.gateway.image_url(&image_id)),
                caption: local.map(|p| p.caption.clone()).unwrap_or_default(),
                comments,
                status: SyncStatus::Synced,
                id,
            }));
        }

        next
    }
}

/// Whether `post` was added or replaced after `baseline` was taken
fn changed_since(post: &Arc<Post>, baseline: &FeedState) -> bool {
    baseline
        .find(&post.id)
        .map_or(true, |before| !Arc::ptr_eq(before, post))
}

/// Comments appended to `local` after `baseline` that the fetched thread
/// does not contain yet.
fn late_comments(local: &Arc<Post>, baseline: &FeedState, fetched: &[Comment]) -> Vec<Comment> {
    if !changed_since(local, baseline) {
        return Vec::new();
    }
    let before = baseline.find(&local.id).map(|p| p.comments.as_slice()).unwrap_or(&[]);
    if local.comments.len() <= before.len() {
        return Vec::new();
    }

    let count = |comments: &[Comment], text: &str| comments.iter().filter(|c| c.text == text).count();
    let mut late: Vec<Comment> = Vec::new();
    for comment in &local.comments[before.len()..] {
        let already = count(before, &comment.text) + count(late.as_slice(), &comment.text);
        if count(fetched, &comment.text) <= already {
            late.push(comment.clone());
        }
    }
    late
}
