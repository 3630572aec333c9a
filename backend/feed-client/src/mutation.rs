//! Optimistic mutation engine.
//!
//! New posts and comments land in the store before the gateway has seen
//! them. A confirmed write is reconciled with what the gateway reports; a
//! rejected write is rolled back and the user is told.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::attribution::{attribute_comments, IdentityMerge};
use crate::error::{FeedError, Result};
use crate::gateway::{FeedGateway, UploadReceipt};
use crate::models::{
    Comment, CommentId, ImageRef, Post, PostDraft, PostId, ProvisionalIds, SyncStatus, UserRef,
};
use crate::notify::{Notice, Notifier};
use crate::policy::CallPolicy;
use crate::store::FeedStore;

pub struct MutationEngine {
    gateway: Arc<dyn FeedGateway>,
    store: FeedStore,
    merge: Arc<dyn IdentityMerge>,
    notifier: Arc<dyn Notifier>,
    policy: CallPolicy,
    session_user: UserRef,
    ids: ProvisionalIds,
}

impl MutationEngine {
    pub fn new(
        gateway: Arc<dyn FeedGateway>,
        store: FeedStore,
        merge: Arc<dyn IdentityMerge>,
        notifier: Arc<dyn Notifier>,
        policy: CallPolicy,
        session_user: UserRef,
    ) -> Self {
        Self {
            gateway,
            store,
            merge,
            notifier,
            policy,
            session_user,
            ids: ProvisionalIds::new(),
        }
    }

    pub fn session_user(&self) -> &UserRef {
        &self.session_user
    }

    /// Create a post.
    ///
    /// The provisional post is at the top of the feed before the upload is
    /// even started. Returns the id the post ends up with.
    pub async fn add_post(&self, draft: PostDraft) -> Result<PostId> {
        let (upload, caption) = match draft.into_parts() {
            Ok(parts) => parts,
            Err(e) => {
                self.notifier.notify(
                    Notice::warning("Please add an image and caption")
                        .with_description("Both fields are required to create a post."),
                );
                return Err(e);
            }
        };

        let provisional = self.ids.next();
        self.store.prepend(Post {
            id: provisional.clone(),
            author: self.session_user.clone(),
            image: ImageRef::Inline(upload.to_data_url()),
            caption: caption.clone(),
            comments: Vec::new(),
            status: SyncStatus::Pending,
        });
        debug!(post_id = %provisional, file_name = %upload.file_name, "Provisional post added");

        let receipt = self
            .policy
            .write("upload_image", || self.gateway.upload_image(&upload, &caption))
            .await;

        match receipt {
            Ok(receipt) => {
                let id = self.reconcile_post(&provisional, receipt);
                info!(post_id = %id, "Post created");
                self.notifier.notify(
                    Notice::info("Post created!")
                        .with_description("Your post has been added to the feed."),
                );
                Ok(id)
            }
            Err(e) => {
                self.store.remove(&provisional);
                warn!(post_id = %provisional, error = %e, "Upload failed, provisional post rolled back");
                if !matches!(e, FeedError::Cancelled) {
                    self.notifier.notify(
                        Notice::error("Could not create post").with_description(e.to_string()),
                    );
                }
                Err(e)
            }
        }
    }

    /// Swap the provisional post for its confirmed form.
    ///
    /// With a server id the post is replaced in place; if that id is already
    /// listed (a sync got there first) the listed post takes over the caption
    /// and the provisional one goes away. Without an id the post stays
    /// provisional until the next full sync replaces it.
    fn reconcile_post(&self, provisional: &PostId, receipt: UploadReceipt) -> PostId {
        let Some(image_id) = receipt.image_id.filter(|id| !id.trim().is_empty()) else {
            self.store.replace_post(provisional, |p| Post {
                status: SyncStatus::Unreconciled,
                ..p.clone()
            });
            return provisional.clone();
        };

        let server_id = PostId::server(image_id.as_str());
        let image = ImageRef::Url(self.gateway.image_url(&image_id));

        self.store.update(|posts| {
            let Some(index) = posts.iter().position(|p| &p.id == provisional) else {
                return false;
            };
            let local = posts.remove(index);

            match posts.iter().position(|p| p.id == server_id) {
                Some(existing) => {
                    let listed = &posts[existing];
                    posts[existing] = Arc::new(Post {
                        author: local.author.clone(),
                        caption: local.caption.clone(),
                        ..(**listed).clone()
                    });
                }
                None => posts.insert(
                    index,
                    Arc::new(Post {
                        id: server_id.clone(),
                        image,
                        status: SyncStatus::Synced,
                        ..(*local).clone()
                    }),
                ),
            }
            true
        });

        server_id
    }

    /// Comment on a post.
    ///
    /// The comment shows up immediately under the session user. Once the
    /// gateway accepts it, the whole thread is re-read and rebuilt, keeping
    /// local authors where the text matches.
    pub async fn add_comment(&self, post_id: &PostId, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            self.notifier
                .notify(Notice::warning("Type something to comment!"));
            return Err(FeedError::Validation("comment text is empty".to_string()));
        }

        if self.store.find(post_id).is_none() {
            return Err(FeedError::PostNotFound(post_id.to_string()));
        }
        let Some(image_id) = post_id.as_server() else {
            self.notifier.notify(
                Notice::warning("Post is still uploading")
                    .with_description("Comments can be added once the post is confirmed."),
            );
            return Err(FeedError::Validation(format!(
                "post {post_id} is not confirmed yet"
            )));
        };

        let appended = self.store.update(|posts| {
            let Some(index) = posts.iter().position(|p| &p.id == post_id) else {
                return false;
            };
            let post = &posts[index];
            let mut comments = post.comments.clone();
            comments.push(Comment {
                id: CommentId::new(post_id.clone(), comments.len()),
                author: self.session_user.clone(),
                text: text.to_string(),
            });
            posts[index] = Arc::new(post.with_comments(comments));
            true
        });
        if !appended {
            return Err(FeedError::PostNotFound(post_id.to_string()));
        }

        if let Err(e) = self
            .policy
            .write("add_comment", || self.gateway.add_comment(image_id, text))
            .await
        {
            self.rollback_comment(post_id, text);
            warn!(post_id = %post_id, error = %e, "Comment rejected, optimistic comment rolled back");
            if !matches!(e, FeedError::Cancelled) {
                self.notifier.notify(
                    Notice::error("Could not post comment").with_description(e.to_string()),
                );
            }
            return Err(e);
        }

        match self
            .policy
            .read("list_comments", || self.gateway.list_comments(image_id))
            .await
        {
            Ok(records) => {
                let replaced = self.store.replace_post(post_id, |post| {
                    let comments = attribute_comments(
                        post_id,
                        &records,
                        &post.comments,
                        self.merge.as_ref(),
                        |_| self.session_user.clone(),
                    );
                    post.with_comments(comments)
                });
                if !replaced {
                    debug!(post_id = %post_id, "Post left the feed before its thread was refreshed");
                }
            }
            Err(FeedError::Cancelled) => return Err(FeedError::Cancelled),
            Err(e) => {
                // The write went through; keep the optimistic thread.
                warn!(post_id = %post_id, error = %e, "Comment thread refresh failed");
            }
        }

        Ok(())
    }

    /// Drop the newest optimistic comment with this text by the session user
    fn rollback_comment(&self, post_id: &PostId, text: &str) {
        self.store.update(|posts| {
            let Some(index) = posts.iter().position(|p| &p.id == post_id) else {
                return false;
            };
            let post = &posts[index];
            let Some(position) = post
                .comments
                .iter()
                .rposition(|c| c.text == text && c.author == self.session_user)
            else {
                return false;
            };

            let mut comments = post.comments.clone();
            comments.remove(position);
            for (i, comment) in comments.iter_mut().enumerate().skip(position) {
                comment.id = CommentId::new(post_id.clone(), i);
            }
            posts[index] = Arc::new(post.with_comments(comments));
            true
        });
    }
}
