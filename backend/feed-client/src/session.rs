//! Feed session: wires the store, synchronizer and mutation engine to one
//! gateway and one lifetime.
//!
//! Dropping the session (or calling [`FeedSession::shutdown`]) cancels every
//! gateway call still in flight. Cancelled calls resolve with
//! [`FeedError::Cancelled`] and leave the store untouched.

use resilience::Lifetime;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::attribution::{IdentityMerge, TextMatchMerge};
use crate::config::Config;
use crate::error::Result;
use crate::gateway::{FeedGateway, HttpGateway};
use crate::models::{roster, PostDraft, PostId, UserRef};
use crate::mutation::MutationEngine;
use crate::notify::Notifier;
use crate::policy::CallPolicy;
use crate::store::{FeedState, FeedStore};
use crate::sync::FeedSynchronizer;

pub struct FeedSession {
    store: FeedStore,
    gateway: Arc<dyn FeedGateway>,
    synchronizer: FeedSynchronizer,
    mutations: MutationEngine,
    policy: CallPolicy,
    lifetime: Lifetime,
}

impl FeedSession {
    /// Session talking HTTP to `config.gateway.base_url`
    pub fn connect(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let gateway = HttpGateway::new(&config.gateway.base_url, config.gateway.request_timeout)?;
        info!(base_url = %gateway.base_url(), "Feed session connecting");
        Ok(Self::with_gateway(config, Arc::new(gateway), notifier))
    }

    pub fn with_gateway(
        config: &Config,
        gateway: Arc<dyn FeedGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let lifetime = Lifetime::new();
        let policy = CallPolicy::new(config.read_policy(), config.write_policy(), lifetime.signal());

        let initial = if config.feed.seed_demo_posts {
            roster::demo_posts()
        } else {
            Vec::new()
        };
        let store = FeedStore::new(initial);
        let merge: Arc<dyn IdentityMerge> = Arc::new(TextMatchMerge);

        let synchronizer = FeedSynchronizer::new(
            gateway.clone(),
            store.clone(),
            config.feed.author_assignment.build(roster::mock_users()),
            merge.clone(),
            policy.clone(),
        );
        let mutations = MutationEngine::new(
            gateway.clone(),
            store.clone(),
            merge,
            notifier,
            policy.clone(),
            config.feed.session_user.clone(),
        );

        Self {
            store,
            gateway,
            synchronizer,
            mutations,
            policy,
            lifetime,
        }
    }

    pub async fn load_feed(&self) -> Result<Arc<FeedState>> {
        self.synchronizer.load_feed().await
    }

    pub async fn add_post(&self, draft: PostDraft) -> Result<PostId> {
        self.mutations.add_post(draft).await
    }

    pub async fn add_comment(&self, post_id: &PostId, text: &str) -> Result<()> {
        self.mutations.add_comment(post_id, text).await
    }

    /// Whether the gateway answers at all
    pub async fn health(&self) -> Result<bool> {
        self.policy.read("health", || self.gateway.health()).await
    }

    pub fn snapshot(&self) -> Arc<FeedState> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FeedState>> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    pub fn session_user(&self) -> &UserRef {
        self.mutations.session_user()
    }

    pub fn is_shut_down(&self) -> bool {
        self.lifetime.is_cancelled()
    }

    /// Cancel all in-flight gateway calls; later calls fail immediately
    pub fn shutdown(&self) {
        if !self.lifetime.is_cancelled() {
            info!("Feed session shutting down");
        }
        self.lifetime.cancel();
    }
}
