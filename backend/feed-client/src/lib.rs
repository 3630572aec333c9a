pub mod attribution;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod mutation;
pub mod notify;
pub mod policy;
pub mod render;
pub mod session;
pub mod store;
pub mod sync;

pub use config::Config;
pub use error::{FeedError, Result};
pub use session::FeedSession;

// Re-export the pieces a UI needs to drive a session
pub use gateway::{FeedGateway, HttpGateway};
pub use models::{ImageUpload, Post, PostDraft, PostId, SyncStatus, UserRef};
pub use notify::{ChannelNotifier, LogNotifier, Notice, NoticeLevel, Notifier};
pub use store::{FeedState, FeedStore};
