mod ids;
mod post;
pub mod roster;

pub use ids::{CommentId, PostId, ProvisionalIds};
pub use post::{Comment, ImageRef, ImageUpload, Post, PostDraft, SyncStatus, UserRef};
