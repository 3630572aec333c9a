//! Contract of the remote image/comment gateway.
//!
//! | Operation     | Method & Path            | Body                          |
//! |---------------|--------------------------|-------------------------------|
//! | Health        | `GET /`                  |                               |
//! | List images   | `GET /images`            |                               |
//! | Upload image  | `POST /images`           | multipart `base64_image`, `caption` |
//! | List comments | `GET /comments/{id}`     |                               |
//! | Add comment   | `POST /comments/{id}`    | JSON `{ "comment_text": .. }` |

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ImageUpload;

/// `GET /images` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageList {
    #[serde(default)]
    pub images: Vec<String>,
}

/// One entry of `GET /comments/{id}`. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment_text: String,
}

impl CommentRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            comment_text: text.into(),
        }
    }
}

/// `GET /comments/{id}` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentList {
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
}

/// `POST /comments/{id}` body
#[derive(Debug, Serialize)]
pub struct NewComment<'a> {
    pub comment_text: &'a str,
}

/// Whatever the gateway tells us about an accepted upload.
///
/// The response shape is not fixed; when it names the stored image the
/// provisional post can take over that identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default, alias = "filename", alias = "id")]
    pub image_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// Whether the gateway answers at all
    async fn health(&self) -> Result<bool>;

    async fn list_images(&self) -> Result<Vec<String>>;

    async fn upload_image(&self, upload: &ImageUpload, caption: &str) -> Result<UploadReceipt>;

    async fn list_comments(&self, image_id: &str) -> Result<Vec<CommentRecord>>;

    async fn add_comment(&self, image_id: &str, text: &str) -> Result<()>;

    /// URL the gateway serves the image bytes at
    fn image_url(&self, image_id: &str) -> String;
}
