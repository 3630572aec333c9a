use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use mime::Mime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ids::{CommentId, PostId};
use crate::error::{FeedError, Result};

/// Display identity of an author. There is no identity beyond the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}

/// Where the post image comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageRef {
    /// Served by the gateway at `/images/{id}`
    Url(String),
    /// `data:` URL of a locally picked image that is not confirmed yet
    Inline(String),
}

impl ImageRef {
    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Url(url) | ImageRef::Inline(url) => url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Upload in flight
    Pending,
    /// Upload accepted, but the gateway did not say which image it became
    Unreconciled,
    /// Identity confirmed by the gateway
    Synced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: UserRef,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: UserRef,
    pub image: ImageRef,
    pub caption: String,
    pub comments: Vec<Comment>,
    pub status: SyncStatus,
}

impl Post {
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Copy of this post with its comment list swapped out
    pub fn with_comments(&self, comments: Vec<Comment>) -> Post {
        Post {
            comments,
            ..self.clone()
        }
    }
}

/// Image picked for a new post
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_image_type(&file_name);
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                FeedError::Validation(format!("{} is not a file", path.display()))
            })?;

        Ok(Self::new(file_name, bytes))
    }

    /// Transport form sent to the gateway
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Local display form used until the gateway serves the image
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.to_base64())
    }
}

fn guess_image_type(file_name: &str) -> Mime {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp"
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Contents of the "new post" form
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub image: Option<ImageUpload>,
    pub caption: String,
}

impl PostDraft {
    pub fn new(image: ImageUpload, caption: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            caption: caption.into(),
        }
    }

    /// Both an image and a non-blank caption are required.
    /// Returns the image and the trimmed caption.
    pub fn into_parts(self) -> Result<(ImageUpload, String)> {
        let caption = self.caption.trim().to_string();
        match self.image {
            Some(image) if !caption.is_empty() => Ok((image, caption)),
            Some(_) => Err(FeedError::Validation("caption is required".to_string())),
            None => Err(FeedError::Validation("image is required".to_string())),
        }
    }
}
