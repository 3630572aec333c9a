//! reqwest implementation of the gateway contract

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use std::time::Duration;
use tracing::{debug, info};

use super::{CommentList, CommentRecord, FeedGateway, ImageList, NewComment, UploadReceipt};
use crate::error::{FeedError, Result};
use crate::models::ImageUpload;

/// HTTP client for the image/comment gateway
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Transport(format!("Failed to create HTTP client: {e}")))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        info!(base_url = %base_url, "Gateway client initialized");

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn comments_url(&self, image_id: &str) -> String {
        format!("{}/comments/{}", self.base_url, urlencoding::encode(image_id))
    }

    /// Turn non-2xx answers into `FeedError::Gateway`
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(FeedError::Gateway {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl FeedGateway for HttpGateway {
    async fn health(&self) -> Result<bool> {
        match self.client.get(format!("{}/", self.base_url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                debug!(error = %e, "Gateway health probe failed");
                Ok(false)
            }
        }
    }

    async fn list_images(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/images", self.base_url))
            .send()
            .await?;
        let list: ImageList = Self::ensure_success(response).await?.json().await?;

        debug!(count = list.images.len(), "Listed gateway images");
        Ok(list.images)
    }

    async fn upload_image(&self, upload: &ImageUpload, caption: &str) -> Result<UploadReceipt> {
        let form = multipart::Form::new()
            .text("base64_image", upload.to_base64())
            .text("caption", caption.to_string());

        let response = self
            .client
            .post(format!("{}/images", self.base_url))
            .multipart(form)
            .send()
            .await?;
        let body = Self::ensure_success(response).await?.text().await?;

        // The upload answer is informational; an unexpected shape is not an error.
        let receipt = serde_json::from_str::<UploadReceipt>(&body).unwrap_or_default();
        debug!(image_id = ?receipt.image_id, file_name = %upload.file_name, "Image uploaded");
        Ok(receipt)
    }

    async fn list_comments(&self, image_id: &str) -> Result<Vec<CommentRecord>> {
        let response = self.client.get(self.comments_url(image_id)).send().await?;
        let list: CommentList = Self::ensure_success(response).await?.json().await?;
        Ok(list.comments)
    }

    async fn add_comment(&self, image_id: &str, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.comments_url(image_id))
            .json(&NewComment { comment_text: text })
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    fn image_url(&self, image_id: &str) -> String {
        format!("{}/images/{}", self.base_url, urlencoding::encode(image_id))
    }
}
