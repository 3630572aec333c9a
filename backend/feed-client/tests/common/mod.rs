//! Scripted in-memory gateway for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use feed_client::config::Config;
use feed_client::error::{FeedError, Result};
use feed_client::gateway::{CommentRecord, FeedGateway, UploadReceipt};
use feed_client::{ChannelNotifier, FeedSession, ImageUpload, Notice};

#[derive(Default)]
struct Script {
    images: Vec<String>,
    comments: HashMap<String, Vec<String>>,
    hung_threads: HashSet<String>,
    failing_threads: HashSet<String>,
    list_fails: bool,
    upload_fails: bool,
    upload_id: Option<String>,
    comment_fails: bool,
    calls: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeGateway {
    script: Arc<Mutex<Script>>,
    upload_gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, id: &str, comments: &[&str]) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script.images.push(id.to_string());
            script
                .comments
                .insert(id.to_string(), comments.iter().map(|c| c.to_string()).collect());
        }
        self
    }

    /// `/comments/{id}` never answers
    pub fn hang_thread(self, id: &str) -> Self {
        self.script.lock().unwrap().hung_threads.insert(id.to_string());
        self
    }

    /// `/comments/{id}` answers 500
    pub fn fail_thread(self, id: &str) -> Self {
        self.script.lock().unwrap().failing_threads.insert(id.to_string());
        self
    }

    pub fn set_thread_hung(&self, id: &str, hung: bool) {
        let mut script = self.script.lock().unwrap();
        if hung {
            script.hung_threads.insert(id.to_string());
        } else {
            script.hung_threads.remove(id);
        }
    }

    pub fn set_thread_failing(&self, id: &str, failing: bool) {
        let mut script = self.script.lock().unwrap();
        if failing {
            script.failing_threads.insert(id.to_string());
        } else {
            script.failing_threads.remove(id);
        }
    }

    pub fn fail_listing(&self, fails: bool) {
        self.script.lock().unwrap().list_fails = fails;
    }

    pub fn fail_uploads(self) -> Self {
        self.script.lock().unwrap().upload_fails = true;
        self
    }

    pub fn fail_comments(self) -> Self {
        self.script.lock().unwrap().comment_fails = true;
        self
    }

    /// Id reported back by uploads; `None` reports nothing
    pub fn upload_id(self, id: Option<&str>) -> Self {
        self.script.lock().unwrap().upload_id = id.map(str::to_string);
        self
    }

    /// Hold uploads until the returned handle is notified
    pub fn gate_uploads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.upload_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Make an image appear server-side, as another client would
    pub fn publish(&self, id: &str, comments: &[&str]) {
        let mut script = self.script.lock().unwrap();
        if !script.images.iter().any(|i| i == id) {
            script.images.push(id.to_string());
        }
        script
            .comments
            .insert(id.to_string(), comments.iter().map(|c| c.to_string()).collect());
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.script.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl FeedGateway for FakeGateway {
    async fn health(&self) -> Result<bool> {
        self.record("health".into());
        Ok(true)
    }

    async fn list_images(&self) -> Result<Vec<String>> {
        self.record("list_images".into());
        let script = self.script.lock().unwrap();
        if script.list_fails {
            return Err(FeedError::Transport("connection refused".into()));
        }
        Ok(script.images.clone())
    }

    async fn upload_image(&self, upload: &ImageUpload, caption: &str) -> Result<UploadReceipt> {
        self.record(format!("upload_image {} {caption}", upload.file_name));
        let gate = self.upload_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut script = self.script.lock().unwrap();
        if script.upload_fails {
            return Err(FeedError::Gateway {
                status: 500,
                body: "Image upload failed".into(),
            });
        }
        let image_id = script.upload_id.clone();
        if let Some(id) = &image_id {
            if !script.images.contains(id) {
                script.images.insert(0, id.clone());
            }
            script.comments.entry(id.clone()).or_default();
        }
        Ok(UploadReceipt {
            image_id,
            message: Some("Image uploaded successfully".into()),
        })
    }

    async fn list_comments(&self, image_id: &str) -> Result<Vec<CommentRecord>> {
        self.record(format!("list_comments {image_id}"));
        let (hung, failing, comments) = {
            let script = self.script.lock().unwrap();
            (
                script.hung_threads.contains(image_id),
                script.failing_threads.contains(image_id),
                script.comments.get(image_id).cloned().unwrap_or_default(),
            )
        };
        if hung {
            std::future::pending::<()>().await;
        }
        if failing {
            return Err(FeedError::Gateway {
                status: 500,
                body: "database is locked".into(),
            });
        }
        Ok(comments.into_iter().map(CommentRecord::new).collect())
    }

    async fn add_comment(&self, image_id: &str, text: &str) -> Result<()> {
        self.record(format!("add_comment {image_id} {text}"));
        let mut script = self.script.lock().unwrap();
        if script.comment_fails {
            return Err(FeedError::Transport("connection reset".into()));
        }
        script
            .comments
            .entry(image_id.to_string())
            .or_default()
            .push(text.to_string());
        Ok(())
    }

    fn image_url(&self, image_id: &str) -> String {
        format!("http://gateway.test/images/{image_id}")
    }
}

/// Config with short timeouts and no read retry delay worth waiting for
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.gateway.request_timeout = Duration::from_millis(200);
    config.gateway.read_retries = 0;
    config
}

pub fn session(
    config: &Config,
    gateway: &FakeGateway,
) -> (FeedSession, tokio::sync::mpsc::UnboundedReceiver<Notice>) {
    let (notifier, notices) = ChannelNotifier::new();
    let session = FeedSession::with_gateway(config, Arc::new(gateway.clone()), Arc::new(notifier));
    (session, notices)
}

pub fn png(name: &str) -> ImageUpload {
    ImageUpload::new(name, b"\x89PNG\r\n\x1a\n".to_vec())
}
