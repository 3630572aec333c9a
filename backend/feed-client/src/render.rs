//! Plain-text and JSON views of a feed snapshot, used by the CLI.

use serde::Serialize;
use std::fmt::Write;

use crate::models::{ImageRef, Post, SyncStatus};
use crate::store::FeedState;

const INLINE_PREVIEW: usize = 32;

pub fn render_text(state: &FeedState) -> String {
    if state.is_empty() {
        return "There are no posts yet.\n".to_string();
    }

    let mut out = String::new();
    for post in &state.posts {
        render_post(&mut out, post);
    }
    out
}

fn render_post(out: &mut String, post: &Post) {
    let status = match post.status {
        SyncStatus::Synced => "",
        SyncStatus::Pending => " (uploading)",
        SyncStatus::Unreconciled => " (awaiting sync)",
    };
    let _ = writeln!(out, "[{}]{} {}", post.id, status, post.author.name);
    let _ = writeln!(out, "  image: {}", image_label(&post.image));
    if !post.caption.is_empty() {
        let _ = writeln!(out, "  {}", post.caption);
    }
    let _ = writeln!(out, "  {} comment(s)", post.comment_count());
    for comment in &post.comments {
        let _ = writeln!(out, "    {}: {}", comment.author.name, comment.text);
    }
    out.push('\n');
}

fn image_label(image: &ImageRef) -> String {
    match image {
        ImageRef::Url(url) => url.clone(),
        ImageRef::Inline(data) => {
            let head: String = data.chars().take(INLINE_PREVIEW).collect();
            if head.len() < data.len() {
                format!("{head}... ({} bytes inline)", data.len())
            } else {
                head
            }
        }
    }
}

#[derive(Serialize)]
struct FeedView<'a> {
    version: u64,
    posts: Vec<&'a Post>,
}

pub fn render_json(state: &FeedState) -> serde_json::Result<String> {
    let view = FeedView {
        version: state.version,
        posts: state.posts.iter().map(|p| p.as_ref()).collect(),
    };
    serde_json::to_string_pretty(&view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roster;
    use crate::models::{PostId, UserRef};
    use std::sync::Arc;

    fn state(posts: Vec<Post>) -> FeedState {
        FeedState {
            posts: posts.into_iter().map(Arc::new).collect(),
            version: 3,
        }
    }

    #[test]
    fn test_empty_feed_message() {
        assert_eq!(render_text(&FeedState::default()), "There are no posts yet.\n");
    }

    #[test]
    fn test_inline_images_are_truncated() {
        let data = format!("data:image/png;base64,{}", "A".repeat(400));
        let text = render_text(&state(vec![Post {
            id: PostId::Provisional(7),
            author: UserRef::new("Michał Pstrąg"),
            image: ImageRef::Inline(data.clone()),
            caption: "hello".into(),
            comments: Vec::new(),
            status: SyncStatus::Pending,
        }]));

        assert!(text.contains("[local-7] (uploading) Michał Pstrąg"));
        assert!(text.contains("bytes inline"));
        assert!(!text.contains(&data));
    }

    #[test]
    fn test_comments_are_listed() {
        let text = render_text(&state(roster::demo_posts()));
        assert!(text.contains("[demo-2]"));
        assert!(text.contains("2 comment(s)"));
    }

    #[test]
    fn test_json_view() {
        let json = render_json(&state(roster::demo_posts())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], 3);
        assert_eq!(value["posts"].as_array().map(|p| p.len()), Some(2));
    }
}
