use feed_client::gateway::{CommentRecord, FeedGateway, HttpGateway};
use feed_client::{FeedError, ImageUpload};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(&server.uri(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_list_images() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "images": ["b.png", "a.png"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let images = gateway(&server).await.list_images().await.unwrap();
    assert_eq!(images, vec!["b.png", "a.png"]);
}

#[tokio::test]
async fn test_comment_paths_are_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/comments/my%20pic.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comments": [{ "comment_text": "wow", "id": 3, "image_id": "my pic.png" }]
        })))
        .mount(&server)
        .await;

    let comments = gateway(&server)
        .await
        .list_comments("my pic.png")
        .await
        .unwrap();
    assert_eq!(comments, vec![CommentRecord::new("wow")]);
}

#[tokio::test]
async fn test_add_comment_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/comments/a.png"))
        .and(body_json(json!({ "comment_text": "nice" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server)
        .await
        .add_comment("a.png", "nice")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_upload_sends_multipart_and_reads_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images"))
        .and(body_string_contains("name=\"base64_image\""))
        .and(body_string_contains("name=\"caption\""))
        .and(body_string_contains("sunset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Image uploaded successfully",
            "filename": "sunset.png"
        })))
        .mount(&server)
        .await;

    let upload = ImageUpload::new("sunset.png", b"\x89PNG".to_vec());
    let receipt = gateway(&server)
        .await
        .upload_image(&upload, "sunset")
        .await
        .unwrap();
    assert_eq!(receipt.image_id.as_deref(), Some("sunset.png"));
}

#[tokio::test]
async fn test_upload_with_opaque_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(201).set_body_string("stored"))
        .mount(&server)
        .await;

    let upload = ImageUpload::new("x.jpg", vec![0xff, 0xd8]);
    let receipt = gateway(&server)
        .await
        .upload_image(&upload, "x")
        .await
        .unwrap();
    assert!(receipt.image_id.is_none());
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = gateway(&server).await.list_images().await.unwrap_err();
    match &err {
        FeedError::Gateway { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "busy");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_listing_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = gateway(&server).await.list_images().await.unwrap_err();
    assert!(matches!(err, FeedError::Decode(_)));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Hello" })))
        .mount(&server)
        .await;

    assert!(gateway(&server).await.health().await.unwrap());

    let offline = HttpGateway::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
    assert!(!offline.health().await.unwrap());
}
