//! Integration tests for `HttpResourceClient` against a local responder.

mod test_utils;

use signet_cache::{CacheError, RemoteError, RemoteResourceClient, SingletonResourceCache};
use signet_remote::{
    FALLBACK_ERROR_MESSAGE, HttpClientConfig, HttpResourceClient, LOGO, Logo, ResourceRoute,
    Upload,
};
use signet_session::{AuthState, Session, UserRole};
use std::sync::Arc;
use test_utils::{OneShot, closed_port};

const LOGO_BODY: &str = r#"{"imgUrl":"https://cdn.example/a.png","imgName":"a.png","imgSize":2048}"#;

fn client(base_url: &str) -> HttpResourceClient<Logo> {
    let config = HttpClientConfig::default().with_base_url(base_url).unwrap();
    HttpResourceClient::new(config).unwrap()
}

fn signed_in() -> Arc<Session> {
    let session = Arc::new(Session::in_memory());
    session.set_auth(AuthState::signed_in("t1", "r1", UserRole::Admin));
    session
}

fn png() -> Upload {
    Upload::new("b.png", "image/png", b"\x89PNG....".to_vec())
}

// ─────────────────────────────────────────────────────────────────────────────
// fetch
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_sends_bearer_token_and_decodes() {
    let server = OneShot::respond(200, LOGO_BODY).await;
    let client = client(&server.base_url).with_token_source(signed_in());

    let logo = client.fetch(LOGO).await.unwrap();
    let request = server.request().await;

    assert_eq!(logo.img_name, "a.png");
    assert_eq!(logo.img_size, 2048);
    assert!(request.starts_with("get /logo http/1.1"), "{request}");
    assert!(request.contains("authorization: bearer t1"), "{request}");
}

#[tokio::test]
async fn fetch_without_session_sends_no_authorization() {
    let server = OneShot::respond(200, LOGO_BODY).await;
    let client = client(&server.base_url);

    client.fetch(LOGO).await.unwrap();
    let request = server.request().await;

    assert!(!request.contains("authorization:"), "{request}");
}

#[tokio::test]
async fn signed_out_session_sends_no_authorization() {
    let server = OneShot::respond(200, LOGO_BODY).await;
    let session = signed_in();
    session.logout();
    let client = client(&server.base_url).with_token_source(session);

    client.fetch(LOGO).await.unwrap();

    assert!(!server.request().await.contains("authorization:"));
}

#[tokio::test]
async fn error_status_carries_body_message() {
    let server = OneShot::respond(401, r#"{"message":"Token expired"}"#).await;

    let error = client(&server.base_url).fetch(LOGO).await.unwrap_err();

    assert_eq!(
        error,
        RemoteError::Status {
            status: 401,
            message: "Token expired".to_string(),
        }
    );
}

#[tokio::test]
async fn error_without_message_uses_fallback() {
    let server = OneShot::respond(502, r#"{"error":"upstream"}"#).await;

    let error = client(&server.base_url).fetch(LOGO).await.unwrap_err();

    assert_eq!(error.status(), Some(502));
    assert!(error.to_string().ends_with(FALLBACK_ERROR_MESSAGE));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = OneShot::respond(200, r#"{"imgSize":"large"}"#).await;

    let error = client(&server.base_url).fetch(LOGO).await.unwrap_err();

    assert!(matches!(error, RemoteError::InvalidResponse(_)), "{error:?}");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let base_url = closed_port().await;

    let error = client(&base_url).fetch(LOGO).await.unwrap_err();

    assert!(matches!(error, RemoteError::Transport(_)), "{error:?}");
}

#[tokio::test]
async fn unrouted_resource_is_rejected() {
    let error = client("http://127.0.0.1:9").fetch("about").await.unwrap_err();
    assert_eq!(error, RemoteError::UnknownRoute("about".to_string()));
}

// ─────────────────────────────────────────────────────────────────────────────
// write
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_posts_single_file_part() {
    let server = OneShot::respond(200, LOGO_BODY).await;
    let client = client(&server.base_url).with_token_source(signed_in());

    let stored = client.write(LOGO, png()).await.unwrap();
    let request = server.request().await;

    assert_eq!(stored.img_name, "a.png");
    assert!(request.starts_with("post /logo/upload http/1.1"), "{request}");
    assert!(request.contains("content-type: multipart/form-data; boundary="));
    assert!(request.contains("name=\"file\"; filename=\"b.png\""), "{request}");
    assert!(request.contains("content-type: image/png"));
    assert!(request.contains("authorization: bearer t1"));
}

#[tokio::test]
async fn non_image_upload_is_rejected_locally() {
    let upload = Upload::new("notes.pdf", "application/pdf", b"%PDF".to_vec());

    let error = client(&closed_port().await).write(LOGO, upload).await.unwrap_err();

    assert!(matches!(error, RemoteError::InvalidPayload(_)), "{error:?}");
}

#[tokio::test]
async fn oversized_upload_is_rejected_locally() {
    let config = HttpClientConfig::default()
        .with_base_url(closed_port().await)
        .unwrap()
        .with_route(LOGO, ResourceRoute::new("/logo", "/logo/upload").with_max_bytes(4));
    let client = HttpResourceClient::<Logo>::new(config).unwrap();

    let error = client.write(LOGO, png()).await.unwrap_err();

    assert!(error.to_string().contains("limit is 4"), "{error}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Through the cache
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cache_surfaces_rejected_upload_as_write_failure() {
    let server = OneShot::respond(413, r#"{"message":"File too large"}"#).await;
    let cache = SingletonResourceCache::new(client(&server.base_url));

    let error = cache.set(LOGO, png()).await.unwrap_err();

    assert_eq!(
        error,
        CacheError::WriteFailed {
            resource: LOGO.to_string(),
            source: RemoteError::Status {
                status: 413,
                message: "File too large".to_string(),
            },
        }
    );
    assert!(cache.peek(LOGO).is_none());
}

#[tokio::test]
async fn cache_loads_logo_over_http() {
    let server = OneShot::respond(200, LOGO_BODY).await;
    let cache = SingletonResourceCache::new(client(&server.base_url));

    let logo = cache.get(LOGO).await.unwrap();
    assert!(logo.has_image());

    // Served from memory; the one-shot server would refuse a second request.
    let again = cache.get(LOGO).await.unwrap();
    assert!(Arc::ptr_eq(&logo, &again));
    server.request().await;
}
