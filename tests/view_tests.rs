mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use bookmarkd::registry::Registry;
use bookmarkd::router::{BookmarksState, bookmarks_router};
use bookmarkd::signals::Flow;
use std::sync::Arc;
use tower::ServiceExt;

async fn app_with(registry: Arc<Registry>) -> Router {
    bookmarks_router(BookmarksState::new(registry))
}

fn post_bookmark(body: &str, user: Option<i64>, ajax: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/bookmark")
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    if ajax {
        builder = builder.header("x-requested-with", "XMLHttpRequest");
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

#[tokio::test]
async fn non_post_methods_are_forbidden() {
    let registry = common::registry_with("test.model", &[1]).await;
    let app = app_with(registry).await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/bookmark")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_string(resp).await, "Forbidden.");
}

#[tokio::test]
async fn an_unknown_model_is_a_bad_request() {
    let registry = common::registry_with("test.model", &[1]).await;
    let app = app_with(registry).await;

    let resp = app
        .oneshot(post_bookmark(
            "model=auth.user&object_id=1&key=main",
            Some(1),
            false,
        ))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(resp).await, "Invalid model.");
}

#[tokio::test]
async fn an_unregistered_model_is_a_bad_request() {
    let registry = common::registry_with("test.model", &[1]).await;
    registry.unregister(&["test.model"]).expect("unregister failed");
    let app = app_with(registry).await;

    let resp = app
        .oneshot(post_bookmark(
            "model=test.model&object_id=1&key=main",
            Some(1),
            false,
        ))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(resp).await, "Unregistered model.");
}

#[tokio::test]
async fn an_anonymous_post_fails_form_validation() {
    let registry = common::registry_with("test.model", &[1]).await;
    let app = app_with(registry).await;

    let resp = app
        .oneshot(post_bookmark(
            "model=test.model&object_id=1&key=main",
            None,
            false,
        ))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(resp).await, "Invalid data in bookmark form.");
}

#[tokio::test]
async fn a_disallowed_key_is_a_bad_request() {
    let registry = common::registry_with("test.model", &[1]).await;
    let app = app_with(registry).await;

    // pattern-valid but not the handler's default key
    let resp = app
        .oneshot(post_bookmark(
            "model=test.model&object_id=1&key=other",
            Some(1),
            false,
        ))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(resp).await, "Invalid key.");
}

#[tokio::test]
async fn an_ajax_add_returns_the_bookmark_as_json() {
    let registry = common::registry_with("test.model", &[1]).await;
    let app = app_with(registry).await;

    let resp = app
        .oneshot(post_bookmark(
            "model=test.model&object_id=1&key=main",
            Some(42),
            true,
        ))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(resp).await).expect("invalid json body");
    assert_eq!(body["key"], "main");
    assert_eq!(body["user_id"], 42);
    assert!(body["bookmark_id"].as_i64().is_some());
}

#[tokio::test]
async fn a_second_post_toggles_the_bookmark_away() {
    let registry = common::registry_with("test.model", &[1]).await;
    let app = app_with(registry.clone()).await;

    let resp = app
        .clone()
        .oneshot(post_bookmark(
            "model=test.model&object_id=1&key=main",
            Some(1),
            false,
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app
        .oneshot(post_bookmark(
            "model=test.model&object_id=1&key=main&next=/after",
            Some(1),
            false,
        ))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/after")
    );

    let left = registry
        .backend()
        .filter_by(1, &bookmarkd::backend::BookmarkQuery::default())
        .await
        .unwrap();
    assert!(left.is_empty());
}

#[tokio::test]
async fn redirects_fall_back_to_the_referer() {
    let registry = common::registry_with("test.model", &[1]).await;
    let app = app_with(registry).await;

    let mut req = post_bookmark("model=test.model&object_id=1&key=main", Some(1), false);
    req.headers_mut()
        .insert("referer", "/articles/1".parse().expect("bad header"));

    let resp = app.oneshot(req).await.expect("request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/articles/1")
    );
}

#[tokio::test]
async fn a_vetoing_receiver_kills_the_operation() {
    let registry = common::registry_with("test.model", &[1]).await;
    registry
        .signals()
        .connect_pre_save(Box::new(|_ctx, _event| Flow::Abort));
    let app = app_with(registry.clone()).await;

    let resp = app
        .oneshot(post_bookmark(
            "model=test.model&object_id=1&key=main",
            Some(1),
            false,
        ))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(resp).await, "Receiver killed the bookmark process.");

    let target = bookmarkd::content::ContentRef::new("test.model", 1);
    assert!(!registry.backend().exists(1, &target, "main").await.unwrap());
}

#[tokio::test]
async fn the_user_listing_requires_authentication() {
    let registry = common::registry_with("test.model", &[1, 2]).await;
    let target1 = bookmarkd::content::ContentRef::new("test.model", 1);
    let target2 = bookmarkd::content::ContentRef::new("test.model", 2);
    registry.backend().add(1, &target1, "main").await.unwrap();
    registry.backend().add(1, &target2, "main").await.unwrap();
    registry.backend().add(2, &target1, "main").await.unwrap();
    let app = app_with(registry).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/bookmarks")
                .header("x-user-id", "1")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(resp).await).expect("invalid json body");
    assert_eq!(body.as_array().map(|a| a.len()), Some(2));

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/bookmarks")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn the_target_listing_filters_by_key() {
    let registry = common::registry_with("test.model", &[1]).await;
    let target = bookmarkd::content::ContentRef::new("test.model", 1);
    registry.backend().add(1, &target, "main").await.unwrap();
    registry.backend().add(2, &target, "main").await.unwrap();
    registry.backend().add(1, &target, "later").await.unwrap();
    let app = app_with(registry).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/targets/test.model/1/bookmarks?key=main")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(resp).await).expect("invalid json body");
    assert_eq!(body.as_array().map(|a| a.len()), Some(2));

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/targets/auth.user/1/bookmarks")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
