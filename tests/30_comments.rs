mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

async fn seed_post(app: &TestApp, token: &str, text: &str) -> i64 {
    let (_, body) = app.post("/api/v1/posts/", token, json!({"text": text})).await;
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn comments_live_under_their_post() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let anna = app.user("anna").await;
    let first = seed_post(&app, &leo, "first").await;
    let second = seed_post(&app, &leo, "second").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/posts/{}/comments/", first),
            &anna,
            json!({"text": "nice", "post": second}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["post"], first);
    assert_eq!(body["data"]["author"], "anna");
    let comment = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app
        .get(&format!("/api/v1/posts/{}/comments/", first), Some(&leo))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .get(&format!("/api/v1/posts/{}/comments/", second), Some(&leo))
        .await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .get(&format!("/api/v1/posts/{}/comments/{}/", second, comment), Some(&leo))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_parent_post_is_not_found() {
    let app = TestApp::new();
    let leo = app.user("leo").await;

    let (status, _) = app.get("/api/v1/posts/999/comments/", Some(&leo)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/v1/posts/999/comments/", &leo, json!({"text": "hello?"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_comment_author_may_change_it() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let anna = app.user("anna").await;
    let post = seed_post(&app, &leo, "post").await;

    let (_, body) = app
        .post(&format!("/api/v1/posts/{}/comments/", post), &anna, json!({"text": "mine"}))
        .await;
    let uri = format!(
        "/api/v1/posts/{}/comments/{}/",
        post,
        body["data"]["id"].as_i64().unwrap()
    );

    // Owning the post grants nothing over its comments
    let (status, body) = app
        .request(Method::PATCH, &uri, Some(&leo), Some(json!({"text": "edited"})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You do not have permission to perform this action.");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&leo), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::PUT, &uri, Some(&anna), Some(json!({"text": "edited"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "edited");

    let (status, _) = app.request(Method::DELETE, &uri, Some(&anna), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, Some(&anna)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let post = seed_post(&app, &leo, "post").await;
    app.post(&format!("/api/v1/posts/{}/comments/", post), &leo, json!({"text": "c"}))
        .await;

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/v1/posts/{}/", post), Some(&leo), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .get(&format!("/api/v1/posts/{}/comments/", post), Some(&leo))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
