mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn follow_and_list_own_subscriptions() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    let anna = app.user("anna").await;

    let (status, body) = app
        .post("/api/v1/follow/", &leo, json!({"following": "anna", "user": "anna"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"], json!({"user": "leo", "following": "anna"}));

    let (_, body) = app.get("/api/v1/follow/", Some(&leo)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/v1/follow/", Some(&anna)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_follow_is_a_conflict() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    app.user("anna").await;

    let (status, _) = app.post("/api/v1/follow/", &leo, json!({"following": "anna"})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/v1/follow/", &leo, json!({"following": "anna"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn bad_targets_are_rejected() {
    let app = TestApp::new();
    let leo = app.user("leo").await;

    for payload in [json!({"following": "leo"}), json!({"following": "nobody"}), json!({})] {
        let (status, body) = app.post("/api/v1/follow/", &leo, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["field_errors"]["following"].is_string());
    }
}

#[tokio::test]
async fn search_filters_by_followed_username() {
    let app = TestApp::new();
    let leo = app.user("leo").await;
    app.user("anna").await;
    app.user("Annabel").await;
    app.user("bob").await;

    for name in ["anna", "Annabel", "bob"] {
        app.post("/api/v1/follow/", &leo, json!({"following": name})).await;
    }

    let (_, body) = app.get("/api/v1/follow/?search=ANN", Some(&leo)).await;
    let mut names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["following"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Annabel", "anna"]);

    let (_, body) = app.get("/api/v1/follow/?search=", Some(&leo)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}
