#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use yatube_api::auth::{generate_jwt, Claims};
use yatube_api::config::AppConfig;
use yatube_api::database::models::{Group, NewGroup};
use yatube_api::database::{MemoryStore, Store};
use yatube_api::server::{app, AppState};

pub const JWT_SECRET: &str = "integration-test-secret";

// 1x1 transparent GIF
pub const GIF: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// The full router over a fresh in-memory store, driven in-process
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    _media_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let media_dir = tempfile::tempdir().expect("media tempdir");

        let mut config = AppConfig::development();
        config.security.jwt_secret = JWT_SECRET.to_string();
        config.media.root = media_dir.path().to_path_buf();
        config.media.url_prefix = "/media".to_string();
        config.api.max_page_limit = Some(50);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);

        Self {
            router: app(state),
            store,
            _media_dir: media_dir,
        }
    }

    /// Create a user and return a bearer token for them
    pub async fn user(&self, username: &str) -> String {
        let user = self.store.insert_user(username).await.expect("seed user");
        token_for(user.id, &user.username)
    }

    pub async fn group(&self, slug: &str) -> Group {
        self.store
            .insert_group(NewGroup {
                title: slug.to_uppercase(),
                slug: slug.to_string(),
                description: String::new(),
            })
            .await
            .expect("seed group")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|b| b.to_string());
        self.send(method, uri, token, body).await
    }

    /// Send a raw body, for malformed-JSON cases
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Raw bytes of a GET, for static media
    pub async fn get_bytes(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }
}

pub fn token_for(user_id: i64, username: &str) -> String {
    generate_jwt(&Claims::new(user_id, username, 1), JWT_SECRET).expect("token")
}

/// The compiled server binary on a free port, backed by the in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_yatube-api"));
        cmd.env("API_PORT", port.to_string())
            .env("YATUBE_STORE", "memory")
            .env("APP_ENV", "development")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);

        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
