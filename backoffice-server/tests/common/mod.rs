//! Shared fixtures for integration tests
//!
//! Every test gets its own in-memory SurrealDB and recording in-memory image host.
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use backoffice_server::core::Config;
use backoffice_server::db::DbService;
use backoffice_server::services::UploadedImage;
use backoffice_server::services::https::build_router;
use backoffice_server::services::image_host::MemoryImageHost;
use backoffice_server::ServerState;
use http::{HeaderMap, Request, StatusCode};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::{Map, Value, json};
use shared::models::{Admin, Category, Role};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Secret123";

pub struct TestApp {
    pub state: ServerState,
    pub host: MemoryImageHost,
}

pub async fn test_app() -> TestApp {
    test_app_with(Config::for_tests()).await
}

pub async fn test_app_with(config: Config) -> TestApp {
    let db = DbService::new(&config).await.unwrap().db;
    let host = MemoryImageHost::recording();
    let state = ServerState::new(config, db, Arc::new(host.clone()));
    TestApp { state, host }
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn role(&self, name: &str) -> Role {
        self.state
            .service::<Role>()
            .create(doc(json!({"name": name, "status": "active", "limit": 5})), None)
            .await
            .unwrap()
    }

    pub async fn category(&self, name: &str) -> Category {
        self.state
            .service::<Category>()
            .create(doc(json!({"name": name})), None)
            .await
            .unwrap()
    }

    pub async fn category_count(&self, id: &str) -> i64 {
        self.state.service::<Category>().get(id).await.unwrap().count
    }

    /// Admin `admin@example.com` / `Secret123` under a fresh role
    pub async fn admin(&self) -> Admin {
        let role = self.role("Manager").await;
        self.state
            .service::<Admin>()
            .create(
                doc(json!({
                    "username": "boss",
                    "email": ADMIN_EMAIL,
                    "password": ADMIN_PASSWORD,
                    "role": role.id,
                })),
                None,
            )
            .await
            .unwrap()
    }

    /// Run one request through the full router
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        send(self.router(), request).await
    }
}

/// Run one request through `router`, decoding a JSON body if present
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

pub fn doc(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn png(name: &str) -> UploadedImage {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(16, 16))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    UploadedImage {
        file_name: Some(name.to_string()),
        content_type: Some("image/png".to_string()),
        bytes,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// `name=value` part of a `Set-Cookie` header
pub fn cookie_pair(headers: &HeaderMap) -> String {
    headers
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string()
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("cookie", cookie.parse().unwrap());
    request
}
