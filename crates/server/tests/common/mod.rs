#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use server::routes::{self, auth::ServerState};
use service::storage::{BlobStore, MemoryBlobStore};

pub const PASSWORD: &str = "ValidP@ss1";
const BOUNDARY: &str = "barbershop-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryBlobStore>,
}

/// Router over a fresh in-memory database and blob store.
pub async fn build_app() -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    let store = Arc::new(MemoryBlobStore::new("/media"));
    let blobs: Arc<dyn BlobStore> = store.clone();
    let auth = configs::AuthConfig { jwt_secret: "test-secret".into(), ..Default::default() };
    let media = configs::MediaConfig::default();
    let state = ServerState::new(db, blobs, &auth, media.max_upload_bytes);
    let router = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive(), &media);
    Ok(TestApp { router, store })
}

pub fn png() -> Vec<u8> {
    b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01".to_vec()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, Vec<u8>),
}

pub fn multipart_body(parts: Vec<Part<'_>>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    Ok(builder.body(Body::from(serde_json::to_vec(body)?))?)
}

pub fn multipart_request(method: &str, uri: &str, token: Option<&str>, parts: Vec<Part<'_>>) -> anyhow::Result<Request<Body>> {
    let (content_type, body) = multipart_body(parts);
    let mut builder = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, content_type);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    Ok(builder.body(Body::from(body))?)
}

pub fn get_request(uri: &str, token: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    Ok(builder.body(Body::empty())?)
}

pub async fn send(app: &TestApp, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp: Response<Body> = app.router.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

/// Sign up `username` and log in, returning the access token.
pub async fn sign_up_and_login(app: &TestApp, username: &str) -> anyhow::Result<String> {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": PASSWORD,
    });
    let (status, _) = send(app, json_request("POST", "/user", None, &body)?).await?;
    assert_eq!(status, StatusCode::CREATED);
    let login = serde_json::json!({"username": username, "password": PASSWORD});
    let (status, claims) = send(app, json_request("POST", "/auth/token", None, &login)?).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(claims["token"].as_str().unwrap_or_default().to_string())
}
