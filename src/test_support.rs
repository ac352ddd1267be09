//! Shared fixtures for router-level tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::{jwt::JwtKeys, password::hash_password},
    config::{AppConfig, JwtConfig, Mode},
    db::memory::MemoryStore,
    model::{NewUser, Role, User},
    state::AppState,
};

pub fn test_config(mode: Mode) -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        },
        host: "127.0.0.1".into(),
        port: 0,
        mode,
        mode_label: mode.as_str().into(),
        frontend_url: Some("https://app.bloodbank.test".into()),
    }
}

pub fn test_state(mode: Mode) -> AppState {
    AppState::from_parts(Arc::new(MemoryStore::new()), Arc::new(test_config(mode)))
}

pub fn test_app_in(mode: Mode) -> (Router, AppState) {
    let state = test_state(mode);
    (build_app(state.clone()), state)
}

pub fn test_app() -> (Router, AppState) {
    test_app_in(Mode::Development)
}

pub async fn seed_user_with_password(
    state: &AppState,
    role: Role,
    email: &str,
    password: &str,
) -> User {
    insert_user(state, role, email, hash_password(password).expect("hash")).await
}

/// Seeds a user whose password hash is a placeholder (cannot log in).
pub async fn seed_user(state: &AppState, role: Role, email: &str) -> User {
    insert_user(state, role, email, "unusable".into()).await
}

async fn insert_user(state: &AppState, role: Role, email: &str, password_hash: String) -> User {
    let label = email.split('@').next().unwrap_or(email).to_string();
    let new = NewUser {
        role,
        name: matches!(role, Role::Admin | Role::Donar).then(|| label.clone()),
        organisation_name: (role == Role::Organisation).then(|| label.clone()),
        hospital_name: (role == Role::Hospital).then(|| label.clone()),
        website: None,
        address: "1 Test Street".into(),
        phone: "555-0100".into(),
        email: email.to_lowercase(),
        password_hash,
    };
    state.store.create_user(new).await.expect("seed user")
}

pub fn bearer(state: &AppState, user: &User) -> String {
    JwtKeys::from_config(&state.config.jwt)
        .sign(user.id, user.role)
        .expect("sign token")
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, serde_json::Value) {
    let res = app.clone().oneshot(req).await.expect("router is infallible");
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, headers, json)
}

pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let (status, _, json) = send(app, builder.body(body).expect("request")).await;
    (status, json)
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
