use axum::{
    extract::{OriginalUri, Request},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Route prefixes advertised by `/` and the 404 body.
pub const AVAILABLE_ENDPOINTS: [&str; 7] = [
    "/",
    "/health",
    "/api/v1/test",
    "/api/v1/auth",
    "/api/v1/inventory",
    "/api/v1/analytics",
    "/api/v1/admin",
];

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointIndex {
    pub health: String,
    pub test: String,
    pub auth: String,
    pub inventory: String,
    pub analytics: String,
    pub admin: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    pub endpoints: EndpointIndex,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub success: bool,
    pub message: String,
    pub requested_url: String,
    pub available_endpoints: Vec<String>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        message: "Server is running".into(),
        timestamp: OffsetDateTime::now_utc(),
    })
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Blood Bank Management System API".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        status: "Server is running".into(),
        endpoints: EndpointIndex {
            health: "/health".into(),
            test: "/api/v1/test".into(),
            auth: "/api/v1/auth".into(),
            inventory: "/api/v1/inventory".into(),
            analytics: "/api/v1/analytics".into(),
            admin: "/api/v1/admin".into(),
        },
        timestamp: OffsetDateTime::now_utc(),
    })
}

fn not_found_response(uri: &Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            success: false,
            message: "Route not found".into(),
            requested_url: uri.to_string(),
            available_endpoints: AVAILABLE_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }),
    )
        .into_response()
}

pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    not_found_response(&uri)
}

/// A known path hit with the wrong method gets the same body as an unknown path.
pub async fn method_not_allowed_as_not_found(req: Request, next: Next) -> Response {
    let uri = req.uri().clone();
    let res = next.run(req).await;
    if res.status() == StatusCode::METHOD_NOT_ALLOWED {
        return not_found_response(&uri);
    }
    res
}
