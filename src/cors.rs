use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderName, HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};

use crate::{
    config::{AppConfig, Mode},
    error::ApiError,
};

/// Front ends allowed in production, before `FRONTEND_URL` is appended.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 5] = [
    "http://localhost:3000",
    "http://localhost:5001",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5001",
    "https://bloodbankmanagementsystem1.netlify.app",
];

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    mode: Mode,
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn from_config(cfg: &AppConfig) -> Self {
        let mut allowed: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|o| o.to_string())
            .collect();
        if let Some(url) = &cfg.frontend_url {
            allowed.push(url.trim_end_matches('/').to_string());
        }
        Self {
            mode: cfg.mode,
            allowed,
        }
    }

    /// Requests without an `Origin` header (curl, mobile apps) always pass.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match (self.mode, origin) {
            (Mode::Development, _) | (_, None) => true,
            (Mode::Production, Some(origin)) => self.allowed.iter().any(|a| a == origin),
        }
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                CONTENT_TYPE,
                AUTHORIZATION,
                HeaderName::from_static("x-requested-with"),
            ])
            .allow_credentials(true);

        match self.mode {
            Mode::Development => layer.allow_origin(AllowOrigin::mirror_request()),
            Mode::Production => layer.allow_origin(AllowOrigin::list(
                self.allowed
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o).ok()),
            )),
        }
    }
}

/// Refuses requests whose `Origin` the policy does not allow.
pub async fn enforce_origin(
    State(policy): State<Arc<OriginPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(ORIGIN)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    if let Some(origin) = &origin {
        debug!(%origin, "request origin");
    }

    if !policy.allows(origin.as_deref()) {
        warn!(
            origin = origin.as_deref().unwrap_or_default(),
            allowed = %policy.allowed_origins().join(", "),
            "CORS blocked origin"
        );
        return ApiError::Forbidden("Not allowed by CORS".into()).into_response();
    }

    next.run(req).await
}
