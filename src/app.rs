use std::{net::SocketAddr, sync::Arc};

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::cors::{enforce_origin, OriginPolicy};
use crate::routes::{system, test};
use crate::state::AppState;
use crate::{admin, analytics, auth, inventory};

pub fn build_app(state: AppState) -> Router {
    let policy = Arc::new(OriginPolicy::from_config(&state.config));

    Router::new()
        .route("/", get(system::index))
        .route("/health", get(system::health))
        .nest("/api/v1/test", test::router())
        .nest("/api/v1/auth", auth::router())
        .nest("/api/v1/inventory", inventory::router())
        .nest("/api/v1/analytics", analytics::router())
        .nest("/api/v1/admin", admin::router())
        .fallback(system::not_found)
        .with_state(state)
        .layer(middleware::from_fn(system::method_not_allowed_as_not_found))
        .layer(policy.cors_layer())
        .layer(middleware::from_fn_with_state(policy, enforce_origin))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(config: &AppConfig, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        mode = %config.mode_label,
        cors = config.mode.as_str(),
        "server running on http://{}",
        listener.local_addr()?
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
