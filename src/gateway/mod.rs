//! Gateway 应用层
//!
//! 常驻进程形态的 HTTP 服务器

mod handlers;
pub(crate) mod middleware;
mod state;

pub use state::AppState;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::relay::ZhipuClient;

pub async fn serve(config: Config) -> Result<()> {
    let upstream = Arc::new(ZhipuClient::new()?);
    let state = AppState::new(upstream, config.zhipu.clone());
    let app = build_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Chat endpoint: http://{}/chat", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::handle_health))
        .route("/message", get(handlers::handle_message))
        .route("/random", get(handlers::handle_random))
        .route("/chat", post(handlers::handle_chat))
        .route("/translate", post(handlers::handle_translate))
        .fallback(handlers::handle_not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_logger))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors_layer()),
        )
        .with_state(state)
}

pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    tokio::select! {
        _ = ctrl_c => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
