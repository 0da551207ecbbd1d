//! 本地托管 edge 调度函数
//!
//! 每个请求都完整读入后交给 [`dispatch`](super::dispatch)，并在调用前重新读取环境变量作为本次调用的配置。
//! 请求体不限制长度。

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::{Config, ZhipuSettings};
use crate::gateway::{middleware::request_logger, shutdown_signal};
use crate::relay::{ErrorEnvelope, Upstream, ZhipuClient};

/// 每次调用时读取本次的配置
type Bindings = fn() -> ZhipuSettings;

#[derive(Clone)]
struct EdgeState {
    upstream: Arc<dyn Upstream>,
    bindings: Bindings,
}

pub async fn serve(config: Config) -> Result<()> {
    let app = build_router(Arc::new(ZhipuClient::new()?), ZhipuSettings::from_env);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting edge worker on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Edge worker shutdown complete");
    Ok(())
}

fn build_router(upstream: Arc<dyn Upstream>, bindings: Bindings) -> Router {
    Router::new()
        .fallback(invoke)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logger))
        .with_state(EdgeState { upstream, bindings })
}

async fn invoke(State(state): State<EdgeState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("Failed to read request body: {}", err);
            let envelope = ErrorEnvelope::new(format!("服务器内部错误: {}", err));
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
                Json(envelope),
            )
                .into_response();
        }
    };

    let env = (state.bindings)();
    let request = http::Request::from_parts(parts, body);

    super::dispatch(request, &env, state.upstream.as_ref())
        .await
        .map(Body::from)
}
