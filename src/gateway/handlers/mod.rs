//! HTTP 请求处理器

pub mod chat;
pub mod health;

pub use chat::{handle_chat, handle_translate};
pub use health::{handle_health, handle_message, handle_random};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::relay::{ErrorEnvelope, RelayError, UpstreamReply};

/// 把中继结果转换为 HTTP 响应：成功时原样返回上游状态码与 JSON
fn relay_response(result: Result<UpstreamReply, RelayError>) -> Response {
    match result {
        Ok(reply) => (reply.status, Json(reply.body)).into_response(),
        Err(err) => (err.status(), Json(err.envelope())).into_response(),
    }
}

/// 未匹配的路由
pub async fn handle_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorEnvelope::new("Not Found"))).into_response()
}
