//! 健康检查与示例端点

use axum::Json;
use serde::Serialize;

use crate::utils::{iso8601_now, random_uuid};

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
pub struct RandomResponse {
    uuid: String,
}

/// GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: iso8601_now(),
    })
}

/// GET /message
pub async fn handle_message() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, World!",
    })
}

/// GET /random
pub async fn handle_random() -> Json<RandomResponse> {
    Json(RandomResponse {
        uuid: random_uuid(),
    })
}
