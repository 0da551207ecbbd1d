//! Chat API 处理器

use axum::{body::Bytes, extract::State, response::Response};

use crate::gateway::{handlers::relay_response, state::AppState};
use crate::relay::{relay_chat, ChatOptions};

/// POST /chat
///
/// 请求体以原始字节接收，交由中继统一校验，这样 JSON 格式错误也会以 `{ "error": ... }` 返回
pub async fn handle_chat(State(state): State<AppState>, body: Bytes) -> Response {
    let result = relay_chat(
        state.upstream(),
        state.settings(),
        &body,
        ChatOptions::default(),
    )
    .await;

    relay_response(result)
}

/// POST /translate
pub async fn handle_translate(State(state): State<AppState>, body: Bytes) -> Response {
    let settings = state.settings();
    let result = relay_chat(
        state.upstream(),
        settings,
        &body,
        ChatOptions::persona(&settings.translate_prompt),
    )
    .await;

    relay_response(result)
}
