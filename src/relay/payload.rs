//! 发往智谱 AI 的请求体

use serde::Serialize;
use serde_json::Value;

use super::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// `content` 原样保存调用方传入的 JSON 值（字符串或多模态数组等）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Value,
}

/// `thinking` 开关，目前只会发送 `{"type": "disabled"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thinking {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl Thinking {
    pub fn disabled() -> Self {
        Self { kind: "disabled" }
    }
}

/// `/chat/completions` 请求体
#[derive(Debug, Clone, Serialize)]
pub struct ChatPayload {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Thinking>,
    pub messages: Vec<ChatMessage>,
}

/// 单次聊天的附加选项
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatOptions<'a> {
    /// 置于用户消息之前的 system 指令
    pub system_prompt: Option<&'a str>,
    pub disable_thinking: bool,
}

impl<'a> ChatOptions<'a> {
    /// 带固定人设的对话：注入 system 指令并关闭 thinking
    pub fn persona(system_prompt: &'a str) -> Self {
        Self {
            system_prompt: Some(system_prompt),
            disable_thinking: true,
        }
    }
}

impl ChatPayload {
    pub fn build(model: &str, content: Value, options: ChatOptions<'_>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = options.system_prompt {
            messages.push(ChatMessage {
                role: Role::System,
                content: Value::String(prompt.to_string()),
            });
        }
        messages.push(ChatMessage {
            role: Role::User,
            content,
        });

        Self {
            model: model.to_string(),
            thinking: options.disable_thinking.then(Thinking::disabled),
            messages,
        }
    }
}

/// 从调用方请求体中取出 `content`
///
/// 空请求体等同于 `{}`。`null`、`false`、`0`、空字符串都视为缺失；
/// 其他值（包括数组、对象）不做任何转换，原样转发给上游。
pub fn extract_content(body: &[u8]) -> Result<Value, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RelayError::InvalidRequest);
    }

    let request: Value = serde_json::from_slice(body)?;
    let Value::Object(mut object) = request else {
        return Err(RelayError::Internal("请求体必须是 JSON 对象".to_string()));
    };

    match object.remove("content") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(RelayError::InvalidRequest),
        Some(Value::String(s)) if s.is_empty() => Err(RelayError::InvalidRequest),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(RelayError::InvalidRequest),
        Some(content) => Ok(content),
    }
}
