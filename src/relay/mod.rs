//! 聊天中继
//!
//! 两种部署形态共用的核心逻辑：解析凭据、校验 `content`、调用上游，
//! 并把所有失败归一为 [`RelayError`]。适配层只负责与各自运行时的请求/响应类型互转。

mod error;
mod payload;
pub mod zhipu;

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;

use crate::config::ZhipuSettings;

pub use error::{ErrorEnvelope, RelayError};
pub use payload::{extract_content, ChatOptions, ChatPayload};
pub use zhipu::ZhipuClient;

/// 上游成功时的原始回复
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Upstream Trait - 聊天补全服务的统一接口
#[async_trait]
pub trait Upstream: Send + Sync {
    /// 名称（用于日志）
    fn name(&self) -> &str;

    /// 发送一次请求；非 2xx 状态必须以 [`RelayError::Upstream`] 返回
    async fn complete(
        &self,
        api_key: &str,
        payload: &ChatPayload,
    ) -> Result<UpstreamReply, RelayError>;
}

/// 处理一次聊天请求
///
/// # 参数
///
/// * `upstream` - 上游客户端
/// * `settings` - 本次请求使用的智谱配置
/// * `body` - 调用方原始请求体
/// * `options` - 是否注入 system 指令 / 关闭 thinking
///
/// # 返回
///
/// 成功时返回上游的状态码和未经修改的 JSON；失败时返回已分类的错误
pub async fn relay_chat(
    upstream: &dyn Upstream,
    settings: &ZhipuSettings,
    body: &[u8],
    options: ChatOptions<'_>,
) -> Result<UpstreamReply, RelayError> {
    let result: Result<UpstreamReply, RelayError> = async {
        let credentials = settings.credentials()?;
        let content = extract_content(body)?;
        let payload = ChatPayload::build(credentials.model, content, options);

        tracing::info!(
            upstream = upstream.name(),
            model = credentials.model,
            persona = options.system_prompt.is_some(),
            "request"
        );

        upstream.complete(credentials.api_key, &payload).await
    }
    .await;

    match &result {
        Ok(reply) => tracing::info!(status = reply.status.as_u16(), "response"),
        Err(err @ (RelayError::InvalidRequest | RelayError::Unconfigured)) => {
            tracing::warn!("Chat request rejected: {}", err)
        }
        Err(err) => tracing::error!("Chat API Error: {:?}", err),
    }

    result
}
