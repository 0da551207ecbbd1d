//! 中继错误分类
//!
//! 每种错误都对应一个 HTTP 状态码，并以 `{ "error": "..." }` 的形式返回给调用方。

use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// 聊天请求在中继过程中可能出现的错误
#[derive(Debug, Error)]
pub enum RelayError {
    /// 调用方缺少必要字段
    #[error("缺少必要参数: content")]
    InvalidRequest,

    /// 部署环境未配置 API Key
    #[error("未配置 API Key")]
    Unconfigured,

    /// 上游返回了非 2xx 状态码
    #[error("智谱 AI 接口调用失败: {} {body}", .status.as_u16())]
    Upstream { status: StatusCode, body: String },

    /// 请求已发出但没有收到响应
    #[error("网络请求失败，请检查网络连接")]
    Network(#[source] reqwest::Error),

    /// 其他本地错误
    #[error("服务器内部错误: {0}")]
    Internal(String),
}

impl RelayError {
    /// 该错误对应的 HTTP 状态码
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest => StatusCode::BAD_REQUEST,
            RelayError::Upstream { status, .. } => *status,
            RelayError::Unconfigured | RelayError::Network(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Internal(err.to_string())
    }
}

/// 所有失败路径上唯一的响应结构
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
