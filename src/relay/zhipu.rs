//! 智谱 AI Upstream
//!
//! 向 `/api/paas/v4/chat/completions` 发送单次请求，不做超时与重试。

use async_trait::async_trait;
use http::{header, HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;

use super::{ChatPayload, RelayError, Upstream, UpstreamReply};
use crate::utils::build_http_client;

pub const ZHIPU_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";

pub struct ZhipuClient {
    http: Client,
    endpoint: String,
}

impl ZhipuClient {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_endpoint(ZHIPU_API_URL)
    }

    /// 指向其他地址（测试中的模拟上游）
    pub fn with_endpoint(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            endpoint: endpoint.into(),
        })
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap, RelayError> {
    let mut map = HeaderMap::new();

    map.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| RelayError::Internal(format!("Invalid API key for header: {}", e)))?,
    );
    map.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(map)
}

#[async_trait]
impl Upstream for ZhipuClient {
    fn name(&self) -> &str {
        "zhipu"
    }

    async fn complete(
        &self,
        api_key: &str,
        payload: &ChatPayload,
    ) -> Result<UpstreamReply, RelayError> {
        let headers = build_headers(api_key)?;
        let body = serde_json::to_vec(payload)?;

        let response = self
            .http
            .post(&self.endpoint)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    RelayError::Internal(e.to_string())
                } else {
                    RelayError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream { status, body });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?;
        let body: Value = serde_json::from_slice(&bytes)?;

        Ok(UpstreamReply { status, body })
    }
}
