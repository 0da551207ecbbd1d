use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;

/// 是否禁用 TLS 验证（用于调试 mitmproxy 等场景）
pub fn should_disable_tls_verify() -> bool {
    std::env::var("ZHIPU_RELAY_DISABLE_TLS_VERIFY")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// 构造发往上游的 HTTP 客户端
///
/// 不设置超时：每次请求只发一次，直到上游响应或连接失败
pub fn build_http_client() -> anyhow::Result<Client> {
    let mut builder = Client::builder().pool_max_idle_per_host(10);

    if should_disable_tls_verify() {
        tracing::warn!("TLS certificate verification is DISABLED - for debugging only!");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().context("Failed to create HTTP client")
}

/// 当前 UTC 时间，ISO 8601 格式（毫秒精度，如 `2025-01-01T00:00:00.000Z`）
#[inline]
pub fn iso8601_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 新的随机 UUID (v4)
#[inline]
pub fn random_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
