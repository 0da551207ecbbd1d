//! Serve 命令 - 启动常驻 HTTP 服务器

use anyhow::Result;

use crate::config::Config;
use crate::gateway;

/// 执行服务器启动命令
///
/// 监听 `HOST:PORT`，直到收到 Ctrl+C 或 SIGTERM 后优雅关闭
pub async fn serve_command(config: Config) -> Result<()> {
    gateway::serve(config).await
}
