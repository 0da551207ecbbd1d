//! Edge 命令 - 以 edge worker 形态运行
//!
//! 与 `serve` 的区别：不保存任何配置，每次调用都重新读取 `ZHIPU_*` 环境变量，
//! 响应格式与 edge 运行时保持一致（纯文本 `/message`、`/random`，没有 `/health`）。

use anyhow::Result;

use crate::config::Config;
use crate::edge;

pub async fn edge_command(config: Config) -> Result<()> {
    edge::serve(config).await
}
