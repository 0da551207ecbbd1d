//! zhipu-relay - 智谱 AI 聊天中继服务
//!
//! 一个极简的 HTTP 中继，把聊天请求转发到智谱 AI 的 chat completions 接口。
//!
//! # 功能特性
//!
//! - `/chat`：校验 `content` 后原样转发，原样返回上游的状态码和 JSON
//! - `/translate`：注入翻译人设的 system 指令并关闭 thinking
//! - `/health`、`/message`、`/random` 示例端点
//! - 所有响应都带 `Access-Control-Allow-Origin: *`
//!
//! # 命令行接口
//!
//! - `serve`: 启动常驻 HTTP 服务器
//! - `edge`: 以 edge worker 形态运行（每次调用独立读取配置）
//! - `test`: 向本地服务器发送测试请求

mod commands;
mod config;
mod edge;
mod gateway;
mod prompts;
mod relay;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// zhipu-relay CLI
#[derive(Parser)]
#[command(name = "zhipu-relay")]
#[command(about = "Zhipu AI Chat Relay Service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 可用的命令
#[derive(Subcommand)]
enum Commands {
    /// 启动常驻 HTTP 服务器
    Serve,
    /// 以 edge worker 形态运行
    Edge,
    /// 向本地服务器发送测试请求
    Test {
        /// 请求 /translate 而不是 /chat
        #[arg(long)]
        translate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 文件（如果存在）
    if let Ok(dotenv_path) = std::env::var("ZHIPU_RELAY_ENV_FILE") {
        dotenvy::from_path(&dotenv_path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    // 初始化日志系统
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zhipu_relay=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    // 解析命令行参数和配置
    let cli = Cli::parse();
    let config = Config::from_env()?;

    if !matches!(cli.command, Commands::Test { .. }) {
        let api_key = if config.zhipu.has_api_key() {
            "set"
        } else {
            "unset"
        };
        tracing::info!(api_key, model = %config.zhipu.model, "Zhipu configuration");
        if !config.zhipu.has_api_key() {
            tracing::warn!("ZHIPU_API_KEY is not set, chat requests will fail with 500");
        }
    }

    // 执行相应的命令
    match cli.command {
        Commands::Serve => commands::serve_command(config).await,
        Commands::Edge => commands::edge_command(config).await,
        Commands::Test { translate } => commands::test_command(config, translate).await,
    }
}
