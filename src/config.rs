//! 应用配置模块
//!
//! 负责从环境变量加载应用配置，包括：
//! - 服务器监听地址和端口
//! - 智谱 AI 的 API Key 与模型
//! - 翻译接口使用的 system 指令

use anyhow::{Context, Result};

use crate::prompts::TRANSLATE_SYSTEM_PROMPT;
use crate::relay::RelayError;

pub const DEFAULT_MODEL: &str = "glm-4-air-250414";

/// 应用配置
///
/// 进程启动时构造一次，之后只读
#[derive(Debug, Clone)]
pub struct Config {
    /// 服务器监听地址（如 "0.0.0.0" 或 "127.0.0.1"）
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    pub zhipu: ZhipuSettings,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// # 环境变量
    ///
    /// - `HOST`: 服务器监听地址（默认: "0.0.0.0"）
    /// - `PORT`: 服务器监听端口（默认: 3000）
    /// - 以及 [`ZhipuSettings::from_env`] 读取的变量
    ///
    /// # 错误
    ///
    /// - 如果 `PORT` 不是有效的端口号
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        Ok(Self {
            host,
            port,
            zhipu: ZhipuSettings::from_env(),
        })
    }
}

/// 调用智谱 AI 所需的配置
///
/// 缺少 API Key 不会导致启动失败，而是在每次聊天请求时返回 500
#[derive(Clone, Default)]
pub struct ZhipuSettings {
    pub api_key: Option<String>,
    pub model: String,
    /// `/translate` 注入的 system 指令
    pub translate_prompt: String,
}

/// 已解析的凭据
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
}

impl ZhipuSettings {
    /// # 环境变量
    ///
    /// - `ZHIPU_API_KEY`: API Key
    /// - `ZHIPU_MODEL`: 模型名称（默认: `glm-4-air-250414`）
    /// - `ZHIPU_TRANSLATE_PROMPT`: 覆盖内置的翻译 system 指令
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            api_key: non_empty("ZHIPU_API_KEY"),
            model: non_empty("ZHIPU_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            translate_prompt: non_empty("ZHIPU_TRANSLATE_PROMPT")
                .unwrap_or_else(|| TRANSLATE_SYSTEM_PROMPT.to_string()),
        }
    }

    pub fn credentials(&self) -> Result<Credentials<'_>, RelayError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(RelayError::Unconfigured)?;

        Ok(Credentials {
            api_key,
            model: &self.model,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.credentials().is_ok()
    }
}

impl std::fmt::Debug for ZhipuSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZhipuSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
