// ==========================================
// PlantX 运维智能中台 - AI 助手错误类型
// ==========================================

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("未配置 {provider} 的 API Key，且离线演示模式已关闭")]
    MissingApiKey { provider: String },

    #[error("不支持的 AI 提供方: {0}")]
    UnsupportedProvider(String),

    #[error("AI 服务请求失败: {0}")]
    RequestFailed(String),

    #[error("{provider} API error: {message}")]
    ProviderError {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} 返回内容为空")]
    EmptyResponse { provider: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::RequestFailed(err.to_string())
    }
}

pub type AssistantResult<T> = Result<T, AssistantError>;
