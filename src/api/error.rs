// ==========================================
// PlantX 运维智能中台 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向用户的错误消息
// ==========================================

use crate::assistant::error::AssistantError;
use crate::config::error::ConfigError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("已有导入任务正在进行")]
    ImportInProgress,

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("{0}")]
    ImportError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 记录存储错误
    // ==========================================
    #[error("记录存储错误: {0}")]
    StoreError(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // AI 助手错误
    // ==========================================
    #[error("{0}")]
    AssistantError(String),

    #[error("缺少 API Key: {0}")]
    MissingApiKey(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::StoreError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InvalidSheetUrl(msg) => ApiError::InvalidInput(msg),
            ImportError::ValidationError { row, message } => {
                ApiError::ValidationError(format!("行 {}: {}", row, message))
            }
            ImportError::Persistence(repo) => repo.into(),
            ImportError::Config(cfg) => cfg.into(),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 AssistantError 转换
// ==========================================
impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::MissingApiKey { provider } => ApiError::MissingApiKey(provider),
            AssistantError::UnsupportedProvider(name) => {
                ApiError::InvalidInput(format!("不支持的 AI 提供方: {}", name))
            }
            AssistantError::Config(cfg) => cfg.into(),
            AssistantError::Other(err) => ApiError::Other(err),
            other => ApiError::AssistantError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { key, value } => {
                ApiError::ConfigError(format!("{} 的取值非法: {}", key, value))
            }
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
