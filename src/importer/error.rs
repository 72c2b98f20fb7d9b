// ==========================================
// PlantX 运维智能中台 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 获取 / 解析 / 校验 / 落库
// ==========================================

use crate::config::ConfigError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("Excel files not yet supported. Please convert to CSV first.")]
    ExcelNotSupported,

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("表格链接无效: {0}")]
    InvalidSheetUrl(String),

    #[error("Failed to fetch Google Sheet data: {0}")]
    FetchError(String),

    #[error("Failed to fetch Google Sheet data (status={0})")]
    FetchStatus(u16),

    // ===== 解析错误 =====
    #[error("数据源没有可导入的数据行")]
    EmptySource,

    // ===== 校验错误 =====
    #[error("校验失败 (行 {row}): {message}")]
    ValidationError { row: usize, message: String },

    // ===== 落库错误 =====
    #[error("清空集合失败，导入已中止: {0}")]
    ClearFailed(#[source] RepositoryError),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),

    // ===== 配置错误 =====
    #[error(transparent)]
    Config(#[from] ConfigError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<reqwest::Error>
impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ImportError::FetchStatus(status.as_u16()),
            None => ImportError::FetchError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
