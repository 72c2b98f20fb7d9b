// ==========================================
// PlantX 运维智能中台 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供界面或运维工具调用
// ==========================================

pub mod assistant_api;
pub mod config_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use assistant_api::{AssistantApi, LocalConnectionStatus};
pub use config_api::{ConfigApi, ConfigItem};
pub use error::{ApiError, ApiResult};
pub use import_api::{failure_message, outcome_message, ImportApi, ImportApiResponse};
