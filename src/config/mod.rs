// ==========================================
// PlantX 运维智能中台 - 配置层
// ==========================================
// 职责: 系统配置管理（记录存储、导入策略、AI 提供方）
// 存储: config_kv 表
// ==========================================

pub mod ai_config_trait;
pub mod config_manager;
pub mod error;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use ai_config_trait::AiConfigReader;
pub use config_manager::{config_keys, ConfigManager, StoreSettings};
pub use error::{ConfigError, ConfigResult};
pub use import_config_trait::ImportConfigReader;
