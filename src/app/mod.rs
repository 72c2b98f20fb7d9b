// ==========================================
// PlantX 运维智能中台 - 应用层
// ==========================================
// 职责: 装配配置、记录存储、导入器与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{build_store, get_default_db_path, AppState, DB_PATH_ENV};
