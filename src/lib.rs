// ==========================================
// PlantX 运维智能中台 - 核心库
// ==========================================
// 职责: 工单表格导入（CSV / 表格链接）+ AI 运维助手
// 技术栈: Rust + SQLite + PocketBase/Supabase REST
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 记录存储
pub mod repository;

// 导入层 - 表格数据
pub mod importer;

// AI 助手层 - 提供方分发
pub mod assistant;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AiProviderKind, PersistenceStrategy, StoreBackend, TicketPriority, TicketStatus,
};

// 领域实体
pub use domain::{AiAnswer, AiQuery, ImportOutcome, NewTicket, Ticket};

// API
pub use api::{AssistantApi, ConfigApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "PlantX 运维智能中台";
