// ==========================================
// PlantX 运维智能中台 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 屏蔽记录存储差异（PocketBase / Supabase / 本地 SQLite）
// 约束: 本地查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod pocketbase_store;
pub mod record_store;
mod rest_support;
pub mod sqlite_store;
pub mod supabase_store;
pub mod ticket_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use pocketbase_store::{PocketBaseStore, DEFAULT_POCKETBASE_URL};
pub use record_store::{Record, RecordStore};
pub use sqlite_store::SqliteRecordStore;
pub use supabase_store::SupabaseStore;
pub use ticket_repo::{TicketRepository, DEFAULT_TICKET_COLLECTION};
