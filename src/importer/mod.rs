// ==========================================
// PlantX 运维智能中台 - 导入层
// ==========================================
// 职责: 表格数据（CSV 文件 / 上传 / 表格链接）→ 工单
// 管道: 读取 → 切分 → 映射 → 规范化/校验 → 落库
// ==========================================

// 模块声明
pub mod csv_tokenizer;
pub mod error;
pub mod field_mapper;
pub mod normalizer;
pub mod pipeline;
pub mod source_loader;
pub mod ticket_importer_impl;
pub mod ticket_importer_trait;
pub mod ticket_validator;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{CanonicalField, TicketFieldMapper};
pub use normalizer::{normalize_date, normalize_priority, normalize_status};
pub use pipeline::{parse_tickets, validate_tickets, ParsedBatch, ValidatedBatch};
pub use source_loader::{to_csv_export_url, HttpSourceLoader, ImportSource};
pub use ticket_importer_impl::TicketImporterImpl;
pub use ticket_validator::TicketValidator;

// 重导出 Trait 接口
pub use ticket_importer_trait::{FieldMapper, RowMapping, SourceLoader, TicketImporter};
