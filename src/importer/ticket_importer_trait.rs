// ==========================================
// PlantX 运维智能中台 - 工单导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 数据源 → 行切分 → 字段映射 → 规范化/校验 → 落库
// ==========================================

use crate::domain::ticket::{ImportOutcome, RawTicketRecord};
use crate::domain::types::PersistenceStrategy;
use crate::importer::error::ImportResult;
use crate::importer::source_loader::ImportSource;
use async_trait::async_trait;

// ==========================================
// TicketImporter Trait
// ==========================================
// 用途: 工单导入主接口
// 实现者: TicketImporterImpl
#[async_trait]
pub trait TicketImporter: Send + Sync {
    /// 从数据源导入工单
    ///
    /// # 参数
    /// - source: 本地文件 / 上传内容 / 表格链接
    /// - strategy: 持久化策略（None 时读取配置）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 导入结果（逐行失败记录在 failures 中）
    /// - Err: 数据源错误、清空失败、配置错误
    async fn import(
        &self,
        source: &ImportSource,
        strategy: Option<PersistenceStrategy>,
    ) -> ImportResult<ImportOutcome>;

    /// 从已获取的 CSV 文本导入
    async fn import_text(
        &self,
        text: &str,
        source_label: &str,
        strategy: Option<PersistenceStrategy>,
    ) -> ImportResult<ImportOutcome>;
}

// ==========================================
// SourceLoader Trait
// ==========================================
// 用途: 读取原始表格文本
// 实现者: HttpSourceLoader
#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// 读取数据源为 UTF-8 文本
    async fn load(&self, source: &ImportSource) -> ImportResult<String>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 单行字段映射
// 实现者: TicketFieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将数据行映射为 RawTicketRecord
    ///
    /// # 参数
    /// - headers: 表头行
    /// - row: 数据行
    /// - row_number: 数据行号（从 1 开始）
    fn map_row(&self, headers: &[String], row: &[String], row_number: usize) -> RowMapping;
}

/// 单行映射结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowMapping {
    Mapped(RawTicketRecord),
    ShortRow, // 字段数少于表头
    Empty,    // 无 title 且无外部工单号
}
