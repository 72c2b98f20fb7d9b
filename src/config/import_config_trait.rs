// ==========================================
// PlantX 运维智能中台 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::types::PersistenceStrategy;
use async_trait::async_trait;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取工单集合名
    ///
    /// # 默认值
    /// - tickets
    async fn get_collection_name(&self) -> ConfigResult<String>;

    /// 获取持久化策略
    ///
    /// # 返回
    /// - PersistenceStrategy::ReplaceAll: 先清空再写入（破坏性）
    /// - PersistenceStrategy::UpsertByKey: 按外部工单号幂等写入
    ///
    /// # 默认值
    /// - upsert_by_key
    async fn get_persistence_strategy(&self) -> ConfigResult<PersistenceStrategy>;

    /// 获取默认表格链接（界面未填写链接时使用）
    async fn get_default_sheet_url(&self) -> ConfigResult<Option<String>>;
}
