// ==========================================
// PlantX 运维智能中台 - 工单仓储
// ==========================================
// 职责: 在 RecordStore 集合之上提供类型化的工单访问
// 红线: Repository 不含业务规则（规范化/校验在导入管道完成）
// ==========================================

use crate::domain::ticket::{NewTicket, Ticket, EXTERNAL_ID_FIELD};
use crate::repository::error::RepositoryResult;
use crate::repository::record_store::{Record, RecordStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// 默认工单集合名
pub const DEFAULT_TICKET_COLLECTION: &str = "tickets";

// ==========================================
// TicketRepository
// ==========================================
#[derive(Clone)]
pub struct TicketRepository {
    store: Arc<dyn RecordStore>,
    collection: String,
}

impl TicketRepository {
    /// 创建工单仓储
    ///
    /// # 参数
    /// - store: 记录存储（显式传入）
    /// - collection: 集合名
    pub fn new(store: Arc<dyn RecordStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// 查询全部工单
    pub async fn list(&self) -> RepositoryResult<Vec<Ticket>> {
        let records = self.store.get_full_list(&self.collection).await?;
        records.iter().map(Record::to_entity).collect()
    }

    /// 新建工单
    pub async fn create(&self, ticket: &NewTicket) -> RepositoryResult<Ticket> {
        let data = serde_json::to_value(ticket)?;
        let record = self.store.create(&self.collection, data).await?;
        record.to_entity()
    }

    /// 按记录 id 覆盖写入工单字段
    pub async fn update(&self, id: &str, ticket: &NewTicket) -> RepositoryResult<Ticket> {
        let patch = serde_json::to_value(ticket)?;
        let record = self.store.update(&self.collection, id, patch).await?;
        record.to_entity()
    }

    pub async fn delete(&self, id: &str) -> RepositoryResult<()> {
        self.store.delete(&self.collection, id).await
    }

    /// 按外部工单号查找
    pub async fn find_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<Ticket>> {
        let key = external_id.trim();
        if key.is_empty() {
            return Ok(None);
        }

        let records = self.store.get_full_list(&self.collection).await?;
        match records
            .iter()
            .find(|r| r.get_str(EXTERNAL_ID_FIELD) == Some(key))
        {
            Some(record) => Ok(Some(record.to_entity()?)),
            None => Ok(None),
        }
    }

    /// 清空集合（逐条删除，非事务）
    ///
    /// 任一删除失败立即返回错误，此前已删除的记录不可恢复
    ///
    /// # 返回
    /// - 删除的记录数
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn clear_all(&self) -> RepositoryResult<usize> {
        let records = self.store.get_full_list(&self.collection).await?;
        let total = records.len();

        for (deleted, record) in records.iter().enumerate() {
            if let Err(e) = self.store.delete(&self.collection, &record.id).await {
                warn!(deleted, total, id = %record.id, error = %e, "清空集合中断");
                return Err(e);
            }
        }

        debug!(total, "集合已清空");
        Ok(total)
    }

    /// 外部工单号 → 记录 id 索引
    ///
    /// 直接读取原始记录，历史数据中的非法 status/priority 不影响索引；
    /// 同一外部工单号出现多次时保留首条
    pub async fn existing_key_index(&self) -> RepositoryResult<HashMap<String, String>> {
        let records = self.store.get_full_list(&self.collection).await?;
        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            if let Some(key) = record.get_str(EXTERNAL_ID_FIELD) {
                index.entry(key.to_string()).or_insert_with(|| record.id.clone());
            }
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{TicketPriority, TicketStatus};
    use crate::repository::sqlite_store::SqliteRecordStore;
    use serde_json::json;

    fn sample(title: &str, external_id: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            description: String::new(),
            status: TicketStatus::Open,
            priority: TicketPriority::Medium,
            assigned_to: String::new(),
            site_id: String::new(),
            external_id: external_id.to_string(),
            due_date: None,
        }
    }

    fn repo() -> TicketRepository {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        TicketRepository::new(Arc::new(store), DEFAULT_TICKET_COLLECTION)
    }

    #[tokio::test]
    async fn test_create_and_find_by_external_id() {
        let repo = repo();
        let created = repo.create(&sample("Pump Check", "INC001")).await.unwrap();
        repo.create(&sample("Valve Check", "")).await.unwrap();

        let found = repo.find_by_external_id(" INC001 ").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.find_by_external_id("").await.unwrap().is_none());
        assert!(repo.find_by_external_id("INC999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let repo = repo();
        repo.create(&sample("A", "1")).await.unwrap();
        repo.create(&sample("B", "2")).await.unwrap();

        assert_eq!(repo.clear_all().await.unwrap(), 2);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_key_index_tolerates_legacy_values() {
        let repo = repo();
        let first = repo
            .store()
            .create("tickets", json!({"title": "Old", "status": "WIP", "servicenow_id": "INC7"}))
            .await
            .unwrap();
        repo.store()
            .create("tickets", json!({"title": "Dup", "servicenow_id": "INC7"}))
            .await
            .unwrap();

        let index = repo.existing_key_index().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("INC7"), Some(&first.id));
    }
}
