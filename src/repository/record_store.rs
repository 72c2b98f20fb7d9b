// ==========================================
// PlantX 运维智能中台 - 记录存储 Trait
// ==========================================
// 职责: 定义集合级 CRUD 接口（不包含实现）
// 实现者: PocketBaseStore / SupabaseStore / SqliteRecordStore
// 红线: 存储层不含业务规则，只做记录 CRUD
// ==========================================

use crate::domain::types::StoreBackend;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

// ==========================================
// Record - 存储返回的通用记录
// ==========================================
// data 保留存储返回的全部字段（含 id 与系统时间戳）
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Record {
    /// 从 JSON 对象构造记录（id 可为字符串或数字）
    pub fn from_value(value: Value) -> RepositoryResult<Self> {
        let data = match value {
            Value::Object(map) => map,
            other => {
                return Err(RepositoryError::SerializationError(format!(
                    "记录不是 JSON 对象: {}",
                    other
                )))
            }
        };

        let id = match data.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(RepositoryError::SerializationError(
                    "记录缺少 id 字段".to_string(),
                ))
            }
        };

        Ok(Self { id, data })
    }

    /// 读取字符串字段（空串视为无）
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 反序列化为领域实体
    pub fn to_entity<T: DeserializeOwned>(&self) -> RepositoryResult<T> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }
}

// ==========================================
// RecordStore Trait
// ==========================================
// 用途: 导入管道与工单仓储的唯一存储入口（显式传入，可替换为测试替身）
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 存储后端类型
    fn backend(&self) -> StoreBackend;

    /// 读取集合全部记录
    async fn get_full_list(&self, collection: &str) -> RepositoryResult<Vec<Record>>;

    /// 新建记录
    ///
    /// # 参数
    /// - collection: 集合名
    /// - data: JSON 对象（不含 id，由存储分配）
    async fn create(&self, collection: &str, data: Value) -> RepositoryResult<Record>;

    /// 按 id 局部更新记录
    async fn update(&self, collection: &str, id: &str, patch: Value) -> RepositoryResult<Record>;

    /// 按 id 删除记录
    async fn delete(&self, collection: &str, id: &str) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_value() {
        let record = Record::from_value(json!({"id": "r1", "title": "  Pump  "})).unwrap();
        assert_eq!(record.id, "r1");
        assert_eq!(record.get_str("title"), Some("Pump"));
        assert_eq!(record.get_str("missing"), None);
    }

    #[test]
    fn test_record_numeric_id() {
        let record = Record::from_value(json!({"id": 42})).unwrap();
        assert_eq!(record.id, "42");
    }

    #[test]
    fn test_record_without_id() {
        assert!(Record::from_value(json!({"title": "x"})).is_err());
        assert!(Record::from_value(json!(["x"])).is_err());
    }
}
