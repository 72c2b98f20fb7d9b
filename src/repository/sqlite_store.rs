// ==========================================
// PlantX 运维智能中台 - 本地 SQLite 记录存储
// ==========================================
// 职责: 离线模式下以 records 表实现 RecordStore
// 结构: (collection, id) 主键, data 为 JSON 对象
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::timestamp::format_iso;
use crate::domain::types::StoreBackend;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{Record, RecordStore};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// SqliteRecordStore
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 创建新的本地存储实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 复用已有连接（与 ConfigManager 共享同一个库）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 内存库（测试用）
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn to_object(value: Value) -> RepositoryResult<Map<String, Value>> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(RepositoryError::ValidationError(format!(
                "记录必须是 JSON 对象: {}",
                other
            ))),
        }
    }

    // 组装返回记录: data + id + created/updated
    fn build_record(id: &str, data: &str, created: &str, updated: &str) -> RepositoryResult<Record> {
        let mut map = Self::to_object(serde_json::from_str(data)?)?;
        map.insert("id".to_string(), Value::String(id.to_string()));
        map.insert("created".to_string(), Value::String(created.to_string()));
        map.insert("updated".to_string(), Value::String(updated.to_string()));
        Ok(Record {
            id: id.to_string(),
            data: map,
        })
    }

    // 系统字段不写入 data
    fn strip_system_fields(map: &mut Map<String, Value>) {
        for key in ["id", "created", "updated", "created_at", "updated_at"] {
            map.remove(key);
        }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }

    async fn get_full_list(&self, collection: &str) -> RepositoryResult<Vec<Record>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, data, created, updated FROM records WHERE collection = ?1 ORDER BY created, id",
        )?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, data, created, updated) = row?;
            records.push(Self::build_record(&id, &data, &created, &updated)?);
        }
        Ok(records)
    }

    async fn create(&self, collection: &str, data: Value) -> RepositoryResult<Record> {
        let mut map = Self::to_object(data)?;
        Self::strip_system_fields(&mut map);

        let id = Uuid::new_v4().simple().to_string();
        let now = format_iso(&Utc::now());
        let payload = serde_json::to_string(&map)?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO records (collection, id, data, created, updated) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![collection, id, payload, now],
        )?;

        Self::build_record(&id, &payload, &now, &now)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> RepositoryResult<Record> {
        let mut patch = Self::to_object(patch)?;
        Self::strip_system_fields(&mut patch);

        let conn = self.get_conn()?;
        let existing: Option<(String, String)> = conn
            .query_row(
                "SELECT data, created FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (data, created) = existing.ok_or_else(|| RepositoryError::NotFound {
            entity: collection.to_string(),
            id: id.to_string(),
        })?;

        let mut merged = Self::to_object(serde_json::from_str(&data)?)?;
        for (key, value) in patch {
            merged.insert(key, value);
        }

        let now = format_iso(&Utc::now());
        let payload = serde_json::to_string(&merged)?;
        conn.execute(
            "UPDATE records SET data = ?1, updated = ?2 WHERE collection = ?3 AND id = ?4",
            params![payload, now, collection, id],
        )?;

        Self::build_record(id, &payload, &created, &now)
    }

    async fn delete(&self, collection: &str, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
