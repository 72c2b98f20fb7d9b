// ==========================================
// PlantX 运维智能中台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入、快照
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::ai_config_trait::AiConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::types::{AiProviderKind, PersistenceStrategy, StoreBackend};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

// ==========================================
// 配置键常量与默认值
// ==========================================
pub mod config_keys {
    // 记录存储
    pub const STORE_BACKEND: &str = "store.backend";
    pub const POCKETBASE_URL: &str = "store.pocketbase_url";
    pub const POCKETBASE_TOKEN: &str = "store.pocketbase_token";
    pub const SUPABASE_URL: &str = "store.supabase_url";
    pub const SUPABASE_KEY: &str = "store.supabase_key";

    // 导入
    pub const IMPORT_COLLECTION: &str = "import.collection";
    pub const IMPORT_STRATEGY: &str = "import.strategy";
    pub const IMPORT_DEFAULT_SHEET_URL: &str = "import.default_sheet_url";

    // 本地模型
    pub const OLLAMA_URL: &str = "ollama.url";
    pub const OLLAMA_MODEL: &str = "ollama.model";

    // AI 助手
    pub const AI_DEMO_MODE: &str = "ai.demo_mode";

    // 界面
    pub const APP_LOCALE: &str = "app.locale";

    /// ai.<provider>.api_key
    pub fn ai_api_key(provider: &str) -> String {
        format!("ai.{}.api_key", provider)
    }

    /// ai.<provider>.model
    pub fn ai_model(provider: &str) -> String {
        format!("ai.{}.model", provider)
    }
}

pub const DEFAULT_COLLECTION: &str = "tickets";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_LOCALE: &str = "en";

// ==========================================
// StoreSettings - 记录存储连接参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub pocketbase_url: String,
    pub pocketbase_token: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 共享底层连接（本地存储复用同一个库）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值（空白值视为未配置）
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    /// 写入 global 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 删除 global 配置（回到默认值）
    pub fn remove_global_config_value(&self, key: &str) -> ConfigResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有 global 配置的快照（JSON格式）
    ///
    /// API Key 类配置以掩码输出
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            let value = if is_secret_key(&key) {
                mask_secret(&value)
            } else {
                value
            };
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照批量写入（掩码值跳过）
    ///
    /// # 返回
    /// - 写入的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            if is_secret_key(key) && value.contains('*') {
                continue;
            }
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 记录存储连接参数
    pub fn get_store_settings(&self) -> ConfigResult<StoreSettings> {
        let raw_backend = self.get_global_config_value(config_keys::STORE_BACKEND)?;
        let backend = match raw_backend {
            Some(raw) => raw.parse::<StoreBackend>().unwrap_or_else(|e| {
                warn!(config_key = config_keys::STORE_BACKEND, raw_value = %raw, error = %e, "存储后端配置非法，使用默认值");
                StoreBackend::default()
            }),
            None => StoreBackend::default(),
        };

        Ok(StoreSettings {
            backend,
            pocketbase_url: self.get_config_or_default(
                config_keys::POCKETBASE_URL,
                crate::repository::DEFAULT_POCKETBASE_URL,
            )?,
            pocketbase_token: self.get_global_config_value(config_keys::POCKETBASE_TOKEN)?,
            supabase_url: self.get_global_config_value(config_keys::SUPABASE_URL)?,
            supabase_key: self.get_global_config_value(config_keys::SUPABASE_KEY)?,
        })
    }

    /// 界面语言
    pub fn get_locale(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::APP_LOCALE, DEFAULT_LOCALE)
    }
}

fn is_secret_key(key: &str) -> bool {
    key.ends_with(".api_key") || key.ends_with("_token") || key.ends_with("_key")
}

fn mask_secret(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{}****", visible)
}

fn parse_bool(key: &str, raw: &str, default: bool) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            warn!(config_key = key, raw_value = %raw, "布尔配置格式错误，使用默认值");
            default
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_collection_name(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::IMPORT_COLLECTION, DEFAULT_COLLECTION)
    }

    async fn get_persistence_strategy(&self) -> ConfigResult<PersistenceStrategy> {
        match self.get_global_config_value(config_keys::IMPORT_STRATEGY)? {
            Some(raw) => raw.parse::<PersistenceStrategy>().map_err(|_| ConfigError::InvalidValue {
                key: config_keys::IMPORT_STRATEGY.to_string(),
                value: raw,
            }),
            None => Ok(PersistenceStrategy::default()),
        }
    }

    async fn get_default_sheet_url(&self) -> ConfigResult<Option<String>> {
        self.get_global_config_value(config_keys::IMPORT_DEFAULT_SHEET_URL)
    }
}

// ==========================================
// AiConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AiConfigReader for ConfigManager {
    async fn get_api_key(&self, provider: AiProviderKind) -> ConfigResult<Option<String>> {
        if let Some(key) = self.get_global_config_value(&config_keys::ai_api_key(provider.as_str()))? {
            return Ok(Some(key));
        }

        Ok(provider
            .env_key()
            .and_then(|name| std::env::var(name).ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn get_model(&self, provider: AiProviderKind) -> ConfigResult<Option<String>> {
        self.get_global_config_value(&config_keys::ai_model(provider.as_str()))
    }

    async fn is_demo_mode_enabled(&self) -> ConfigResult<bool> {
        Ok(match self.get_global_config_value(config_keys::AI_DEMO_MODE)? {
            Some(raw) => parse_bool(config_keys::AI_DEMO_MODE, &raw, true),
            None => true,
        })
    }

    async fn get_ollama_url(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::OLLAMA_URL, DEFAULT_OLLAMA_URL)
    }

    async fn get_ollama_model(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::OLLAMA_MODEL, DEFAULT_OLLAMA_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults() {
        let config = manager();

        assert_eq!(config.get_collection_name().await.unwrap(), "tickets");
        assert_eq!(
            config.get_persistence_strategy().await.unwrap(),
            PersistenceStrategy::UpsertByKey
        );
        assert!(config.get_default_sheet_url().await.unwrap().is_none());
        assert!(config.is_demo_mode_enabled().await.unwrap());
        assert_eq!(config.get_ollama_url().await.unwrap(), DEFAULT_OLLAMA_URL);
        assert_eq!(config.get_ollama_model().await.unwrap(), "llama3");

        let store = config.get_store_settings().unwrap();
        assert_eq!(store.backend, StoreBackend::PocketBase);
        assert_eq!(store.pocketbase_url, "http://127.0.0.1:8090");
    }

    #[tokio::test]
    async fn test_overrides() {
        let config = manager();
        config.set_global_config_value(config_keys::IMPORT_STRATEGY, "replace_all").unwrap();
        config.set_global_config_value(config_keys::AI_DEMO_MODE, "false").unwrap();
        config.set_global_config_value(config_keys::STORE_BACKEND, "sqlite").unwrap();
        config.set_global_config_value(config_keys::IMPORT_COLLECTION, "  ").unwrap();

        assert_eq!(
            config.get_persistence_strategy().await.unwrap(),
            PersistenceStrategy::ReplaceAll
        );
        assert!(!config.is_demo_mode_enabled().await.unwrap());
        assert_eq!(config.get_store_settings().unwrap().backend, StoreBackend::Sqlite);
        // 空白值回退默认
        assert_eq!(config.get_collection_name().await.unwrap(), "tickets");
    }

    #[tokio::test]
    async fn test_invalid_strategy_is_error() {
        let config = manager();
        config.set_global_config_value(config_keys::IMPORT_STRATEGY, "merge").unwrap();
        assert!(matches!(
            config.get_persistence_strategy().await,
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_api_key_from_config_wins() {
        let config = manager();
        config
            .set_global_config_value(&config_keys::ai_api_key("openai"), "sk-config")
            .unwrap();
        assert_eq!(
            config.get_api_key(AiProviderKind::OpenAi).await.unwrap(),
            Some("sk-config".to_string())
        );
        assert_eq!(config.get_api_key(AiProviderKind::Ollama).await.unwrap(), None);
    }

    #[test]
    fn test_snapshot_masks_secrets() {
        let config = manager();
        config.set_global_config_value("ai.openai.api_key", "sk-abcdef").unwrap();
        config.set_global_config_value("import.collection", "tickets").unwrap();

        let snapshot = config.get_config_snapshot().unwrap();
        assert!(snapshot.contains("sk-a****"));
        assert!(!snapshot.contains("sk-abcdef"));

        let other = manager();
        let restored = other.restore_config_from_snapshot(&snapshot).unwrap();
        assert_eq!(restored, 1);
        assert!(other.get_global_config_value("ai.openai.api_key").unwrap().is_none());
    }
}
