// ==========================================
// PlantX 运维智能中台 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新、快照管理
// 规则: 已知键写入前校验取值；app.locale 写入后立即切换界面语言
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_keys;
use crate::config::ConfigManager;
use crate::domain::types::{PersistenceStrategy, StoreBackend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const SUPPORTED_LOCALES: [&str; 2] = ["en", "zh-CN"];

/// 配置项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
}

/// 配置管理API
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有 global 配置（密钥类以掩码输出）
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let snapshot = self.config_manager.get_config_snapshot()?;
        let map: BTreeMap<String, String> = serde_json::from_str(&snapshot)
            .map_err(|e| ApiError::InternalError(format!("配置快照解析失败: {}", e)))?;

        Ok(map
            .into_iter()
            .map(|(key, value)| ConfigItem { key, value })
            .collect())
    }

    /// 查询单个配置（原值）
    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.config_manager.get_global_config_value(key)?)
    }

    /// 更新单个配置
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 键为空或取值非法
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }
        validate_value(key, value)?;

        self.config_manager.set_global_config_value(key, value.trim())?;
        if key == config_keys::APP_LOCALE {
            crate::i18n::set_locale(value.trim());
        }

        info!(config_key = key, "配置已更新");
        Ok(())
    }

    /// 删除单个配置（恢复默认值）
    pub fn remove_config(&self, key: &str) -> ApiResult<bool> {
        Ok(self.config_manager.remove_global_config_value(key)?)
    }

    /// 导出配置快照（JSON）
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        Ok(self.config_manager.get_config_snapshot()?)
    }

    /// 从快照恢复配置
    ///
    /// # 返回
    /// - 写入的配置项数量（掩码密钥跳过）
    pub fn restore_from_snapshot(&self, snapshot_json: &str) -> ApiResult<usize> {
        let count = self
            .config_manager
            .restore_config_from_snapshot(snapshot_json)?;
        info!(count, "配置快照已恢复");
        Ok(count)
    }
}

fn validate_value(key: &str, value: &str) -> ApiResult<()> {
    let invalid = |reason: String| ApiError::InvalidInput(format!("{}: {}", key, reason));

    match key {
        config_keys::STORE_BACKEND => {
            value.parse::<StoreBackend>().map_err(invalid)?;
        }
        config_keys::IMPORT_STRATEGY => {
            value.parse::<PersistenceStrategy>().map_err(invalid)?;
        }
        config_keys::AI_DEMO_MODE => {
            if !matches!(
                value.trim().to_lowercase().as_str(),
                "true" | "false" | "1" | "0" | "yes" | "no" | "on" | "off"
            ) {
                return Err(invalid(format!("不是布尔值: {}", value)));
            }
        }
        config_keys::APP_LOCALE => {
            if !SUPPORTED_LOCALES.contains(&value.trim()) {
                return Err(invalid(format!("不支持的语言: {}", value)));
            }
        }
        config_keys::POCKETBASE_URL | config_keys::SUPABASE_URL | config_keys::OLLAMA_URL => {
            reqwest::Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
        }
        _ => {}
    }
    Ok(())
}
