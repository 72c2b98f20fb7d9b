// ==========================================
// PlantX 运维智能中台 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 装配: 配置库 → 记录存储 → 导入器 → API
// ==========================================

use std::sync::Arc;

use crate::api::{ApiError, ApiResult, AssistantApi, ConfigApi, ImportApi};
use crate::config::{ConfigManager, ImportConfigReader, StoreSettings};
use crate::domain::types::StoreBackend;
use crate::importer::TicketImporterImpl;
use crate::repository::{
    PocketBaseStore, RecordStore, SqliteRecordStore, SupabaseStore, TicketRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PLANTX_HUB_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 当前记录存储
    pub store: Arc<dyn RecordStore>,

    /// 工单导入API
    pub import_api: Arc<ImportApi>,

    /// AI 助手API
    pub assistant_api: Arc<AssistantApi<ConfigManager>>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 本地数据库文件路径（配置表与离线记录存储共用）
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开配置库并建表
    /// 2. 按 store.backend 构造记录存储
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let config_manager = Arc::new(ConfigManager::new(&db_path)?);
        let settings = config_manager.get_store_settings()?;
        let store = build_store(&settings, &config_manager)?;

        Ok(Self::from_parts(db_path, config_manager, store))
    }

    /// 由已构造的配置与存储装配（测试与运维工具使用）
    pub fn from_parts(
        db_path: String,
        config_manager: Arc<ConfigManager>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        match config_manager.get_locale() {
            Ok(locale) => crate::i18n::set_locale(&locale),
            Err(e) => tracing::warn!("界面语言读取失败(使用默认语言): {}", e),
        }

        let importer = Arc::new(TicketImporterImpl::with_defaults(
            store.clone(),
            config_manager.clone(),
        ));
        let import_config: Arc<dyn ImportConfigReader> = config_manager.clone();
        let import_api = Arc::new(ImportApi::new(importer, import_config));
        let assistant_api = Arc::new(AssistantApi::new(config_manager.clone()));
        let config_api = Arc::new(ConfigApi::new(config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Self {
            db_path,
            config_manager,
            store,
            import_api,
            assistant_api,
            config_api,
        }
    }

    /// 当前导入集合上的工单仓储
    pub async fn ticket_repository(&self) -> ApiResult<TicketRepository> {
        let collection = self.config_manager.get_collection_name().await?;
        Ok(TicketRepository::new(self.store.clone(), collection))
    }
}

/// 按存储配置构造记录存储
///
/// # 返回
/// - Err(ApiError::InvalidInput): Supabase 缺少 URL 或 Key
pub fn build_store(
    settings: &StoreSettings,
    config_manager: &ConfigManager,
) -> ApiResult<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match settings.backend {
        StoreBackend::PocketBase => {
            tracing::info!("记录存储: PocketBase {}", settings.pocketbase_url);
            Arc::new(
                PocketBaseStore::new(settings.pocketbase_url.clone())
                    .with_auth_token(settings.pocketbase_token.clone()),
            )
        }
        StoreBackend::Supabase => {
            let (url, key) = match (&settings.supabase_url, &settings.supabase_key) {
                (Some(url), Some(key)) => (url.clone(), key.clone()),
                _ => {
                    return Err(ApiError::InvalidInput(
                        "Supabase 后端需要配置 store.supabase_url 与 store.supabase_key".to_string(),
                    ))
                }
            };
            tracing::info!("记录存储: Supabase {}", url);
            Arc::new(SupabaseStore::new(url, key))
        }
        StoreBackend::Sqlite => {
            tracing::info!("记录存储: 本地 SQLite");
            Arc::new(SqliteRecordStore::from_connection(
                config_manager.connection(),
            )?)
        }
    };
    Ok(store)
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 PLANTX_HUB_DB_PATH；否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./plantx_hub.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("plantx-hub");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("plantx_hub.db");
        }
    }

    path.to_string_lossy().to_string()
}
