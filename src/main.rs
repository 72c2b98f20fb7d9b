// ==========================================
// PlantX 运维智能中台 - 主入口
// ==========================================
// 启动自检: 配置库 → 记录存储 → 本地模型服务
// 界面与导入入口通过库 API 调用（见 plantx_hub::app::AppState）
// ==========================================

use anyhow::Context;
use plantx_hub::app::{get_default_db_path, AppState};
use plantx_hub::db::read_schema_version;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    plantx_hub::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", plantx_hub::APP_NAME);
    tracing::info!("系统版本: {}", plantx_hub::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path).context("无法初始化AppState")?;

    {
        let conn = state.config_manager.connection();
        let guard = conn
            .lock()
            .map_err(|e| anyhow::anyhow!("配置库锁获取失败: {}", e))?;
        let version = read_schema_version(&guard)?;
        tracing::info!("schema_version: {:?}", version);
    }

    let settings = state.config_manager.get_store_settings()?;
    tracing::info!("记录存储后端: {}", settings.backend);

    let tickets = state.ticket_repository().await?;
    match tickets.list().await {
        Ok(list) => tracing::info!(
            collection = tickets.collection(),
            count = list.len(),
            "记录存储可用"
        ),
        Err(e) => tracing::warn!(collection = tickets.collection(), "记录存储不可用: {}", e),
    }

    let local = state.assistant_api.test_local_connection().await?;
    if local.connected {
        tracing::info!("{}", local.message);
    } else {
        tracing::warn!("{}", local.message);
    }

    tracing::info!("自检完成");
    Ok(())
}
