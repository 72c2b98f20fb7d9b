// ==========================================
// PlantX 运维智能中台 - AI 配置读取 Trait
// ==========================================
// 职责: 定义 AI 助手所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::types::AiProviderKind;
use async_trait::async_trait;

// ==========================================
// AiConfigReader Trait
// ==========================================
// 实现者: ConfigManager
#[async_trait]
pub trait AiConfigReader: Send + Sync {
    /// 获取提供方 API Key
    ///
    /// # 查找顺序
    /// 1. config_kv: ai.<provider>.api_key
    /// 2. 环境变量（如 OPENAI_API_KEY）
    async fn get_api_key(&self, provider: AiProviderKind) -> ConfigResult<Option<String>>;

    /// 获取提供方模型覆写（ai.<provider>.model），未配置返回 None
    async fn get_model(&self, provider: AiProviderKind) -> ConfigResult<Option<String>>;

    /// 是否启用离线演示模式
    ///
    /// # 默认值
    /// - true
    async fn is_demo_mode_enabled(&self) -> ConfigResult<bool>;

    /// 本地模型服务地址
    ///
    /// # 默认值
    /// - http://localhost:11434
    async fn get_ollama_url(&self) -> ConfigResult<String>;

    /// 本地默认模型
    ///
    /// # 默认值
    /// - llama3
    async fn get_ollama_model(&self) -> ConfigResult<String>;
}
