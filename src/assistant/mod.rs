// ==========================================
// PlantX 运维智能中台 - AI 助手层
// ==========================================
// 职责: 托管 LLM 提供方分发、本地模型服务、离线演示回答
// ==========================================

pub mod ai_client;
pub mod demo;
pub mod error;
pub mod ollama;
pub mod prompt;
pub mod provider;

pub use ai_client::AiClient;
pub use error::{AssistantError, AssistantResult};
pub use ollama::OllamaClient;
pub use provider::ProviderEndpoints;
