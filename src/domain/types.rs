// ==========================================
// PlantX 运维智能中台 - 领域类型定义
// ==========================================
// 职责: 工单状态/优先级闭集、持久化策略、存储后端、AI 提供方
// 红线: 状态与优先级只允许闭集内取值,原始输入不得原样落库
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 工单状态 (Ticket Status)
// ==========================================
// 序列化格式: snake_case (与记录存储一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,       // 新建/打开
    InProgress, // 处理中
    Closed,     // 已关闭/已解决
    Pending,    // 挂起
    Cancelled,  // 已取消
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "open"),
            TicketStatus::InProgress => write!(f, "in_progress"),
            TicketStatus::Closed => write!(f, "closed"),
            TicketStatus::Pending => write!(f, "pending"),
            TicketStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==========================================
// 工单优先级 (Ticket Priority)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Critical, // 紧急
    High,     // 高
    #[default]
    Medium, // 中
    Low,      // 低
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketPriority::Critical => write!(f, "critical"),
            TicketPriority::High => write!(f, "high"),
            TicketPriority::Medium => write!(f, "medium"),
            TicketPriority::Low => write!(f, "low"),
        }
    }
}

// ==========================================
// 持久化策略 (Persistence Strategy)
// ==========================================
// ReplaceAll: 先清空集合再写入（破坏性，非事务）
// UpsertByKey: 按外部工单号更新或新建（幂等）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceStrategy {
    ReplaceAll,
    #[default]
    UpsertByKey,
}

impl fmt::Display for PersistenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceStrategy::ReplaceAll => write!(f, "replace_all"),
            PersistenceStrategy::UpsertByKey => write!(f, "upsert_by_key"),
        }
    }
}

impl FromStr for PersistenceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace_all" | "replace" => Ok(PersistenceStrategy::ReplaceAll),
            "upsert_by_key" | "upsert" => Ok(PersistenceStrategy::UpsertByKey),
            other => Err(format!("未知的持久化策略: {}", other)),
        }
    }
}

// ==========================================
// 记录存储后端 (Store Backend)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    PocketBase, // 自托管记录存储
    Supabase,   // BaaS
    Sqlite,     // 本地离线存储
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::PocketBase => write!(f, "pocketbase"),
            StoreBackend::Supabase => write!(f, "supabase"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pocketbase" => Ok(StoreBackend::PocketBase),
            "supabase" => Ok(StoreBackend::Supabase),
            "sqlite" | "local" => Ok(StoreBackend::Sqlite),
            other => Err(format!("未知的存储后端: {}", other)),
        }
    }
}

// ==========================================
// AI 提供方 (AI Provider)
// ==========================================
// llama 走 Perplexity 托管接口; ollama 为本地模型服务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    OpenAi,
    DeepSeek,
    Gemini,
    Llama,
    Anthropic,
    HuggingFace,
    Ollama,
}

impl AiProviderKind {
    pub const ALL: [AiProviderKind; 7] = [
        AiProviderKind::OpenAi,
        AiProviderKind::DeepSeek,
        AiProviderKind::Gemini,
        AiProviderKind::Llama,
        AiProviderKind::Anthropic,
        AiProviderKind::HuggingFace,
        AiProviderKind::Ollama,
    ];

    /// 配置键/请求中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProviderKind::OpenAi => "openai",
            AiProviderKind::DeepSeek => "deepseek",
            AiProviderKind::Gemini => "gemini",
            AiProviderKind::Llama => "llama",
            AiProviderKind::Anthropic => "anthropic",
            AiProviderKind::HuggingFace => "huggingface",
            AiProviderKind::Ollama => "ollama",
        }
    }

    /// 演示回答中展示的名称
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProviderKind::OpenAi => "OpenAI",
            AiProviderKind::DeepSeek => "DeepSeek",
            AiProviderKind::Gemini => "Gemini",
            AiProviderKind::Llama => "Llama",
            AiProviderKind::Anthropic => "Claude",
            AiProviderKind::HuggingFace => "HuggingFace",
            AiProviderKind::Ollama => "Ollama",
        }
    }

    /// API Key 环境变量名（Ollama 无需 Key）
    pub fn env_key(&self) -> Option<&'static str> {
        match self {
            AiProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            AiProviderKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
            AiProviderKind::Gemini => Some("GEMINI_API_KEY"),
            AiProviderKind::Llama => Some("PERPLEXITY_API_KEY"),
            AiProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            AiProviderKind::HuggingFace => Some("HUGGINGFACE_API_KEY"),
            AiProviderKind::Ollama => None,
        }
    }

    /// 默认模型
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProviderKind::OpenAi => "gpt-4o-mini",
            AiProviderKind::DeepSeek => "deepseek-chat",
            AiProviderKind::Gemini => "gemini-pro",
            AiProviderKind::Llama => "llama-3.1-sonar-small-128k-online",
            AiProviderKind::Anthropic => "claude-3-haiku-20240307",
            AiProviderKind::HuggingFace => "microsoft/DialoGPT-medium",
            AiProviderKind::Ollama => "llama3",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.env_key().is_some()
    }
}

impl fmt::Display for AiProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AiProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        AiProviderKind::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| format!("未知的 AI 提供方: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: TicketStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, TicketStatus::Cancelled);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TicketStatus::default(), TicketStatus::Open);
        assert_eq!(TicketPriority::default(), TicketPriority::Medium);
        assert_eq!(PersistenceStrategy::default(), PersistenceStrategy::UpsertByKey);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<AiProviderKind>(), Ok(AiProviderKind::OpenAi));
        assert_eq!(" ollama ".parse::<AiProviderKind>(), Ok(AiProviderKind::Ollama));
        assert!("mystery".parse::<AiProviderKind>().is_err());
        assert!(!AiProviderKind::Ollama.requires_api_key());
        assert_eq!(AiProviderKind::Llama.env_key(), Some("PERPLEXITY_API_KEY"));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "replace_all".parse::<PersistenceStrategy>(),
            Ok(PersistenceStrategy::ReplaceAll)
        );
        assert_eq!(
            "UPSERT".parse::<PersistenceStrategy>(),
            Ok(PersistenceStrategy::UpsertByKey)
        );
        assert!("merge".parse::<PersistenceStrategy>().is_err());
    }
}
