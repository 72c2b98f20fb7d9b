// ==========================================
// PlantX 运维智能中台 - AI 助手领域模型
// ==========================================
// 职责: 统一的 AI 问答请求/应答、本地模型与 SOP 结构
// ==========================================

use crate::domain::types::AiProviderKind;
use serde::{Deserialize, Serialize};

/// 统一问答请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiQuery {
    pub provider: AiProviderKind,
    pub question: String,
    #[serde(default)]
    pub context: String,
    #[serde(default, alias = "user_api_key")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl AiQuery {
    pub fn new(provider: AiProviderKind, question: impl Into<String>) -> Self {
        Self {
            provider,
            question: question.into(),
            context: String::new(),
            api_key: None,
            model: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// 应答来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    Live, // 真实调用
    Demo, // 离线演示（无 API Key）
}

/// 统一问答应答（不论提供方，归约为纯文本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnswer {
    pub provider: AiProviderKind,
    pub mode: AnswerMode,
    pub model: Option<String>,
    pub response: String,
}

/// 对话消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// 本地模型服务中已安装的模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalModel {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<String>,
}

/// SOP 单步
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SopStep {
    pub step: u32,
    pub title: String,
    pub description: String,
    pub safety: Vec<String>,
}

/// SOP 生成请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SopRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub equipment_types: Vec<String>,
    #[serde(default)]
    pub safety_requirements: Vec<String>,
    #[serde(default)]
    pub industry_standards: Vec<String>,
}

/// SOP 生成结果: 原文 + 结构化步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SopDocument {
    pub content: String,
    pub steps: Vec<SopStep>,
}
