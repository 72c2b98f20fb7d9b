// ==========================================
// PlantX 运维智能中台 - 本地模型服务客户端
// ==========================================
// 接口:
// - POST /api/chat (stream=false)
// - GET  /api/tags  （模型列表 / 连通性检测）
// ==========================================

use crate::assistant::error::{AssistantError, AssistantResult};
use crate::assistant::prompt::{extract_sop_steps, sop_messages, ticket_resolution_messages};
use crate::domain::ai::{ChatMessage, LocalModel, SopDocument, SopRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<LocalModel>,
}

// ==========================================
// OllamaClient
// ==========================================
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// # 参数
    /// - base_url: 服务地址（如 http://localhost:11434）
    /// - model: 默认模型
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, model)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 单轮对话（非流式）
    #[instrument(skip(self, messages), fields(model))]
    pub async fn chat(&self, messages: &[ChatMessage], model: Option<&str>) -> AssistantResult<String> {
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(self.model.as_str());
        tracing::Span::current().record("model", model);

        let resp = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest {
                model,
                messages,
                stream: false,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "本地模型请求失败");
            return Err(AssistantError::ProviderError {
                provider: "Ollama".to_string(),
                status: Some(status.as_u16()),
                message: format!("Ollama request failed: {}", status.as_u16()),
            });
        }

        let body: ChatResponse = resp.json().await?;
        debug!(chars = body.message.content.len(), "本地模型已响应");
        Ok(body.message.content)
    }

    /// 已安装模型列表
    pub async fn list_models(&self) -> AssistantResult<Vec<LocalModel>> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AssistantError::ProviderError {
                provider: "Ollama".to_string(),
                status: Some(status.as_u16()),
                message: "Failed to connect".to_string(),
            });
        }

        let tags: TagsResponse = resp.json().await?;
        Ok(tags.models)
    }

    /// 连通性检测
    ///
    /// # 返回
    /// - Ok(n): 已连接，发现 n 个模型
    /// - Err: 服务不可达或返回错误
    pub async fn test_connection(&self) -> AssistantResult<usize> {
        let models = self.list_models().await?;
        info!(base_url = %self.base_url, models = models.len(), "本地模型服务已连接");
        Ok(models.len())
    }

    /// 生成工单处置方案
    pub async fn generate_ticket_resolution(
        &self,
        title: &str,
        description: &str,
        priority: &str,
    ) -> AssistantResult<String> {
        let messages = ticket_resolution_messages(title, description, priority);
        self.chat(&messages, None).await
    }

    /// 生成 SOP，并提取结构化步骤
    pub async fn generate_sop(&self, request: &SopRequest) -> AssistantResult<SopDocument> {
        let messages = sop_messages(request);
        let content = self.chat(&messages, None).await?;
        let steps = extract_sop_steps(&content);
        debug!(steps = steps.len(), "SOP 步骤提取完成");
        Ok(SopDocument { content, steps })
    }
}
