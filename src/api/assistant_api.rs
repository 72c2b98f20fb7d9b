// ==========================================
// PlantX 运维智能中台 - AI 助手API
// ==========================================
// 职责: 问答、工单处置方案、SOP 生成、本地模型服务管理
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::assistant::error::AssistantError;
use crate::assistant::AiClient;
use crate::config::AiConfigReader;
use crate::domain::ai::{AiAnswer, AiQuery, LocalModel, SopDocument, SopRequest};
use crate::domain::types::AiProviderKind;
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 本地模型服务连通性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalConnectionStatus {
    pub connected: bool,
    pub model_count: usize,
    pub message: String,
}

/// AI 助手API
pub struct AssistantApi<C>
where
    C: AiConfigReader,
{
    client: AiClient<C>,
}

impl<C> AssistantApi<C>
where
    C: AiConfigReader,
{
    pub fn new(config: Arc<C>) -> Self {
        Self::with_client(AiClient::new(config))
    }

    pub fn with_client(client: AiClient<C>) -> Self {
        Self { client }
    }

    /// 问答
    ///
    /// # 参数
    /// - provider: 提供方名称（openai / deepseek / gemini / llama / anthropic / huggingface / ollama）
    /// - api_key: 请求携带的 Key（优先于配置与环境变量）
    ///
    /// # 返回
    /// - Ok(AiAnswer): 纯文本应答（mode 区分真实调用与演示回答）
    /// - Err(ApiError::InvalidInput): 未知提供方或问题为空
    pub async fn ask(
        &self,
        provider: &str,
        question: &str,
        context: &str,
        api_key: Option<&str>,
        model: Option<&str>,
    ) -> ApiResult<AiAnswer> {
        let provider: AiProviderKind = provider
            .parse()
            .map_err(|_| AssistantError::UnsupportedProvider(provider.trim().to_string()))?;

        let mut query = AiQuery::new(provider, question).with_context(context);
        if let Some(key) = api_key {
            query = query.with_api_key(key);
        }
        if let Some(model) = model {
            query = query.with_model(model);
        }
        self.ask_query(&query).await
    }

    /// 问答（已构造的请求）
    #[instrument(skip(self, query), fields(provider = %query.provider))]
    pub async fn ask_query(&self, query: &AiQuery) -> ApiResult<AiAnswer> {
        if query.question.trim().is_empty() {
            return Err(ApiError::InvalidInput(t("assistant.empty_question")));
        }
        Ok(self.client.ask(query).await?)
    }

    /// 工单处置方案（本地模型）
    pub async fn resolve_ticket(
        &self,
        title: &str,
        description: &str,
        priority: &str,
    ) -> ApiResult<String> {
        let ollama = self.client.ollama().await?;
        Ok(ollama
            .generate_ticket_resolution(title, description, priority)
            .await?)
    }

    /// 生成 SOP（本地模型）
    pub async fn generate_sop(&self, request: &SopRequest) -> ApiResult<SopDocument> {
        if request.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("SOP 标题不能为空".to_string()));
        }
        let ollama = self.client.ollama().await?;
        Ok(ollama.generate_sop(request).await?)
    }

    /// 本地已安装模型
    pub async fn list_local_models(&self) -> ApiResult<Vec<LocalModel>> {
        let ollama = self.client.ollama().await?;
        Ok(ollama.list_models().await?)
    }

    /// 本地模型服务连通性检测（不可达时返回 connected=false，不报错）
    pub async fn test_local_connection(&self) -> ApiResult<LocalConnectionStatus> {
        let ollama = self.client.ollama().await?;
        match ollama.test_connection().await {
            Ok(count) => {
                info!(models = count, "本地模型服务连通");
                Ok(LocalConnectionStatus {
                    connected: true,
                    model_count: count,
                    message: t_with_args(
                        "assistant.ollama_connected",
                        &[("count", &count.to_string())],
                    ),
                })
            }
            Err(err) => {
                warn!(error = %err, "本地模型服务不可达");
                Ok(LocalConnectionStatus {
                    connected: false,
                    model_count: 0,
                    message: t("assistant.ollama_unreachable"),
                })
            }
        }
    }
}
