// ==========================================
// PlantX 运维智能中台 - AI 问答分发
// ==========================================
// 职责: 统一问答请求 → 提供方调用 → 纯文本应答
// API Key 查找: 请求 → config_kv → 环境变量
// 无 Key 时: 演示模式返回固定回答（标记 Demo），否则报错
// ==========================================

use crate::assistant::demo::demo_answer;
use crate::assistant::error::{AssistantError, AssistantResult};
use crate::assistant::ollama::OllamaClient;
use crate::assistant::prompt::chat_messages;
use crate::assistant::provider::{query_hosted, HostedCall, ProviderEndpoints};
use crate::config::AiConfigReader;
use crate::domain::ai::{AiAnswer, AiQuery, AnswerMode};
use crate::domain::types::AiProviderKind;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, instrument, warn};

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ==========================================
// AiClient
// ==========================================
pub struct AiClient<C>
where
    C: AiConfigReader,
{
    client: Client,
    config: Arc<C>,
    endpoints: ProviderEndpoints,
}

impl<C> AiClient<C>
where
    C: AiConfigReader,
{
    pub fn new(config: Arc<C>) -> Self {
        Self::with_endpoints(config, ProviderEndpoints::default())
    }

    /// 指定提供方根地址（代理或测试服务器）
    pub fn with_endpoints(config: Arc<C>, endpoints: ProviderEndpoints) -> Self {
        Self {
            client: Client::new(),
            config,
            endpoints,
        }
    }

    /// 按配置构造本地模型客户端
    pub async fn ollama(&self) -> AssistantResult<OllamaClient> {
        let url = self.config.get_ollama_url().await?;
        let model = self.config.get_ollama_model().await?;
        Ok(OllamaClient::with_client(self.client.clone(), url, model))
    }

    async fn resolve_api_key(&self, query: &AiQuery) -> AssistantResult<Option<String>> {
        if let Some(key) = non_blank(query.api_key.as_deref()) {
            return Ok(Some(key));
        }
        Ok(self.config.get_api_key(query.provider).await?)
    }

    async fn resolve_model(&self, query: &AiQuery) -> AssistantResult<String> {
        if let Some(model) = non_blank(query.model.as_deref()) {
            return Ok(model);
        }
        Ok(self
            .config
            .get_model(query.provider)
            .await?
            .unwrap_or_else(|| query.provider.default_model().to_string()))
    }

    /// 统一问答
    #[instrument(skip(self, query), fields(provider = %query.provider))]
    pub async fn ask(&self, query: &AiQuery) -> AssistantResult<AiAnswer> {
        if query.provider == AiProviderKind::Ollama {
            let ollama = self.ollama().await?;
            let model = non_blank(query.model.as_deref()).unwrap_or_else(|| ollama.model().to_string());
            let messages = chat_messages(&query.context, &query.question);
            let response = ollama.chat(&messages, Some(&model)).await?;
            return Ok(AiAnswer {
                provider: query.provider,
                mode: AnswerMode::Live,
                model: Some(model),
                response,
            });
        }

        let api_key = match self.resolve_api_key(query).await? {
            Some(key) => key,
            None => {
                if self.config.is_demo_mode_enabled().await? {
                    info!("未配置 API Key，返回离线演示回答");
                    return Ok(AiAnswer {
                        provider: query.provider,
                        mode: AnswerMode::Demo,
                        model: None,
                        response: demo_answer(
                            query.provider.display_name(),
                            &query.question,
                            &query.context,
                        ),
                    });
                }
                warn!("未配置 API Key 且演示模式关闭");
                return Err(AssistantError::MissingApiKey {
                    provider: query.provider.to_string(),
                });
            }
        };

        let model = self.resolve_model(query).await?;
        let call = HostedCall {
            provider: query.provider,
            api_key: &api_key,
            model: &model,
            context: &query.context,
            question: &query.question,
        };
        let response = query_hosted(&self.client, &self.endpoints, &call).await?;

        info!(model = %model, chars = response.len(), "AI 问答完成");
        Ok(AiAnswer {
            provider: query.provider,
            mode: AnswerMode::Live,
            model: Some(model),
            response,
        })
    }
}
