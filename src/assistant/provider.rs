// ==========================================
// PlantX 运维智能中台 - 托管 AI 提供方调用
// ==========================================
// 职责: 按提供方构造请求体、解析响应为纯文本
// 形态:
// - openai / deepseek / llama(perplexity): chat/completions
// - gemini: models/{model}:generateContent?key=
// - anthropic: messages (x-api-key)
// - huggingface: models/{model} inputs
// ==========================================

use crate::assistant::error::{AssistantError, AssistantResult};
use crate::assistant::prompt::{chat_messages, combined_prompt};
use crate::domain::types::AiProviderKind;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{debug, instrument};

pub const MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const LLAMA_TEMPERATURE: f64 = 0.2;
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// 各提供方接口根地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub openai: String,
    pub deepseek: String,
    pub gemini: String,
    pub perplexity: String,
    pub anthropic: String,
    pub huggingface: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai: "https://api.openai.com/v1".to_string(),
            deepseek: "https://api.deepseek.com/v1".to_string(),
            gemini: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            perplexity: "https://api.perplexity.ai".to_string(),
            anthropic: "https://api.anthropic.com/v1".to_string(),
            huggingface: "https://api-inference.huggingface.co/models".to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// 所有提供方指向同一根地址（本地代理或测试服务器）
    pub fn uniform(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            openai: base.clone(),
            deepseek: base.clone(),
            gemini: base.clone(),
            perplexity: base.clone(),
            anthropic: base.clone(),
            huggingface: base,
        }
    }
}

/// 单次托管调用参数
#[derive(Debug, Clone)]
pub struct HostedCall<'a> {
    pub provider: AiProviderKind,
    pub api_key: &'a str,
    pub model: &'a str,
    pub context: &'a str,
    pub question: &'a str,
}

fn temperature_for(provider: AiProviderKind) -> f64 {
    match provider {
        AiProviderKind::Llama => LLAMA_TEMPERATURE,
        _ => DEFAULT_TEMPERATURE,
    }
}

fn chat_completions_body(call: &HostedCall<'_>) -> Value {
    json!({
        "model": call.model,
        "messages": chat_messages(call.context, call.question),
        "temperature": temperature_for(call.provider),
        "max_tokens": MAX_TOKENS,
    })
}

/// 构造请求
pub fn build_request(
    client: &Client,
    endpoints: &ProviderEndpoints,
    call: &HostedCall<'_>,
) -> AssistantResult<RequestBuilder> {
    let bearer = format!("Bearer {}", call.api_key);

    let builder = match call.provider {
        AiProviderKind::OpenAi => client
            .post(format!("{}/chat/completions", endpoints.openai))
            .header("Authorization", bearer)
            .json(&chat_completions_body(call)),
        AiProviderKind::DeepSeek => client
            .post(format!("{}/chat/completions", endpoints.deepseek))
            .header("Authorization", bearer)
            .json(&chat_completions_body(call)),
        AiProviderKind::Llama => client
            .post(format!("{}/chat/completions", endpoints.perplexity))
            .header("Authorization", bearer)
            .json(&chat_completions_body(call)),
        AiProviderKind::Gemini => client
            .post(format!("{}/models/{}:generateContent", endpoints.gemini, call.model))
            .query(&[("key", call.api_key)])
            .json(&json!({
                "contents": [{
                    "parts": [{ "text": combined_prompt(call.context, call.question) }]
                }],
                "generationConfig": {
                    "temperature": DEFAULT_TEMPERATURE,
                    "maxOutputTokens": MAX_TOKENS,
                }
            })),
        AiProviderKind::Anthropic => client
            .post(format!("{}/messages", endpoints.anthropic))
            .header("x-api-key", call.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": call.model,
                "max_tokens": MAX_TOKENS,
                "messages": [{
                    "role": "user",
                    "content": combined_prompt(call.context, call.question),
                }]
            })),
        AiProviderKind::HuggingFace => client
            .post(format!("{}/{}", endpoints.huggingface, call.model))
            .header("Authorization", bearer)
            .json(&json!({
                "inputs": combined_prompt(call.context, call.question),
                "parameters": {
                    "max_length": MAX_TOKENS,
                    "temperature": DEFAULT_TEMPERATURE,
                }
            })),
        AiProviderKind::Ollama => {
            return Err(AssistantError::UnsupportedProvider(
                "ollama 不走托管接口".to_string(),
            ))
        }
    };

    Ok(builder)
}

/// 响应体中的错误信息（error.message 或 error 字符串）
fn error_message(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
            .or_else(|| Some(Value::Object(obj.clone()).to_string())),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// 按提供方响应形态归约为纯文本
pub fn extract_text(provider: AiProviderKind, body: &Value) -> Option<String> {
    let text = match provider {
        AiProviderKind::OpenAi | AiProviderKind::DeepSeek | AiProviderKind::Llama => {
            body.pointer("/choices/0/message/content")
        }
        AiProviderKind::Gemini => body.pointer("/candidates/0/content/parts/0/text"),
        AiProviderKind::Anthropic => body.pointer("/content/0/text"),
        AiProviderKind::HuggingFace => body
            .pointer("/0/generated_text")
            .or_else(|| body.get("generated_text")),
        AiProviderKind::Ollama => body.pointer("/message/content"),
    };

    text.and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty())
}

/// 调用托管提供方并返回纯文本
#[instrument(skip(client, endpoints, call), fields(provider = %call.provider, model = %call.model))]
pub async fn query_hosted(
    client: &Client,
    endpoints: &ProviderEndpoints,
    call: &HostedCall<'_>,
) -> AssistantResult<String> {
    let resp = build_request(client, endpoints, call)?.send().await?;
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    debug!(status = status.as_u16(), "提供方已响应");

    if let Some(message) = error_message(&body) {
        return Err(AssistantError::ProviderError {
            provider: call.provider.display_name().to_string(),
            status: Some(status.as_u16()),
            message,
        });
    }
    if !status.is_success() {
        return Err(AssistantError::ProviderError {
            provider: call.provider.display_name().to_string(),
            status: Some(status.as_u16()),
            message: status.to_string(),
        });
    }

    extract_text(call.provider, &body).ok_or_else(|| AssistantError::EmptyResponse {
        provider: call.provider.display_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_shapes() {
        let openai = json!({"choices": [{"message": {"content": "a"}}]});
        assert_eq!(extract_text(AiProviderKind::OpenAi, &openai).as_deref(), Some("a"));

        let gemini = json!({"candidates": [{"content": {"parts": [{"text": "b"}]}}]});
        assert_eq!(extract_text(AiProviderKind::Gemini, &gemini).as_deref(), Some("b"));

        let anthropic = json!({"content": [{"type": "text", "text": "c"}]});
        assert_eq!(extract_text(AiProviderKind::Anthropic, &anthropic).as_deref(), Some("c"));

        let hf_list = json!([{"generated_text": "d"}]);
        assert_eq!(extract_text(AiProviderKind::HuggingFace, &hf_list).as_deref(), Some("d"));
        let hf_obj = json!({"generated_text": "e"});
        assert_eq!(extract_text(AiProviderKind::HuggingFace, &hf_obj).as_deref(), Some("e"));

        assert_eq!(extract_text(AiProviderKind::OpenAi, &json!({})), None);
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(&json!({"error": {"message": "bad key"}})).as_deref(),
            Some("bad key")
        );
        assert_eq!(
            error_message(&json!({"error": "Model is loading"})).as_deref(),
            Some("Model is loading")
        );
        assert_eq!(error_message(&json!({"error": null})), None);
        assert_eq!(error_message(&json!({"choices": []})), None);
    }

    #[test]
    fn test_temperature() {
        assert_eq!(temperature_for(AiProviderKind::Llama), 0.2);
        assert_eq!(temperature_for(AiProviderKind::OpenAi), 0.7);
    }
}
