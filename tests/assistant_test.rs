// ==========================================
// AI 助手测试
// ==========================================
// 测试目标: 各提供方请求形态、Key/模型解析、离线演示、本地模型服务
// ==========================================


use async_trait::async_trait;
use mockito::Matcher;
use plantx_hub::api::{ApiError, AssistantApi};
use plantx_hub::assistant::{AiClient, AssistantError, ProviderEndpoints};
use plantx_hub::config::{config_keys, AiConfigReader, ConfigManager, ConfigResult};
use plantx_hub::domain::{AiQuery, AnswerMode, SopRequest};
use plantx_hub::AiProviderKind;
use serde_json::json;
use std::sync::Arc;

// ==========================================
// 固定配置（不读取环境变量）
// ==========================================
#[derive(Clone, Default)]
struct StaticConfig {
    api_key: Option<String>,
    model: Option<String>,
    demo_mode: bool,
    ollama_url: String,
}

#[async_trait]
impl AiConfigReader for StaticConfig {
    async fn get_api_key(&self, _provider: AiProviderKind) -> ConfigResult<Option<String>> {
        Ok(self.api_key.clone())
    }

    async fn get_model(&self, _provider: AiProviderKind) -> ConfigResult<Option<String>> {
        Ok(self.model.clone())
    }

    async fn is_demo_mode_enabled(&self) -> ConfigResult<bool> {
        Ok(self.demo_mode)
    }

    async fn get_ollama_url(&self) -> ConfigResult<String> {
        Ok(self.ollama_url.clone())
    }

    async fn get_ollama_model(&self) -> ConfigResult<String> {
        Ok("llama3".to_string())
    }
}

fn client(server: &mockito::ServerGuard, config: StaticConfig) -> AiClient<StaticConfig> {
    AiClient::with_endpoints(Arc::new(config), ProviderEndpoints::uniform(&server.url()))
}

fn keyed() -> StaticConfig {
    StaticConfig {
        api_key: Some("sk-test".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_openai_request_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.7,
                "max_tokens": 1000,
            })),
            Matcher::Regex(r"Context: Plant A\\n\\nQuestion: Why is the pump noisy\?".to_string()),
            Matcher::Regex("industrial operations assistant".to_string()),
        ]))
        .with_body(json!({"choices": [{"message": {"role": "assistant", "content": "Check the bearings."}}]}).to_string())
        .create_async()
        .await;

    let query = AiQuery::new(AiProviderKind::OpenAi, "Why is the pump noisy?").with_context("Plant A");
    let answer = client(&server, keyed()).ask(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer.mode, AnswerMode::Live);
    assert_eq!(answer.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(answer.response, "Check the bearings.");
}

#[tokio::test]
async fn test_llama_uses_low_temperature() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama-3.1-sonar-small-128k-online",
            "temperature": 0.2,
        })))
        .with_body(json!({"choices": [{"message": {"content": "ok"}}]}).to_string())
        .create_async()
        .await;

    let query = AiQuery::new(AiProviderKind::Llama, "q");
    let answer = client(&server, keyed()).ask(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer.response, "ok");
}

#[tokio::test]
async fn test_gemini_request_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-pro:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "sk-test".into()))
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": {"maxOutputTokens": 1000}
        })))
        .with_body(json!({"candidates": [{"content": {"parts": [{"text": "gemini says hi"}]}}]}).to_string())
        .create_async()
        .await;

    let answer = client(&server, keyed())
        .ask(&AiQuery::new(AiProviderKind::Gemini, "hello"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(answer.response, "gemini says hi");
}

#[tokio::test]
async fn test_anthropic_request_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messages")
        .match_header("x-api-key", "sk-test")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-3-haiku-20240307",
            "max_tokens": 1000,
        })))
        .with_body(json!({"content": [{"type": "text", "text": "claude answer"}]}).to_string())
        .create_async()
        .await;

    let answer = client(&server, keyed())
        .ask(&AiQuery::new(AiProviderKind::Anthropic, "hello"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(answer.response, "claude answer");
}

#[tokio::test]
async fn test_huggingface_request_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/microsoft/DialoGPT-medium")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "parameters": {"max_length": 1000}
        })))
        .with_body(json!([{"generated_text": "hf answer"}]).to_string())
        .create_async()
        .await;

    let answer = client(&server, keyed())
        .ask(&AiQuery::new(AiProviderKind::HuggingFace, "hello"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(answer.response, "hf answer");
}

#[tokio::test]
async fn test_request_key_and_model_override_config() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-request")
        .match_body(Matcher::PartialJson(json!({"model": "deepseek-reasoner"})))
        .with_body(json!({"choices": [{"message": {"content": "ok"}}]}).to_string())
        .create_async()
        .await;

    let config = StaticConfig {
        api_key: Some("sk-config".to_string()),
        model: Some("deepseek-chat".to_string()),
        ..Default::default()
    };
    let query = AiQuery::new(AiProviderKind::DeepSeek, "q")
        .with_api_key("sk-request")
        .with_model("deepseek-reasoner");
    let answer = client(&server, config).ask(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer.model.as_deref(), Some("deepseek-reasoner"));
}

#[tokio::test]
async fn test_provider_error_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(json!({"error": {"message": "Invalid API key", "type": "invalid_request_error"}}).to_string())
        .create_async()
        .await;

    let err = client(&server, keyed())
        .ask(&AiQuery::new(AiProviderKind::OpenAi, "q"))
        .await
        .unwrap_err();

    match err {
        AssistantError::ProviderError {
            provider,
            status,
            message,
        } => {
            assert_eq!(provider, "OpenAI");
            assert_eq!(status, Some(401));
            assert_eq!(message, "Invalid API key");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_response_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_body(json!({"choices": []}).to_string())
        .create_async()
        .await;

    let err = client(&server, keyed())
        .ask(&AiQuery::new(AiProviderKind::OpenAi, "q"))
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::EmptyResponse { .. }));
}

#[tokio::test]
async fn test_demo_mode_without_key() {
    let server = mockito::Server::new_async().await;
    let config = StaticConfig {
        demo_mode: true,
        ..Default::default()
    };

    let answer = client(&server, config)
        .ask(&AiQuery::new(
            AiProviderKind::Anthropic,
            "What are the emergency shutdown procedures?",
        ))
        .await
        .unwrap();

    assert_eq!(answer.mode, AnswerMode::Demo);
    assert!(answer.model.is_none());
    assert!(answer.response.starts_with("**Claude Response:**"));
    assert!(answer.response.contains("Press Emergency Stop"));
}

#[tokio::test]
async fn test_missing_key_when_demo_disabled() {
    let server = mockito::Server::new_async().await;
    let config = StaticConfig {
        demo_mode: false,
        ..Default::default()
    };

    let err = client(&server, config)
        .ask(&AiQuery::new(AiProviderKind::Gemini, "q"))
        .await
        .unwrap_err();

    assert!(matches!(err, AssistantError::MissingApiKey { ref provider } if provider == "gemini"));
}

// ==========================================
// 本地模型服务
// ==========================================

fn local_config(server: &mockito::ServerGuard) -> StaticConfig {
    StaticConfig {
        ollama_url: server.url(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_ollama_chat_without_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({"model": "llama3", "stream": false})))
        .with_body(json!({"model": "llama3", "message": {"role": "assistant", "content": "local answer"}, "done": true}).to_string())
        .create_async()
        .await;

    let answer = AiClient::new(Arc::new(local_config(&server)))
        .ask(&AiQuery::new(AiProviderKind::Ollama, "q"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(answer.mode, AnswerMode::Live);
    assert_eq!(answer.model.as_deref(), Some("llama3"));
    assert_eq!(answer.response, "local answer");
}

#[tokio::test]
async fn test_assistant_api_local_helpers() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/tags")
        .with_body(json!({"models": [
            {"name": "llama3:latest", "size": 4661224676u64, "modified_at": "2024-05-01T10:00:00Z"},
            {"name": "mistral:7b"}
        ]}).to_string())
        .expect_at_least(1)
        .create_async()
        .await;
    server
        .mock("POST", "/api/chat")
        .match_body(Matcher::Regex("Create a detailed SOP".to_string()))
        .with_body(json!({"message": {"content": "Intro\nStep 1: Isolate - Lock out motor - Safety: LOTO, gloves\nStep 2: Drain - Open valve - Safety: Face shield"}}).to_string())
        .create_async()
        .await;

    let api = AssistantApi::new(Arc::new(local_config(&server)));

    let models = api.list_local_models().await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[1].name, "mistral:7b");

    let status = api.test_local_connection().await.unwrap();
    assert!(status.connected);
    assert_eq!(status.model_count, 2);

    let sop = api
        .generate_sop(&SopRequest {
            title: "Pump Isolation".to_string(),
            description: "Isolate centrifugal pump".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(sop.steps.len(), 2);
    assert_eq!(sop.steps[0].safety, vec!["LOTO", "gloves"]);
    assert_eq!(sop.steps[1].title, "Drain");
}

#[tokio::test]
async fn test_local_connection_unreachable() {
    let server = mockito::Server::new_async().await;
    let mut config = local_config(&server);
    config.ollama_url = "http://127.0.0.1:9".to_string();
    drop(server);

    let status = AssistantApi::new(Arc::new(config))
        .test_local_connection()
        .await
        .unwrap();

    assert!(!status.connected);
    assert_eq!(status.model_count, 0);
}

#[tokio::test]
async fn test_assistant_api_rejects_unknown_provider() {
    let (_db, db_path) = test_helpers::create_test_db().unwrap();
    let config = Arc::new(ConfigManager::new(&db_path).unwrap());
    config
        .set_global_config_value(config_keys::AI_DEMO_MODE, "true")
        .unwrap();
    let api = AssistantApi::new(config);

    let err = api.ask("mystery", "q", "", None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = api.ask("openai", "   ", "", None, None).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
