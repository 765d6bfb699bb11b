// HTTP-level tests for the provider adapters
//
// Each adapter is pointed at a wiremock server and checked for the request it
// sends and the normalized response it builds.

use agentry_providers::gemini::GEMINI_USAGE_NOTE;
use agentry_providers::types::USAGE_UNAVAILABLE_NOTE;
use agentry_providers::{
    GeminiProvider, OpenAiProvider, OpenRouterProvider, PromptProvider, PromptRequest,
    RequestryProvider, ResponseStatus,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_body(content: &str, with_usage: bool) -> serde_json::Value {
    let mut body = json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    });
    if with_usage {
        body["usage"] = json!({"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17});
    }
    body
}

// =============================================================================
// OpenAI
// =============================================================================

#[tokio::test]
async fn test_openai_success_with_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 100,
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Hi there", true)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::with_base_url(Some("sk-test".into()), &server.uri());
    let response = provider.process_prompt(&PromptRequest::new("Hello")).await;

    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.message, "Hi there");
    assert_eq!(response.model, "gpt-4o-mini");
    let usage = response.usage.unwrap();
    assert_eq!(usage.total_tokens, 17);
    assert!(usage.note.is_none());
}

#[tokio::test]
async fn test_openai_rate_limit_is_categorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::with_base_url(Some("sk-test".into()), &server.uri());
    let response = provider
        .process_prompt(&PromptRequest::new("Hello").with_model("gpt-4o"))
        .await;

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.model, "gpt-4o");
    assert!(response.message.starts_with("Rate limit exceeded: "));
    assert!(response.usage.is_none());
}

// =============================================================================
// Requestry
// =============================================================================

#[tokio::test]
async fn test_requestry_missing_usage_is_noted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "cline/o3-mini",
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "Ping"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Pong", false)))
        .mount(&server)
        .await;

    let provider = RequestryProvider::with_base_url(Some("rq-key".into()), &server.uri());
    let response = provider.process_prompt(&PromptRequest::new("Ping")).await;

    assert!(response.is_success());
    assert_eq!(response.message, "Pong");
    let usage = response.usage.unwrap();
    assert_eq!(usage.total_tokens, 0);
    assert_eq!(usage.note.as_deref(), Some(USAGE_UNAVAILABLE_NOTE));
}

#[tokio::test]
async fn test_requestry_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let provider = RequestryProvider::with_base_url(Some("rq-key".into()), &server.uri());
    let response = provider.process_prompt(&PromptRequest::new("Ping")).await;

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.message, "Requestry API error: HTTP 502: bad gateway");
}

// =============================================================================
// OpenRouter
// =============================================================================

#[tokio::test]
async fn test_openrouter_sends_ranking_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("HTTP-Referer", "https://agentry.dev"))
        .and(header("X-Title", "Agentry"))
        .and(body_partial_json(json!({"model": "openai/gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("routed", true)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_base_url(
        Some("or-key".into()),
        Some("https://agentry.dev".into()),
        Some("Agentry".into()),
        &server.uri(),
    );
    let response = provider.process_prompt(&PromptRequest::new("route me")).await;

    assert!(response.is_success());
    assert_eq!(response.message, "routed");
    assert_eq!(response.model, "openai/gpt-4o");
}

#[tokio::test]
async fn test_openrouter_missing_key() {
    let provider = OpenRouterProvider::new(None, None, None);
    let response = provider.process_prompt(&PromptRequest::new("hi")).await;
    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.message, "OPENROUTER_API_KEY is not set");
}

// =============================================================================
// Gemini
// =============================================================================

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .and(query_param("key", "gm-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Write a haiku"}]}],
            "systemInstruction": {"parts": [{"text": "Be brief"}]},
            "generationConfig": {"maxOutputTokens": 100}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Quiet autumn pond"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url(Some("gm-key".into()), &server.uri());
    let request = PromptRequest::new("Write a haiku")
        .with_model("gemini-1.5-pro")
        .with_system_message("Be brief");
    let response = provider.process_prompt(&request).await;

    assert!(response.is_success());
    assert_eq!(response.message, "Quiet autumn pond");
    assert_eq!(response.model, "gemini-1.5-pro");
    let usage = response.usage.unwrap();
    // (13 + 8) / 4 and 17 / 4
    assert_eq!(usage.prompt_tokens, 5);
    assert_eq!(usage.completion_tokens, 4);
    assert_eq!(usage.note.as_deref(), Some(GEMINI_USAGE_NOTE));
}

#[tokio::test]
async fn test_gemini_unsupported_model_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.0-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url(Some("gm-key".into()), &server.uri());
    let response = provider
        .process_prompt(&PromptRequest::new("hi").with_model("gemini-ultra-9"))
        .await;

    assert!(response.is_success());
    assert_eq!(response.model, "gemini-1.0-pro");
}

#[tokio::test]
async fn test_gemini_error_is_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url(Some("bad".into()), &server.uri());
    let response = provider.process_prompt(&PromptRequest::new("hi")).await;

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(
        response.message,
        "Error processing prompt: HTTP 400: API key not valid"
    );
}
