// OpenAI adapter

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{error, info};

use crate::client::{usage_or_unavailable, ChatCompletionsClient, ChatMessage};
use crate::error::ProviderError;
use crate::types::{PromptRequest, ProviderResponse};
use crate::PromptProvider;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Option<ChatCompletionsClient>,
}

impl OpenAiProvider {
    /// `None` or an empty key leaves the provider unconfigured
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        let client = api_key
            .filter(|k| !k.is_empty())
            .map(|key| ChatCompletionsClient::new(base_url, key));
        info!(default_model = OPENAI_DEFAULT_MODEL, configured = client.is_some(), "OpenAI provider initialized");
        Self { client }
    }
}

/// Label an error the way users see it
pub fn categorize_error(err: &ProviderError) -> &'static str {
    match err.status() {
        Some(401) | Some(403) => return "Authentication error",
        Some(429) => return "Rate limit exceeded",
        Some(400) | Some(422) => return "Invalid request",
        _ => {}
    }

    let text = err.to_string().to_lowercase();
    if text.contains("authentication") || text.contains("api key") {
        "Authentication error"
    } else if text.contains("rate limit") {
        "Rate limit exceeded"
    } else if text.contains("invalid request") || text.contains("bad request") {
        "Invalid request"
    } else {
        "API error"
    }
}

#[async_trait]
impl PromptProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        OPENAI_DEFAULT_MODEL
    }

    async fn process_prompt(&self, request: &PromptRequest) -> ProviderResponse {
        let Some(client) = &self.client else {
            error!("OPENAI_API_KEY is missing in environment");
            return ProviderResponse::error("OPENAI_API_KEY missing in environment.", "unknown");
        };

        let model = request.model_or(OPENAI_DEFAULT_MODEL);
        info!(model = %model, "Processing prompt with OpenAI");

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_message {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        match client
            .complete(
                model,
                &messages,
                request.max_tokens,
                request.temperature,
                &HashMap::new(),
            )
            .await
        {
            Ok(completion) => {
                let usage = usage_or_unavailable(completion.usage);
                info!(model = %model, "OpenAI prompt processed");
                ProviderResponse::success(completion.content, model, usage)
            }
            Err(e) => {
                error!(model = %model, error = %e, "OpenAI request failed");
                ProviderResponse::error(format!("{}: {}", categorize_error(&e), e), model)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_by_status() {
        let err = ProviderError::Api {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(categorize_error(&err), "Rate limit exceeded");

        let err = ProviderError::Api {
            status: 401,
            body: "nope".to_string(),
        };
        assert_eq!(categorize_error(&err), "Authentication error");
    }

    #[test]
    fn test_categorize_by_text() {
        let err = ProviderError::Api {
            status: 500,
            body: "Incorrect API key provided".to_string(),
        };
        assert_eq!(categorize_error(&err), "Authentication error");

        let err = ProviderError::invalid_response("truncated");
        assert_eq!(categorize_error(&err), "API error");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let provider = OpenAiProvider::new(Some(String::new()));
        let response = provider.process_prompt(&PromptRequest::new("hi")).await;
        assert!(!response.is_success());
        assert_eq!(response.message, "OPENAI_API_KEY missing in environment.");
        assert_eq!(response.model, "unknown");
    }
}
