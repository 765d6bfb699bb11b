// Requestry adapter (OpenAI-compatible router)

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{error, info};

use crate::client::{usage_or_unavailable, ChatCompletionsClient, ChatMessage};
use crate::error::ProviderError;
use crate::types::{PromptRequest, ProviderResponse, DEFAULT_SYSTEM_MESSAGE};
use crate::PromptProvider;

pub const REQUESTRY_BASE_URL: &str = "https://router.requesty.ai/v1";
pub const REQUESTRY_DEFAULT_MODEL: &str = "cline/o3-mini";
pub const REQUESTRY_MODELS: &[&str] = &["cline/o3-mini", "cline/4o-mini"];

#[derive(Debug, Clone)]
pub struct RequestryProvider {
    client: Option<ChatCompletionsClient>,
}

impl RequestryProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, REQUESTRY_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        let client = api_key
            .filter(|k| !k.is_empty())
            .map(|key| ChatCompletionsClient::new(base_url, key));
        if client.is_none() {
            error!("REQUESTRY_API_KEY environment variable is not set");
        }
        Self { client }
    }
}

/// Prefix for a failed OpenAI-compatible call: API errors vs everything else
pub(crate) fn describe_failure(label: &str, err: &ProviderError) -> String {
    if err.is_api_error() {
        format!("{} API error: {}", label, err)
    } else {
        format!("Unexpected error: {}", err)
    }
}

#[async_trait]
impl PromptProvider for RequestryProvider {
    fn name(&self) -> &str {
        "requestry"
    }

    fn default_model(&self) -> &str {
        REQUESTRY_DEFAULT_MODEL
    }

    async fn process_prompt(&self, request: &PromptRequest) -> ProviderResponse {
        // any model name is passed through; the router validates it
        let model = request.model_or(REQUESTRY_DEFAULT_MODEL);
        let Some(client) = &self.client else {
            return ProviderResponse::error(
                ProviderError::MissingApiKey("REQUESTRY_API_KEY").to_string(),
                model,
            );
        };
        info!(model = %model, "Processing prompt with Requestry");

        let messages = [
            ChatMessage::system(
                request
                    .system_message
                    .as_deref()
                    .unwrap_or(DEFAULT_SYSTEM_MESSAGE),
            ),
            ChatMessage::user(request.prompt.clone()),
        ];

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
                info!(model = %model, "Requestry prompt processed");
                ProviderResponse::success(
                    completion.content,
                    model,
                    usage_or_unavailable(completion.usage),
                )
            }
            Err(e) => {
                error!(model = %model, error = %e, "Requestry request failed");
                ProviderResponse::error(describe_failure("Requestry", &e), model)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key() {
        let provider = RequestryProvider::new(None);
        let response = provider.process_prompt(&PromptRequest::new("hi")).await;
        assert_eq!(response.message, "REQUESTRY_API_KEY is not set");
        assert_eq!(response.model, REQUESTRY_DEFAULT_MODEL);
    }

    #[test]
    fn test_describe_failure() {
        let api = ProviderError::Api {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(
            describe_failure("Requestry", &api),
            "Requestry API error: HTTP 503: overloaded"
        );
        let missing = ProviderError::MissingApiKey("X");
        assert!(describe_failure("Requestry", &missing).starts_with("Unexpected error: "));
    }
}
