// OpenRouter adapter (OpenAI-compatible, with ranking headers)

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, error, info};

use crate::client::{usage_or_unavailable, ChatCompletionsClient, ChatMessage};
use crate::error::ProviderError;
use crate::requestry::describe_failure;
use crate::types::{PromptRequest, ProviderResponse, DEFAULT_SYSTEM_MESSAGE};
use crate::PromptProvider;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENROUTER_DEFAULT_MODEL: &str = "openai/gpt-4o";
pub const OPENROUTER_DEFAULT_TITLE: &str = "OpenAI Agents Module 4";

#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Option<ChatCompletionsClient>,
    optional_headers: HashMap<String, String>,
}

impl OpenRouterProvider {
    pub fn new(api_key: Option<String>, referer: Option<String>, title: Option<String>) -> Self {
        Self::with_base_url(api_key, referer, title, OPENROUTER_BASE_URL)
    }

    pub fn with_base_url(
        api_key: Option<String>,
        referer: Option<String>,
        title: Option<String>,
        base_url: &str,
    ) -> Self {
        let client = api_key
            .filter(|k| !k.is_empty())
            .map(|key| ChatCompletionsClient::new(base_url, key));
        if client.is_none() {
            error!("OPENROUTER_API_KEY environment variable is not set");
        }

        let optional_headers = [
            ("HTTP-Referer", referer),
            (
                "X-Title",
                Some(title.unwrap_or_else(|| OPENROUTER_DEFAULT_TITLE.to_string())),
            ),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| (name.to_string(), v))
        })
        .collect();

        Self {
            client,
            optional_headers,
        }
    }

    /// Configured headers overlaid with the request's own
    pub fn merged_headers(&self, request: &PromptRequest) -> HashMap<String, String> {
        let mut headers = self.optional_headers.clone();
        if let Some(extra) = &request.headers {
            headers.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        headers
    }
}

#[async_trait]
impl PromptProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn default_model(&self) -> &str {
        OPENROUTER_DEFAULT_MODEL
    }

    async fn process_prompt(&self, request: &PromptRequest) -> ProviderResponse {
        let model = request.model_or(OPENROUTER_DEFAULT_MODEL);
        let Some(client) = &self.client else {
            return ProviderResponse::error(
                ProviderError::MissingApiKey("OPENROUTER_API_KEY").to_string(),
                model,
            );
        };
        info!(model = %model, "Processing prompt with OpenRouter");

        let system = request
            .system_message
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_MESSAGE);
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        let headers = self.merged_headers(request);
        debug!(model = %model, headers = headers.len(), "Sending request to OpenRouter");

        match client
            .complete(
                model,
                &messages,
                request.max_tokens,
                request.temperature,
                &headers,
            )
            .await
        {
            Ok(completion) => {
                info!(model = %model, "OpenRouter prompt processed");
                ProviderResponse::success(
                    completion.content,
                    model,
                    usage_or_unavailable(completion.usage),
                )
            }
            Err(e) => {
                error!(model = %model, error = %e, "OpenRouter request failed");
                ProviderResponse::error(describe_failure("OpenRouter", &e), model)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_headers_filtered() {
        let provider = OpenRouterProvider::new(Some("key".into()), Some(String::new()), None);
        let headers = provider.merged_headers(&PromptRequest::new("hi"));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["X-Title"], OPENROUTER_DEFAULT_TITLE);
    }

    #[test]
    fn test_request_headers_override() {
        let provider = OpenRouterProvider::new(
            Some("key".into()),
            Some("https://example.com".into()),
            Some("Mine".into()),
        );
        let mut request = PromptRequest::new("hi");
        request.headers = Some(HashMap::from([("X-Title".to_string(), "Override".to_string())]));

        let headers = provider.merged_headers(&request);
        assert_eq!(headers["HTTP-Referer"], "https://example.com");
        assert_eq!(headers["X-Title"], "Override");
    }
}
