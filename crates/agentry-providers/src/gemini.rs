// Gemini adapter (native generateContent REST API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, Result};
use crate::types::{PromptRequest, ProviderResponse, Usage, DEFAULT_SYSTEM_MESSAGE};
use crate::PromptProvider;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.0-pro";
pub const GEMINI_MODELS: &[&str] = &[
    "gemini-1.0-pro",
    "gemini-1.0-pro-vision",
    "gemini-1.5-pro",
    "gemini-1.5-flash",
];
pub const GEMINI_USAGE_NOTE: &str =
    "Token counts are estimates as Gemini API doesn't provide exact usage";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    /// An empty system message sends no `systemInstruction`
    fn new(system: &'a str, request: &'a PromptRequest) -> Self {
        Self {
            contents: [Content {
                role: Some("user"),
                parts: [Part {
                    text: &request.prompt,
                }],
            }],
            system_instruction: (!system.is_empty()).then(|| Content {
                role: None,
                parts: [Part { text: system }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        let api_key = api_key.filter(|k| !k.is_empty());
        if api_key.is_none() {
            error!("GEMINI_API_KEY environment variable is not set");
        }
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Falls back to the default for models this adapter does not know
    pub fn resolve_model<'a>(&self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(model) if GEMINI_MODELS.contains(&model) => model,
            Some(model) => {
                warn!(
                    model = %model,
                    fallback = GEMINI_DEFAULT_MODEL,
                    "Unsupported Gemini model, using default"
                );
                GEMINI_DEFAULT_MODEL
            }
            None => GEMINI_DEFAULT_MODEL,
        }
    }

    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        system: &str,
        request: &PromptRequest,
    ) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!(url = %url, "Sending Gemini generateContent request");

        let body = GenerateRequest::new(system, request);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(e.to_string()))?;
        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::invalid_response("response has no candidates"))?;
        Ok(candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

/// Rough token estimate: four characters per token
pub fn estimate_usage(prompt: &str, system: &str, response: &str) -> Usage {
    let prompt_tokens = ((prompt.chars().count() + system.chars().count()) / 4) as u32;
    let completion_tokens = (response.chars().count() / 4) as u32;
    Usage {
        note: Some(GEMINI_USAGE_NOTE.to_string()),
        ..Usage::new(prompt_tokens, completion_tokens)
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl PromptProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        GEMINI_DEFAULT_MODEL
    }

    async fn process_prompt(&self, request: &PromptRequest) -> ProviderResponse {
        let model = self.resolve_model(request.model.as_deref());
        let Some(api_key) = &self.api_key else {
            return ProviderResponse::error(
                format!(
                    "Error processing prompt: {}",
                    ProviderError::MissingApiKey("GEMINI_API_KEY")
                ),
                model,
            );
        };

        let system = request
            .system_message
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_MESSAGE);
        info!(model = %model, "Processing prompt with Gemini");

        match self.generate(api_key, model, system, request).await {
            Ok(text) => {
                let usage = estimate_usage(&request.prompt, system, &text);
                info!(model = %model, "Gemini prompt processed");
                ProviderResponse::success(text, model, usage)
            }
            Err(e) => {
                error!(model = %model, error = %e, "Gemini request failed");
                ProviderResponse::error(format!("Error processing prompt: {}", e), model)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model() {
        let provider = GeminiProvider::new(Some("key".into()));
        assert_eq!(provider.resolve_model(None), GEMINI_DEFAULT_MODEL);
        assert_eq!(provider.resolve_model(Some("gemini-1.5-flash")), "gemini-1.5-flash");
        assert_eq!(provider.resolve_model(Some("gpt-4o")), GEMINI_DEFAULT_MODEL);
    }

    #[test]
    fn test_request_body_omits_empty_system_instruction() {
        let request = PromptRequest::new("hi");
        let with_system = serde_json::to_value(GenerateRequest::new("Be brief.", &request)).unwrap();
        assert_eq!(with_system["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(with_system["contents"][0]["role"], "user");
        assert_eq!(with_system["generationConfig"]["maxOutputTokens"], 100);

        let without = serde_json::to_value(GenerateRequest::new("", &request)).unwrap();
        assert!(without.get("systemInstruction").is_none());
    }

    #[test]
    fn test_estimate_usage() {
        let usage = estimate_usage("12345678", "abcd", "xxxxxxxxxxxx");
        assert_eq!(usage.prompt_tokens, 3);
        assert_eq!(usage.completion_tokens, 3);
        assert_eq!(usage.total_tokens, 6);
        assert_eq!(usage.note.as_deref(), Some(GEMINI_USAGE_NOTE));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let provider = GeminiProvider::new(None);
        let response = provider.process_prompt(&PromptRequest::new("hi")).await;
        assert!(!response.is_success());
        assert_eq!(
            response.message,
            "Error processing prompt: GEMINI_API_KEY is not set"
        );
    }
}
