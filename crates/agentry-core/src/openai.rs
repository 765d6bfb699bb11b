// OpenAI Protocol LLM Provider
//
// Implementation of LlmProvider for OpenAI-compatible chat completion APIs.
// Streams SSE chunks and accumulates tool call fragments by index.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::pin::Pin;

use crate::error::{AgentError, Result};
use crate::llm::{
    LlmCallConfig, LlmMessage, LlmProvider, LlmResponseStream, LlmStreamEvent, ToolChoice,
    TurnSummary,
};
use crate::tool_types::{ToolCall, ToolDefinition};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI Protocol LLM Provider
///
/// # Example
///
/// ```ignore
/// let provider = OpenAiProtocolLlmProvider::from_env()?;
/// // or with custom endpoint
/// let provider = OpenAiProtocolLlmProvider::with_base_url("key", "http://localhost:8080/v1/chat/completions");
/// ```
#[derive(Clone)]
pub struct OpenAiProtocolLlmProvider {
    client: Client,
    api_key: String,
    api_url: String,
}

impl OpenAiProtocolLlmProvider {
    /// Create a new provider with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Create a new provider from the OPENAI_API_KEY environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AgentError::llm("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key))
    }

    /// Create a new provider with a custom API URL (for OpenAI-compatible APIs)
    pub fn with_base_url(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }

    fn convert_message(msg: &LlmMessage) -> OpenAiMessage {
        OpenAiMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content.clone()),
            tool_calls: msg.tool_calls.as_ref().map(|calls| {
                calls
                    .iter()
                    .map(|tc| OpenAiToolCall {
                        id: tc.id.clone(),
                        r#type: "function".to_string(),
                        function: OpenAiFunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.arguments.to_string(),
                        },
                    })
                    .collect()
            }),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    fn convert_tools(tools: &[ToolDefinition]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|tool| match tool {
                ToolDefinition::Function(f) => OpenAiTool {
                    r#type: "function".to_string(),
                    function: OpenAiFunction {
                        name: f.name.clone(),
                        description: f.description.clone(),
                        parameters: f.parameters.clone(),
                    },
                },
            })
            .collect()
    }

    fn convert_tool_choice(choice: &ToolChoice) -> Value {
        match choice {
            ToolChoice::Auto => json!("auto"),
            ToolChoice::Function(name) => json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }
}

/// Accumulates streamed fragments between SSE events
struct StreamState {
    events: Pin<Box<dyn Stream<Item = std::result::Result<eventsource_stream::Event, String>> + Send>>,
    model: String,
    deltas: u32,
    tool_calls: Vec<PartialToolCall>,
    finished: bool,
}

#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl StreamState {
    fn done(&self, finish_reason: &str) -> LlmStreamEvent {
        LlmStreamEvent::Done(TurnSummary {
            model: Some(self.model.clone()),
            finish_reason: Some(finish_reason.to_string()),
            text_deltas: self.deltas,
        })
    }

    fn take_tool_calls(&mut self) -> Vec<ToolCall> {
        std::mem::take(&mut self.tool_calls)
            .into_iter()
            .map(|partial| ToolCall {
                id: partial.id,
                name: partial.name,
                arguments: serde_json::from_str(&partial.arguments).unwrap_or_else(|_| json!({})),
            })
            .collect()
    }

    fn handle_chunk(&mut self, chunk: OpenAiStreamChunk) -> LlmStreamEvent {
        let Some(choice) = chunk.choices.into_iter().next() else {
            return LlmStreamEvent::TextDelta(String::new());
        };

        if let Some(tool_calls) = choice.delta.tool_calls {
            for tc in tool_calls {
                let idx = tc.index as usize;
                while self.tool_calls.len() <= idx {
                    self.tool_calls.push(PartialToolCall::default());
                }
                let slot = &mut self.tool_calls[idx];
                if let Some(id) = tc.id {
                    slot.id = id;
                }
                if let Some(function) = tc.function {
                    if let Some(name) = function.name {
                        slot.name = name;
                    }
                    if let Some(args) = function.arguments {
                        slot.arguments.push_str(&args);
                    }
                }
            }
        }

        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                self.deltas += 1;
                return LlmStreamEvent::TextDelta(content);
            }
        }

        if let Some(finish_reason) = choice.finish_reason {
            if !self.tool_calls.is_empty() {
                return LlmStreamEvent::ToolCalls(self.take_tool_calls());
            }
            self.finished = true;
            return self.done(&finish_reason);
        }

        LlmStreamEvent::TextDelta(String::new())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProtocolLlmProvider {
    async fn chat_completion_stream(
        &self,
        messages: Vec<LlmMessage>,
        config: &LlmCallConfig,
    ) -> Result<LlmResponseStream> {
        let openai_messages: Vec<OpenAiMessage> =
            messages.iter().map(Self::convert_message).collect();

        let tools = if config.tools.is_empty() {
            None
        } else {
            Some(Self::convert_tools(&config.tools))
        };

        let request = OpenAiRequest {
            model: config.model.clone(),
            messages: openai_messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stream: true,
            tool_choice: config.tool_choice.as_ref().map(Self::convert_tool_choice),
            tools,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::llm(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::llm(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let events = response
            .bytes_stream()
            .eventsource()
            .map(|r| r.map_err(|e| e.to_string()));

        let state = StreamState {
            events: Box::pin(events),
            model: config.model.clone(),
            deltas: 0,
            tool_calls: Vec::new(),
            finished: false,
        };

        let converted_stream: LlmResponseStream =
            Box::pin(futures::stream::unfold(state, |mut state| async move {
                if state.finished {
                    return None;
                }
                let next = state.events.next().await;
                let item = match next {
                    None => {
                        state.finished = true;
                        if !state.tool_calls.is_empty() {
                            Ok(LlmStreamEvent::ToolCalls(state.take_tool_calls()))
                        } else {
                            Ok(state.done("stop"))
                        }
                    }
                    Some(Ok(event)) if event.data == "[DONE]" => {
                        if !state.tool_calls.is_empty() {
                            Ok(LlmStreamEvent::ToolCalls(state.take_tool_calls()))
                        } else {
                            state.finished = true;
                            Ok(state.done("stop"))
                        }
                    }
                    Some(Ok(event)) => match serde_json::from_str::<OpenAiStreamChunk>(&event.data)
                    {
                        Ok(chunk) => Ok(state.handle_chunk(chunk)),
                        Err(e) => Ok(LlmStreamEvent::Error(format!(
                            "Failed to parse chunk: {}",
                            e
                        ))),
                    },
                    Some(Err(e)) => Ok(LlmStreamEvent::Error(format!("Stream error: {}", e))),
                };
                Some((item, state))
            }));

        Ok(converted_stream)
    }
}

impl std::fmt::Debug for OpenAiProtocolLlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProtocolLlmProvider")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiTool {
    r#type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    r#type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    choices: Vec<OpenAiStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiStreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamToolCall {
    index: u32,
    id: Option<String>,
    function: Option<OpenAiStreamFunction>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse(chunks: &[&str]) -> String {
        let mut body = String::new();
        for chunk in chunks {
            body.push_str("data: ");
            body.push_str(chunk);
            body.push_str("\n\n");
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    #[tokio::test]
    async fn test_streams_text() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"{"choices":[{"delta":{"content":"Hello"}}]}"#,
            r#"{"choices":[{"delta":{"content":", world!"}}]}"#,
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
        ]);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let provider = OpenAiProtocolLlmProvider::with_base_url(
            "test-key",
            format!("{}/v1/chat/completions", server.uri()),
        );
        let response = provider
            .chat_completion(vec![LlmMessage::user("hi")], &LlmCallConfig::new("gpt-4o-mini"))
            .await
            .unwrap();

        assert_eq!(response.text, "Hello, world!");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_accumulates_tool_call_fragments() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","function":{"name":"add","arguments":"{\"a\": 2"}}]}}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":", \"b\": 3}"}}]}}]}"#,
            r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
        ]);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let provider = OpenAiProtocolLlmProvider::with_base_url(
            "k",
            format!("{}/v1/chat/completions", server.uri()),
        );
        let response = provider
            .chat_completion(vec![LlmMessage::user("2+3?")], &LlmCallConfig::new("gpt-4o"))
            .await
            .unwrap();

        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_1");
        assert_eq!(response.tool_calls[0].name, "add");
        assert_eq!(response.tool_calls[0].arguments, json!({"a": 2, "b": 3}));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let provider = OpenAiProtocolLlmProvider::with_base_url("bad", server.uri());
        let err = provider
            .chat_completion(vec![LlmMessage::user("hi")], &LlmCallConfig::new("gpt-4o"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("invalid api key"));
    }

    #[test]
    fn test_forced_tool_choice_serialization() {
        let value = OpenAiProtocolLlmProvider::convert_tool_choice(&ToolChoice::Function(
            "how_many_items".to_string(),
        ));
        assert_eq!(value["function"]["name"], "how_many_items");
        assert_eq!(
            OpenAiProtocolLlmProvider::convert_tool_choice(&ToolChoice::Auto),
            json!("auto")
        );
    }
}
