// Model access used by the runner
//
// An LlmProvider streams one chat turn as LlmStreamEvents. The runner only
// needs the collected turn (`chat_completion`); the streaming agents read
// the events directly.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::tool_types::{ToolCall, ToolDefinition};

pub type LlmResponseStream = Pin<Box<dyn Stream<Item = Result<LlmStreamEvent>> + Send>>;

#[derive(Debug, Clone)]
pub enum LlmStreamEvent {
    TextDelta(String),
    /// All tool calls of the turn, fully assembled
    ToolCalls(Vec<ToolCall>),
    Done(TurnSummary),
    /// Mid-stream failure reported by the provider
    Error(String),
}

/// Trailer of a streamed turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSummary {
    pub model: Option<String>,
    pub finish_reason: Option<String>,
    /// Number of non-empty text deltas
    pub text_deltas: u32,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat_completion_stream(
        &self,
        messages: Vec<LlmMessage>,
        config: &LlmCallConfig,
    ) -> Result<LlmResponseStream>;

    /// Run one turn and collect it
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        config: &LlmCallConfig,
    ) -> Result<LlmResponse> {
        let stream = self.chat_completion_stream(messages, config).await?;
        LlmResponse::collect(stream).await
    }
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    async fn chat_completion_stream(
        &self,
        messages: Vec<LlmMessage>,
        config: &LlmCallConfig,
    ) -> Result<LlmResponseStream> {
        (**self).chat_completion_stream(messages, config).await
    }
}

/// A collected model turn
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
}

impl LlmResponse {
    /// Drain `stream`; an `Error` event fails the turn
    pub async fn collect(mut stream: LlmResponseStream) -> Result<Self> {
        let mut response = Self::default();
        while let Some(event) = stream.next().await {
            match event? {
                LlmStreamEvent::TextDelta(delta) => response.text.push_str(&delta),
                LlmStreamEvent::ToolCalls(calls) => response.tool_calls = calls,
                LlmStreamEvent::Done(summary) => response.finish_reason = summary.finish_reason,
                LlmStreamEvent::Error(message) => return Err(AgentError::llm(message)),
            }
        }
        Ok(response)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    /// Force a call to the named function
    Function(String),
}

#[derive(Debug, Clone)]
pub struct LlmCallConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<ToolChoice>,
}

impl LlmCallConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmMessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl LlmMessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmMessageRole::System => "system",
            LlmMessageRole::User => "user",
            LlmMessageRole::Assistant => "assistant",
            LlmMessageRole::Tool => "tool",
        }
    }
}

/// One entry of the conversation sent to the model
#[derive(Debug, Clone)]
pub struct LlmMessage {
    pub role: LlmMessageRole,
    pub content: String,
    /// Set on assistant turns that requested tools
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Set on tool results
    pub tool_call_id: Option<String>,
}

impl LlmMessage {
    fn plain(role: LlmMessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(LlmMessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(LlmMessageRole::User, content)
    }

    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(calls),
            ..Self::plain(LlmMessageRole::Assistant, content)
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(LlmMessageRole::Tool, content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stream_of(events: Vec<Result<LlmStreamEvent>>) -> LlmResponseStream {
        Box::pin(futures::stream::iter(events))
    }

    #[tokio::test]
    async fn test_collect_joins_text_and_keeps_tool_calls() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "add".to_string(),
            arguments: json!({"a": 1}),
        };
        let response = LlmResponse::collect(stream_of(vec![
            Ok(LlmStreamEvent::TextDelta("Hel".to_string())),
            Ok(LlmStreamEvent::TextDelta("lo".to_string())),
            Ok(LlmStreamEvent::ToolCalls(vec![call])),
            Ok(LlmStreamEvent::Done(TurnSummary {
                finish_reason: Some("tool_calls".to_string()),
                ..Default::default()
            })),
        ]))
        .await
        .unwrap();

        assert_eq!(response.text, "Hello");
        assert_eq!(response.tool_calls[0].name, "add");
        assert_eq!(response.finish_reason.as_deref(), Some("tool_calls"));
    }

    #[tokio::test]
    async fn test_collect_fails_on_error_event() {
        let err = LlmResponse::collect(stream_of(vec![
            Ok(LlmStreamEvent::TextDelta("partial".to_string())),
            Ok(LlmStreamEvent::Error("connection reset".to_string())),
        ]))
        .await
        .unwrap_err();

        assert!(matches!(err, AgentError::Llm(m) if m == "connection reset"));
    }

    #[test]
    fn test_tool_result_message() {
        let message = LlmMessage::tool_result("call_7", "42");
        assert_eq!(message.role, LlmMessageRole::Tool);
        assert_eq!(message.tool_call_id.as_deref(), Some("call_7"));
        assert!(message.tool_calls.is_none());
    }
}
